use super::*;

#[test]
fn bare_invocation_is_a_usage_error() {
    let err = Cli::try_parse_from(["vqstats"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn report_defaults() {
    let cli = Cli::try_parse_from(["vqstats", "report", "teams.json"]).unwrap();
    let Commands::Report {
        teams,
        summary_out,
        detail_out,
        policy,
        anchor,
        window_minutes,
        journey_details,
        email,
    } = cli.command
    else {
        panic!("expected report command");
    };

    assert_eq!(teams, PathBuf::from("teams.json"));
    assert_eq!(summary_out, PathBuf::from("summary.csv"));
    assert!(detail_out.is_none());
    assert_eq!(policy, PolicyArg::PreviousDay);
    assert_eq!(anchor, AnchorArg::Midday);
    assert_eq!(window_minutes, 2);
    assert!(!journey_details);
    assert!(!email);
}

#[test]
fn report_window_policy_with_flags() {
    let cli = Cli::try_parse_from([
        "vqstats",
        "report",
        "teams.json",
        "--policy",
        "window",
        "--window-minutes",
        "10",
        "--journey-details",
        "--email",
        "--detail-out",
        "detail.csv",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Report {
            policy: PolicyArg::Window,
            window_minutes: 10,
            journey_details: true,
            email: true,
            detail_out: Some(ref p),
            ..
        } if p == &PathBuf::from("detail.csv")
    ));
}

#[test]
fn report_requires_teams_file() {
    assert!(Cli::try_parse_from(["vqstats", "report"]).is_err());
}

#[test]
fn report_rejects_unknown_policy() {
    assert!(Cli::try_parse_from(["vqstats", "report", "t.json", "--policy", "nearest"]).is_err());
}

#[test]
fn scheduled_time_anchor_parses() {
    let cli = Cli::try_parse_from(["vqstats", "report", "t.json", "--anchor", "scheduled-time"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Report {
            anchor: AnchorArg::ScheduledTime,
            ..
        }
    ));
}

#[test]
fn match_policy_maps_cli_choices() {
    assert_eq!(
        match_policy(PolicyArg::PreviousDay, AnchorArg::ScheduledTime, 2),
        MatchPolicy::PreviousDay {
            anchor: DayAnchor::ScheduledTime
        }
    );
    assert_eq!(
        match_policy(PolicyArg::Window, AnchorArg::Midday, 15),
        MatchPolicy::Window {
            half_width: chrono::Duration::minutes(15)
        }
    );
}

#[test]
fn journeys_default_output() {
    let cli = Cli::try_parse_from(["vqstats", "journeys", "teams.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Journeys { ref out, .. } if out == &PathBuf::from("journey_counts.csv")
    ));
}

#[test]
fn next_run_takes_planner_id() {
    let cli = Cli::try_parse_from(["vqstats", "next-run", "100"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::NextRun { planner_id: 100 }
    ));
}

#[test]
fn next_run_rejects_non_numeric_id() {
    assert!(Cli::try_parse_from(["vqstats", "next-run", "abc"]).is_err());
}

#[test]
fn goal_takes_goal_id() {
    let cli = Cli::try_parse_from(["vqstats", "goal", "10"]).unwrap();
    assert!(matches!(cli.command, Commands::Goal { goal_id: 10 }));
}

#[test]
fn closest_execution_default_threshold() {
    let cli = Cli::try_parse_from([
        "vqstats",
        "closest-execution",
        "3",
        "--at",
        "2024-06-14 12:00",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::ClosestExecution {
            project_id: 3,
            threshold_minutes: 30,
            ref at,
        } if at == "2024-06-14 12:00"
    ));
}
