use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// One team entry from the team configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamConfig {
    pub team_name: String,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

/// A project under a team, listing the goals whose journeys are counted and
/// the planners whose executions are reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    pub project_id: i64,
    #[serde(default)]
    pub goal_ids: Vec<i64>,
    /// Read from `planner_id` (a list) to stay compatible with existing
    /// team files.
    #[serde(default, rename = "planner_id")]
    pub planner_ids: Vec<i64>,
}

/// Load and validate the team configuration from a JSON file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_teams(path: &Path) -> Result<Vec<TeamConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TeamsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_teams(&content)
}

/// Parse and validate team configuration from a JSON string.
///
/// # Errors
///
/// Returns `ConfigError` if the JSON is malformed or fails validation.
pub fn parse_teams(content: &str) -> Result<Vec<TeamConfig>, ConfigError> {
    let teams: Vec<TeamConfig> = serde_json::from_str(content)?;
    validate_teams(&teams)?;
    Ok(teams)
}

fn validate_teams(teams: &[TeamConfig]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for team in teams {
        if team.team_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "team name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(team.team_name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate team name: '{}'",
                team.team_name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "teams_test.rs"]
mod tests;
