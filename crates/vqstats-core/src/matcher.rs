//! Execution matching: picks, for a planner's scheduled run, the job per goal
//! that best represents the run that actually happened.
//!
//! The jobs endpoint returns every job submitted for a plan inside a date
//! range, often several per goal (re-runs, manual triggers). A
//! [`MatchWindow`] restricts candidates to the relevant period and anchors a
//! distance metric; [`ExecutionMatcher`] keeps the closest candidate per goal.
//! [`match_paged`] drives a [`JobPageSource`] through `lastId` pagination and
//! feeds every page into the matcher.
//!
//! ## Selection rule
//!
//! - Records outside the window are ignored, as are records that name a
//!   plan other than the one being matched.
//! - Within a goal, the record with the smallest `|submit_time − anchor|` wins.
//! - Ties keep the record seen first in fetch order, so a later page only
//!   displaces an earlier pick when it is strictly closer.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use crate::model::JobRecord;

/// Which instant of the reference day distances are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayAnchor {
    /// 12:00 local time on the reference day.
    #[default]
    Midday,
    /// Exactly 24 hours before the scheduled run.
    ScheduledTime,
}

/// How candidate jobs are bounded and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Candidates are the jobs submitted on the calendar day of
    /// `scheduled_time − 24h`.
    PreviousDay { anchor: DayAnchor },
    /// Candidates are the jobs submitted within `half_width` of the
    /// scheduled time; distance is measured from the scheduled time.
    Window { half_width: Duration },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::PreviousDay {
            anchor: DayAnchor::Midday,
        }
    }
}

/// Inclusive time bounds for candidate jobs plus the instant distances are
/// measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub anchor: DateTime<Utc>,
}

impl MatchWindow {
    /// Derives the window for a scheduled run.
    ///
    /// `tz` decides where calendar days start for [`MatchPolicy::PreviousDay`];
    /// it has no effect on [`MatchPolicy::Window`].
    #[must_use]
    pub fn for_schedule(scheduled: DateTime<Utc>, policy: MatchPolicy, tz: FixedOffset) -> Self {
        match policy {
            MatchPolicy::PreviousDay { anchor } => {
                let reference = scheduled - Duration::days(1);
                let day = reference.with_timezone(&tz).date_naive();
                let local_midnight = day.and_time(NaiveTime::MIN)
                    - Duration::seconds(i64::from(tz.local_minus_utc()));
                let begin = Utc.from_utc_datetime(&local_midnight);
                let end = begin + Duration::days(1) - Duration::milliseconds(1);
                let anchor = match anchor {
                    DayAnchor::Midday => begin + Duration::hours(12),
                    DayAnchor::ScheduledTime => reference,
                };
                Self { begin, end, anchor }
            }
            MatchPolicy::Window { half_width } => Self {
                begin: scheduled - half_width,
                end: scheduled + half_width,
                anchor: scheduled,
            },
        }
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.begin <= instant && instant <= self.end
    }

    /// Absolute distance between `instant` and the window's anchor.
    #[must_use]
    pub fn distance(&self, instant: DateTime<Utc>) -> Duration {
        let delta = instant - self.anchor;
        if delta < Duration::zero() {
            -delta
        } else {
            delta
        }
    }

    /// `(dateBegin, dateEnd)` in epoch milliseconds, as the jobs endpoint expects.
    #[must_use]
    pub fn epoch_millis(&self) -> (i64, i64) {
        (self.begin.timestamp_millis(), self.end.timestamp_millis())
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    record: JobRecord,
    distance: Duration,
}

/// Accumulates the closest job per goal across any number of pages.
#[derive(Debug, Clone)]
pub struct ExecutionMatcher {
    window: MatchWindow,
    plan_id: Option<i64>,
    selected: BTreeMap<i64, Candidate>,
    offered: usize,
    out_of_window: usize,
    foreign_plan: usize,
}

impl ExecutionMatcher {
    #[must_use]
    pub fn new(window: MatchWindow) -> Self {
        Self {
            window,
            plan_id: None,
            selected: BTreeMap::new(),
            offered: 0,
            out_of_window: 0,
            foreign_plan: 0,
        }
    }

    /// Restricts matching to one plan. Records without a plan id are kept.
    #[must_use]
    pub fn for_plan(mut self, plan_id: Option<i64>) -> Self {
        self.plan_id = plan_id;
        self
    }

    /// Offers one record; returns `true` if it is now the pick for its goal.
    pub fn offer(&mut self, record: JobRecord) -> bool {
        self.offered += 1;
        if let (Some(wanted), Some(got)) = (self.plan_id, record.plan_id) {
            if wanted != got {
                self.foreign_plan += 1;
                return false;
            }
        }
        if !self.window.contains(record.submit_time) {
            self.out_of_window += 1;
            return false;
        }

        let distance = self.window.distance(record.submit_time);
        match self.selected.entry(record.goal_id) {
            Entry::Vacant(slot) => {
                slot.insert(Candidate { record, distance });
                true
            }
            Entry::Occupied(mut slot) => {
                if distance < slot.get().distance {
                    slot.insert(Candidate { record, distance });
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn offer_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = JobRecord>,
    {
        for record in records {
            self.offer(record);
        }
    }

    /// Number of records offered so far, including rejected ones.
    #[must_use]
    pub fn offered(&self) -> usize {
        self.offered
    }

    #[must_use]
    pub fn out_of_window(&self) -> usize {
        self.out_of_window
    }

    /// Records rejected because they belong to another plan.
    #[must_use]
    pub fn foreign_plan(&self) -> usize {
        self.foreign_plan
    }

    #[must_use]
    pub fn into_selection(self) -> BTreeMap<i64, JobRecord> {
        self.selected
            .into_iter()
            .map(|(goal_id, c)| (goal_id, c.record))
            .collect()
    }
}

/// One response from the jobs endpoint after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPage {
    /// Records that normalized cleanly; malformed entries are already dropped.
    pub records: Vec<JobRecord>,
    /// Number of entries in the raw response, malformed ones included.
    pub raw_len: usize,
    /// Key of the last raw entry, used as the next `lastId` cursor.
    pub last_id: Option<String>,
}

/// Something that can fetch pages of jobs for a single plan.
pub trait JobPageSource {
    type Error: std::fmt::Display;

    /// Plan the pages belong to; records naming any other plan are dropped.
    fn plan_id(&self) -> Option<i64> {
        None
    }

    /// Fetches the page that follows `last_id` (or the first page when `None`).
    fn fetch_page(
        &self,
        window: &MatchWindow,
        last_id: Option<&str>,
    ) -> impl Future<Output = Result<JobPage, Self::Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_pages: 50,
        }
    }
}

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page shorter than the page size (including an empty page).
    ShortPage,
    /// The page cap was reached while the server still returned full pages.
    PageCap,
    /// The server returned the same cursor twice.
    StalledCursor,
    /// A request failed; the selection holds whatever earlier pages produced.
    FetchFailed(String),
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub selected: BTreeMap<i64, JobRecord>,
    pub pages: usize,
    pub stop: StopReason,
}

impl MatchOutcome {
    /// `true` if pagination ended for a reason other than reaching the last page.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !matches!(self.stop, StopReason::ShortPage)
    }
}

/// Pages through `source` and returns the closest job per goal.
///
/// Never fails: a failed page ends pagination and is reported through
/// [`MatchOutcome::stop`] so the caller can warn and continue with partial data.
pub async fn match_paged<S>(source: &S, window: MatchWindow, limits: PageLimits) -> MatchOutcome
where
    S: JobPageSource,
{
    let page_size = limits.page_size.max(1);
    let mut matcher = ExecutionMatcher::new(window).for_plan(source.plan_id());
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    let stop = loop {
        if pages >= limits.max_pages {
            tracing::warn!(
                max_pages = limits.max_pages,
                "jobs pagination hit the page cap; results may be incomplete"
            );
            break StopReason::PageCap;
        }

        let page = match source.fetch_page(&window, cursor.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(page = pages + 1, error = %e, "jobs page fetch failed");
                break StopReason::FetchFailed(e.to_string());
            }
        };
        pages += 1;

        let is_short = page.raw_len < page_size;
        tracing::debug!(
            page = pages,
            raw_len = page.raw_len,
            records = page.records.len(),
            "fetched jobs page"
        );
        matcher.offer_all(page.records);

        if is_short {
            break StopReason::ShortPage;
        }
        match page.last_id {
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                tracing::warn!(cursor = %next, "jobs cursor did not advance");
                break StopReason::StalledCursor;
            }
            Some(next) => cursor = Some(next),
            None => break StopReason::ShortPage,
        }
    };

    tracing::debug!(
        pages,
        offered = matcher.offered(),
        out_of_window = matcher.out_of_window(),
        foreign_plan = matcher.foreign_plan(),
        ?stop,
        "jobs matching finished"
    );

    MatchOutcome {
        selected: matcher.into_selection(),
        pages,
        stop,
    }
}

/// Returns the item whose submit time is closest to `target`, provided it is
/// within `threshold`. Items without a submit time are skipped; ties keep the
/// first item.
pub fn closest_within<T, I, F>(
    items: I,
    target: DateTime<Utc>,
    threshold: Duration,
    submit_time: F,
) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    let probe = MatchWindow {
        begin: target - threshold,
        end: target + threshold,
        anchor: target,
    };

    let mut best: Option<(T, Duration)> = None;
    for item in items {
        let Some(at) = submit_time(&item) else {
            continue;
        };
        if !probe.contains(at) {
            continue;
        }
        let distance = probe.distance(at);
        if best.as_ref().is_none_or(|(_, d)| distance < *d) {
            best = Some((item, distance));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
