//! Merge-and-annotate pass over the fetched issues
//!
//! Pure functions: the web layer feeds in the combined list from all
//! sources and gets back a sorted, annotated, filtered view plus stats.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::issue::{IssueItem, Service};
use crate::prefs::{IssuePref, PrefsMap};

/// Dashboard filter selected via query string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssueFilter {
    /// Everything except hidden issues
    #[default]
    All,
    /// Only issues put on the todo list (hidden ones stay hidden)
    Todolist,
    /// Only hidden issues
    Hidden,
}

impl IssueFilter {
    /// Parse the `filter` query parameter; unknown values mean no filter
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("todolist") => IssueFilter::Todolist,
            Some("hidden") => IssueFilter::Hidden,
            _ => IssueFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueFilter::All => "",
            IssueFilter::Todolist => "todolist",
            IssueFilter::Hidden => "hidden",
        }
    }
}

/// Aggregate numbers shown in the dashboard header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssuesStats {
    pub total: usize,
    pub github: usize,
    pub gitlab: usize,
    pub pulls: usize,
    pub issues: usize,
    pub due_dates_total: usize,
    pub milestones_total: usize,
    pub epics_total: usize,
}

/// Compare two optional sort keys, placing empty values last
///
/// `reverse` flips the ordering of present values only; None stays at the
/// end no matter the direction, so issues without a milestone never win a
/// milestone comparison.
fn cmp_option<T: Ord>(a: Option<&T>, b: Option<&T>, reverse: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            if reverse {
                b.cmp(a)
            } else {
                a.cmp(b)
            }
        }
    }
}

fn lowered(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// Triage ordering: due date first (soonest wins), then milestone and epic
/// (latest first), then recency
fn cmp_triage(a: &IssueItem, b: &IssueItem) -> Ordering {
    cmp_option(a.due_date.as_ref(), b.due_date.as_ref(), false)
        .then_with(|| cmp_option(lowered(&a.milestone).as_ref(), lowered(&b.milestone).as_ref(), true))
        .then_with(|| cmp_option(lowered(&a.epic).as_ref(), lowered(&b.epic).as_ref(), true))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Sort issues into triage order
pub fn prioritize(issues: &mut [IssueItem]) {
    debug!(count = issues.len(), "Sorting issues into triage order");
    issues.sort_by(cmp_triage);
}

/// Stable sort by rank weight
///
/// Run after [`prioritize`] so rank becomes the primary key and the triage
/// order remains the tie-break.
pub fn rank_sort(issues: &mut [IssueItem]) {
    issues.sort_by_key(|issue| issue.rank.weight());
}

/// Stamp local rank/todolist/hidden annotations onto the fetched issues
pub fn apply_prefs(issues: &mut [IssueItem], prefs: &PrefsMap) {
    for issue in issues.iter_mut() {
        if let Some(pref) = prefs.get(&issue.uid) {
            issue.rank = pref.rank;
            issue.todolist = pref.todolist;
            issue.hidden = pref.hidden;
            debug!(uid = %issue.uid, rank = %issue.rank, "Applied issue preferences");
        } else {
            let default = IssuePref::default();
            issue.rank = default.rank;
            issue.todolist = default.todolist;
            issue.hidden = default.hidden;
        }
    }
}

/// Mark issues that have not been seen yet
pub fn apply_seen(issues: &mut [IssueItem], seen: &BTreeSet<String>) {
    for issue in issues.iter_mut() {
        issue.new = !seen.contains(&issue.uid);
    }
}

/// Apply the dashboard filter
pub fn apply_filter(issues: Vec<IssueItem>, filter: IssueFilter) -> Vec<IssueItem> {
    match filter {
        IssueFilter::All => issues.into_iter().filter(|i| !i.hidden).collect(),
        IssueFilter::Todolist => issues
            .into_iter()
            .filter(|i| i.todolist && !i.hidden)
            .collect(),
        IssueFilter::Hidden => issues.into_iter().filter(|i| i.hidden).collect(),
    }
}

/// Create stats about the issues that survived filtering
pub fn stats(issues: &[IssueItem]) -> IssuesStats {
    let mut stats = IssuesStats::default();

    for issue in issues {
        stats.total += 1;
        match issue.service {
            Service::Github => stats.github += 1,
            Service::Gitlab => stats.gitlab += 1,
        }
        if issue.pull {
            stats.pulls += 1;
        } else {
            stats.issues += 1;
        }
        if issue.due_date.is_some() {
            stats.due_dates_total += 1;
        }
        if issue.milestone.as_deref().is_some_and(|m| !m.is_empty()) {
            stats.milestones_total += 1;
        }
        if issue.epic.as_deref().is_some_and(|e| !e.is_empty()) {
            stats.epics_total += 1;
        }
    }

    stats
}
