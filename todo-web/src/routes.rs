//! Route handlers for the dashboard

use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, RawForm, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;
use tracing::{info, warn};

use todo_core::{triage, IssueFilter, IssueItem, Rank};

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::templates::{IndexTemplate, IssueRow, NewTemplate, VERSION};

/// Get the combined issue list, from cache when fresh
///
/// A failing account is logged and skipped so one revoked token does not
/// blank the whole dashboard.
async fn load_issues(state: &AppState) -> Result<Vec<IssueItem>> {
    if state.cache_fresh() {
        let cached = state.cache.read_issues();
        if !cached.is_empty() {
            return Ok(cached);
        }
    }

    let mut all = Vec::new();
    for source in &state.sources {
        match source.fetch_assigned().await {
            Ok(mut issues) => all.append(&mut issues),
            Err(e) => {
                warn!(source = source.name(), error = %e, "Skipping failing issue source");
            }
        }
    }

    state.cache.write_issues(&all)?;
    state.touch_cache_timer();

    Ok(all)
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    filter: Option<String>,
}

/// Dashboard page
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IndexParams>,
) -> Result<Html<String>> {
    let filter = IssueFilter::from_query(params.filter.as_deref());

    let mut issues = load_issues(&state).await?;
    triage::prioritize(&mut issues);
    triage::apply_prefs(&mut issues, &state.prefs.read());
    triage::apply_seen(&mut issues, &state.cache.read_seen());
    triage::rank_sort(&mut issues);
    let issues = triage::apply_filter(issues, filter);

    let stats = triage::stats(&issues);
    let new_uids: Vec<&str> = issues
        .iter()
        .filter(|issue| issue.new)
        .map(|issue| issue.uid.as_str())
        .collect();

    let template = IndexTemplate {
        stats,
        new_count: new_uids.len(),
        new_uids: new_uids.join(","),
        filter: filter.as_str().to_string(),
        rows: issues.into_iter().map(IssueRow::from).collect(),
        has_todo_repo: state.todo_repo.is_some(),
        version: VERSION,
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    issue: String,
    rank: String,
}

/// Set the rank of an issue; ranking implies having seen it
pub async fn ranking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> Result<Redirect> {
    if !params.issue.is_empty() {
        state
            .prefs
            .set_rank(&params.issue, Rank::from_query(&params.rank))?;
        state.cache.mark_seen([params.issue])?;
    }

    Ok(Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub struct IssueParams {
    issue: String,
}

/// Toggle todo-list membership of an issue
pub async fn todolist(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IssueParams>,
) -> Result<Redirect> {
    if !params.issue.is_empty() {
        state.prefs.toggle_todolist(&params.issue)?;
    }

    Ok(Redirect::to("/"))
}

/// Toggle the hidden flag of an issue
pub async fn hide(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IssueParams>,
) -> Result<Redirect> {
    if !params.issue.is_empty() {
        state.prefs.toggle_hidden(&params.issue)?;
    }

    Ok(Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub struct MarkAsSeenParams {
    #[serde(default)]
    issues: String,
}

/// Mark a comma-separated list of issue uids as seen
pub async fn mark_as_seen(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MarkAsSeenParams>,
) -> Result<Redirect> {
    state.cache.mark_seen(params.issues.split(','))?;

    Ok(Redirect::to("/"))
}

/// Break the cache so the next dashboard render refetches everything
pub async fn reload(State(state): State<Arc<AppState>>) -> Redirect {
    info!("Cache invalidated, issues will be refetched");
    state.expire_cache_timer();

    Redirect::to("/")
}

/// Form for creating a new issue in the personal todo repository
pub async fn new_form(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let todo_repo = state
        .todo_repo
        .as_ref()
        .ok_or_else(|| Error::NotConfigured("No todo repository configured".to_string()))?;

    let labels = todo_repo.list_labels().await?;

    let template = NewTemplate {
        labels: labels.into_iter().map(Into::into).collect(),
        colored_labels: state.colored_labels,
        version: VERSION,
    };

    Ok(Html(template.render()?))
}

/// Create a new issue from the submitted form
pub async fn new_create(
    State(state): State<Arc<AppState>>,
    RawForm(body): RawForm,
) -> Result<Redirect> {
    let todo_repo = state
        .todo_repo
        .as_ref()
        .ok_or_else(|| Error::NotConfigured("No todo repository configured".to_string()))?;

    let mut title = String::new();
    let mut labels = Vec::new();
    let mut back_to_index = false;

    // Checkboxes submit one `labels` pair per checked label, which is out of
    // reach for plain struct extraction
    for (key, value) in url::form_urlencoded::parse(&body) {
        match key.as_ref() {
            "issue_title" => title = value.into_owned(),
            "labels" => labels.push(value.into_owned()),
            "submit_and_index" => back_to_index = true,
            _ => {}
        }
    }

    if title.trim().is_empty() {
        warn!("Ignoring issue creation with empty title");
        return Ok(Redirect::to("/new"));
    }

    let web_url = todo_repo.create_issue(title.trim(), &labels).await?;
    info!(url = %web_url, "Created new todo issue");

    if back_to_index {
        // Refetch so the new issue shows up right away
        state.expire_cache_timer();
        return Ok(Redirect::to("/"));
    }

    Ok(Redirect::to("/new"))
}

/// Embedded stylesheet
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../static/todo-merger.css"),
    )
}
