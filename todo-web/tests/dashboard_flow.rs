//! End-to-end tests for the dashboard routes
//!
//! Spawns the real router on an ephemeral port against stub issue sources
//! and drives it with an HTTP client, redirects disabled so the 303s stay
//! observable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use todo_core::{
    CacheStore, IssueItem, IssueSource, Label, PrefsStore, Rank, Service, TodoRepo,
};
use todo_web::AppState;

fn sample_issue(uid: &str, title: &str) -> IssueItem {
    IssueItem {
        uid: uid.to_string(),
        service: Service::Github,
        reference: format!("owner/repo#{}", uid),
        title: title.to_string(),
        web_url: format!("https://github.com/owner/repo/issues/{}", uid),
        pull: false,
        labels: vec!["bug".to_string()],
        milestone: None,
        epic: None,
        due_date: None,
        assignees: String::new(),
        updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        updated_at_display: "2 days ago".to_string(),
        rank: Rank::Normal,
        todolist: false,
        hidden: false,
        new: false,
    }
}

/// Issue source serving a fixed list, counting fetches
struct StubSource {
    issues: Vec<IssueItem>,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl IssueSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_assigned(&self) -> todo_core::Result<Vec<IssueItem>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.issues.clone())
    }
}

/// Issue source that always fails, to prove one bad account is skipped
struct BrokenSource;

#[async_trait]
impl IssueSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    async fn fetch_assigned(&self) -> todo_core::Result<Vec<IssueItem>> {
        Err(todo_core::Error::Source("token revoked".to_string()))
    }
}

/// Todo repo recording created issues
#[derive(Default)]
struct StubTodoRepo {
    created: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

#[async_trait]
impl TodoRepo for StubTodoRepo {
    async fn list_labels(&self) -> todo_core::Result<Vec<Label>> {
        Ok(vec![Label {
            name: "errand".to_string(),
            color: "#00aa00".to_string(),
        }])
    }

    async fn create_issue(&self, title: &str, labels: &[String]) -> todo_core::Result<String> {
        self.created
            .lock()
            .unwrap()
            .push((title.to_string(), labels.to_vec()));
        Ok("https://github.com/me/todos/issues/1".to_string())
    }
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    fetches: Arc<AtomicUsize>,
    prefs: PrefsStore,
    shutdown_tx: oneshot::Sender<()>,
    server_task: JoinHandle<()>,
    _state_dir: tempfile::TempDir,
}

impl TestApp {
    async fn spawn(todo_repo: Option<Box<dyn TodoRepo>>) -> Self {
        let state_dir = tempfile::TempDir::new().expect("create temp dir");
        let prefs = PrefsStore::new(state_dir.path().join("issues.toml"));
        let cache = CacheStore::new(state_dir.path().join("cache"));
        let fetches = Arc::new(AtomicUsize::new(0));

        let sources: Vec<Box<dyn IssueSource>> = vec![
            Box::new(StubSource {
                issues: vec![
                    sample_issue("github-1", "Fix the flaky login test"),
                    sample_issue("github-2", "Upgrade the webserver"),
                ],
                fetches: fetches.clone(),
            }),
            Box::new(BrokenSource),
        ];

        let state = Arc::new(AppState::new(
            sources,
            todo_repo,
            true,
            prefs.clone(),
            cache,
            Duration::from_secs(600),
        ));

        let app = todo_web::router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            server.await.expect("run test server");
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build client");

        TestApp {
            base_url: format!("http://{}", addr),
            client,
            fetches,
            prefs,
            shutdown_tx,
            server_task,
            _state_dir: state_dir,
        }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request")
    }

    async fn get_body(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert!(response.status().is_success(), "GET {} failed", path);
        response.text().await.expect("body")
    }

    async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        self.server_task.await.expect("server task");
    }
}

fn assert_redirects_home(response: &reqwest::Response) {
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");
}

#[tokio::test]
async fn dashboard_lists_issues_and_survives_broken_source() {
    let app = TestApp::spawn(None).await;

    let body = app.get_body("/").await;
    assert!(body.contains("Fix the flaky login test"));
    assert!(body.contains("Upgrade the webserver"));
    // Only the stub source contributes; the broken one is skipped
    assert!(body.contains("<strong>2</strong> total"));
    // Nothing marked seen yet, so both issues carry the new badge
    assert!(body.contains("badge-new"));

    app.shutdown().await;
}

#[tokio::test]
async fn cache_serves_second_request_and_reload_breaks_it() {
    let app = TestApp::spawn(None).await;

    app.get_body("/").await;
    app.get_body("/").await;
    assert_eq!(app.fetches.load(Ordering::SeqCst), 1);

    let response = app.get("/reload").await;
    assert_redirects_home(&response);

    app.get_body("/").await;
    assert_eq!(app.fetches.load(Ordering::SeqCst), 2);

    app.shutdown().await;
}

#[tokio::test]
async fn ranking_pins_issue_and_marks_it_seen() {
    let app = TestApp::spawn(None).await;
    app.get_body("/").await;

    let response = app.get("/ranking?issue=github-2&rank=pin").await;
    assert_redirects_home(&response);

    let prefs = app.prefs.read();
    assert_eq!(prefs["github-2"].rank, Rank::Pin);

    let body = app.get_body("/").await;
    // Pinned issue sorts above the other one
    let pinned = body.find("Upgrade the webserver").unwrap();
    let other = body.find("Fix the flaky login test").unwrap();
    assert!(pinned < other);
    // Ranking implies seen: exactly one new issue left
    assert!(body.contains("1 new"));

    app.shutdown().await;
}

#[tokio::test]
async fn hidden_issues_only_show_under_hidden_filter() {
    let app = TestApp::spawn(None).await;
    app.get_body("/").await;

    let response = app.get("/hide?issue=github-1").await;
    assert_redirects_home(&response);

    let body = app.get_body("/").await;
    assert!(!body.contains("Fix the flaky login test"));
    assert!(body.contains("<strong>1</strong> total"));

    let hidden = app.get_body("/?filter=hidden").await;
    assert!(hidden.contains("Fix the flaky login test"));
    assert!(!hidden.contains("Upgrade the webserver"));

    app.shutdown().await;
}

#[tokio::test]
async fn todolist_filter_shows_only_listed_issues() {
    let app = TestApp::spawn(None).await;
    app.get_body("/").await;

    let response = app.get("/todolist?issue=github-2").await;
    assert_redirects_home(&response);

    let body = app.get_body("/?filter=todolist").await;
    assert!(body.contains("Upgrade the webserver"));
    assert!(!body.contains("Fix the flaky login test"));

    app.shutdown().await;
}

#[tokio::test]
async fn mark_as_seen_clears_new_badges() {
    let app = TestApp::spawn(None).await;

    let body = app.get_body("/").await;
    assert!(body.contains("badge-new"));

    let response = app.get("/mark-as-seen?issues=github-1,github-2").await;
    assert_redirects_home(&response);

    let body = app.get_body("/").await;
    assert!(!body.contains("badge-new"));

    app.shutdown().await;
}

#[tokio::test]
async fn new_issue_form_requires_configured_todo_repo() {
    let app = TestApp::spawn(None).await;

    let response = app.get("/new").await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    app.shutdown().await;
}

#[tokio::test]
async fn new_issue_form_submits_to_todo_repo() {
    let created = Arc::new(Mutex::new(Vec::new()));
    let todo_repo = StubTodoRepo {
        created: created.clone(),
    };
    let app = TestApp::spawn(Some(Box::new(todo_repo))).await;

    let body = app.get_body("/new").await;
    assert!(body.contains("errand"));
    assert!(body.contains("#00aa00"));

    let response = app
        .client
        .post(format!("{}/new", app.base_url))
        .form(&[
            ("issue_title", "Water the plants"),
            ("labels", "errand"),
            ("submit_and_index", "1"),
        ])
        .send()
        .await
        .expect("post form");
    assert_redirects_home(&response);

    let created = created.lock().unwrap();
    assert_eq!(
        *created,
        vec![("Water the plants".to_string(), vec!["errand".to_string()])]
    );

    app.shutdown().await;
}
