//! Integration tests for the HTTP layer.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own database file and static
//! root inside a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use futures::future::join_all;
use libre_questions_db::{Database, DatabaseConfig, UserRecord, UserStore};
use libre_questions_web::{AppState, CounterService, Templates, build_router};
use tempfile::TempDir;
use tower::ServiceExt;

const VISITOR: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

struct TestApp {
    _dir: TempDir,
    state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();

        let config = DatabaseConfig::new(dir.path().join("users.db")).with_max_connections(4);
        let db = Database::connect(&config).await.expect("open database");
        db.run_migrations().await.expect("run migrations");

        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("style.css"), "body { margin: 0; }").unwrap();

        let templates = Templates::from_sources(
            [
                ("index", "index name={{ name }} total={{ total }}"),
                ("greeting", "greeting name={{ name }} total={{ total }}"),
                ("counter", "counter total={{ total }}"),
                ("about", "about id={{ id }}"),
            ]
            .into_iter()
            .map(|(name, source)| (name.to_owned(), source.to_owned())),
        )
        .unwrap();

        let state = Arc::new(AppState::new(
            CounterService::new(db),
            templates,
            static_dir,
        ));
        let router = build_router(Arc::clone(&state));

        Self {
            _dir: dir,
            state,
            router,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get_as(&self, uri: &str, id: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(COOKIE, format!("id={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    fn store(&self) -> UserStore<'_> {
        UserStore::new(self.state.counter.database().pool())
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_owned())
        .collect()
}

fn cookie_value(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("id="))
        .expect("id cookie")
}

// =========================================================================
// Sessions
// =========================================================================

#[tokio::test]
async fn first_visit_issues_one_session_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);

    let cookie = &cookies[0];
    let value = cookie_value(cookie);
    assert_eq!(value.len(), 64);
    assert!(value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Expires="));
}

#[tokio::test]
async fn returning_visitor_keeps_cookie() {
    let app = TestApp::new().await;

    let response = app.get_as("/", VISITOR).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn issued_cookie_identifies_later_requests() {
    let app = TestApp::new().await;

    let first = app
        .send(
            Request::get("/name?name=Alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let id = cookie_value(&set_cookies(&first)[0]).to_owned();

    let second = app.get_as("/", &id).await;
    assert!(set_cookies(&second).is_empty());
    assert_eq!(body_text(second).await, "index name=Alice total=0");
}

#[tokio::test]
async fn issuance_happens_on_static_and_error_paths_too() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/nope.txt").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(set_cookies(&response).len(), 1);

    let response = app
        .send(Request::get("/name").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(set_cookies(&response).len(), 1);
}

// =========================================================================
// Set name
// =========================================================================

#[tokio::test]
async fn set_name_creates_record_and_renders_greeting() {
    let app = TestApp::new().await;

    let response = app.get_as("/name?name=Alice", VISITOR).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("text/html")
    );
    assert_eq!(body_text(response).await, "greeting name=Alice total=0");
    assert_eq!(
        app.store().find_by_id(VISITOR).await.unwrap(),
        Some(UserRecord {
            id: VISITOR.to_owned(),
            name: "Alice".to_owned(),
            total: 0,
        })
    );
}

#[tokio::test]
async fn set_name_accepts_form_post() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::post("/name")
                .header(COOKIE, format!("id={VISITOR}"))
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Bob"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "greeting name=Bob total=0");
}

#[tokio::test]
async fn set_name_keeps_total() {
    let app = TestApp::new().await;

    app.get_as("/name?name=Alice", VISITOR).await;
    app.get_as("/increase_count", VISITOR).await;
    app.get_as("/increase_count", VISITOR).await;

    let response = app.get_as("/name?name=Alice", VISITOR).await;
    assert_eq!(body_text(response).await, "greeting name=Alice total=2");
}

#[tokio::test]
async fn empty_name_is_bad_request_without_body_or_mutation() {
    let app = TestApp::new().await;
    app.get_as("/name?name=Alice", VISITOR).await;
    app.get_as("/increase_count", VISITOR).await;

    let response = app.get_as("/name?name=", VISITOR).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.is_empty());

    let record = app.store().find_by_id(VISITOR).await.unwrap().unwrap();
    assert_eq!(record.name, "Alice");
    assert_eq!(record.total, 1);
}

#[tokio::test]
async fn empty_name_for_new_visitor_creates_nothing() {
    let app = TestApp::new().await;

    let response = app.get_as("/name", VISITOR).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store().count().await.unwrap(), 0);
}

// =========================================================================
// Increment
// =========================================================================

#[tokio::test]
async fn increments_render_counter_fragment() {
    let app = TestApp::new().await;
    app.get_as("/name?name=Alice", VISITOR).await;

    for expected in 1..=3 {
        let response = app
            .send(
                Request::post("/increase_count")
                    .header(COOKIE, format!("id={VISITOR}"))
                    .header("HX-Request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, format!("counter total={expected}"));
    }
}

#[tokio::test]
async fn increment_without_record_is_a_silent_no_op() {
    let app = TestApp::new().await;

    let response = app.get_as("/increase_count", VISITOR).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "counter total=0");
    assert!(app.store().find_by_id(VISITOR).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_increments_lose_no_updates() {
    let app = TestApp::new().await;
    app.get_as("/name?name=Alice", VISITOR).await;

    let requests = (0..25).map(|_| {
        let router = app.router.clone();
        tokio::spawn(async move {
            router
                .oneshot(
                    Request::post("/increase_count")
                        .header(COOKIE, format!("id={VISITOR}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
        })
    });

    for response in join_all(requests).await {
        assert_eq!(response.unwrap().unwrap().status(), StatusCode::OK);
    }

    let record = app.store().find_by_id(VISITOR).await.unwrap().unwrap();
    assert_eq!(record.total, 25);
}

// =========================================================================
// Pages and static assets
// =========================================================================

#[tokio::test]
async fn index_renders_placeholder_for_unknown_visitor() {
    let app = TestApp::new().await;

    let response = app.get_as("/", VISITOR).await;

    assert_eq!(body_text(response).await, "index name= total=0");
    assert_eq!(app.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn any_template_is_a_page() {
    let app = TestApp::new().await;
    app.get_as("/name?name=Alice", VISITOR).await;

    let response = app.get_as("/about", VISITOR).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, format!("about id={VISITOR}"));
}

#[tokio::test]
async fn unknown_paths_fall_through_to_static_files() {
    let app = TestApp::new().await;

    let found = app.get_as("/style.css", VISITOR).await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_text(found).await, "body { margin: 0; }");

    let missing = app.get_as("/missing.js", VISITOR).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_answer_any_method() {
    let app = TestApp::new().await;

    for method in ["POST", "PUT", "DELETE"] {
        let found = app
            .send(
                Request::builder()
                    .method(method)
                    .uri("/style.css")
                    .header(COOKIE, format!("id={VISITOR}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(found.status(), StatusCode::OK, "{method} /style.css");
        assert_eq!(body_text(found).await, "body { margin: 0; }");

        let missing = app
            .send(
                Request::builder()
                    .method(method)
                    .uri("/missing.js")
                    .header(COOKIE, format!("id={VISITOR}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND, "{method} /missing.js");
    }

    let head = app
        .send(
            Request::head("/style.css")
                .header(COOKIE, format!("id={VISITOR}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(head.status(), StatusCode::OK);
    assert!(body_text(head).await.is_empty());
}

#[tokio::test]
async fn static_files_never_touch_the_store() {
    let app = TestApp::new().await;
    app.state.counter.database().close().await;

    let found = app.get_as("/style.css", VISITOR).await;
    assert_eq!(found.status(), StatusCode::OK);

    let missing = app.get_as("/missing.js", VISITOR).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_is_bare_internal_error() {
    let app = TestApp::new().await;
    app.state.counter.database().close().await;

    for uri in ["/", "/name?name=Alice", "/increase_count"] {
        let response = app.get_as(uri, VISITOR).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(body_text(response).await.is_empty(), "{uri}");
    }
}
