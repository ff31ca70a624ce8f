use atelier::app::{build_state, router, warm_up};
use atelier::config::SiteConfig;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

fn site(seed: bool) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SiteConfig::local(dir.path());
    config.no_seed = !seed;
    let state = build_state(config).unwrap();
    (dir, router(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Register and sign in, returning the session cookie
async fn sign_in(app: &Router, email: &str) -> String {
    let credentials = format!("email={}&password=secret123", urlencoding::encode(email));
    let (status, location, _) = send(app, form("/auth/signup", &credentials, None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.unwrap().contains("Account%20created"));

    let response = app
        .clone()
        .oneshot(form("/auth/signin", &credentials, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?welcome=1");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn landing_page_seeds_an_empty_store() {
    let (_dir, app) = site(true);
    let (status, _, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("The Rise of AI in Everyday Life"));
    assert!(body.contains("id=\"blog-card-0\""));

    let (_, _, json) = send(&app, get("/api/posts", None)).await;
    let posts: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(posts.len(), atelier::seed::sample_articles().len());

    // a second visit does not seed again
    send(&app, get("/", None)).await;
    let (_, _, json) = send(&app, get("/api/posts", None)).await;
    let again: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(again.len(), posts.len());
}

#[tokio::test]
async fn static_pages_render() {
    let (_dir, app) = site(false);
    let (status, _, body) = send(&app, get("/about", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Passion-Driven"));

    let (status, _, body) = send(&app, get("/auth?mode=signup", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Create Account"));

    let (status, _, body) = send(&app, get("/no/such/page", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
}

#[tokio::test]
async fn missing_article_is_a_404_page() {
    let (_dir, app) = site(false);
    let (status, _, body) = send(&app, get("/blog/does-not-exist", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Article not found"));

    let (status, _, body) = send(&app, get("/api/posts/does-not-exist", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["status"], "error");
}

#[tokio::test]
async fn anonymous_writers_are_turned_away() {
    let (_dir, app) = site(false);
    let (status, location, _) = send(&app, get("/create", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location.unwrap();
    assert!(location.starts_with("/auth?notice="));
    assert!(location.ends_with("next=%2Fcreate"));

    let body = json!({ "title": "t", "content": "c", "author": "a" });
    let (status, _, _) = send(&app, json_request("POST", "/api/posts", &body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, json_request("DELETE", "/api/posts/x", &json!({}), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let (_dir, app) = site(false);
    let (_, location, _) = send(
        &app,
        form("/auth/signin", "email=nobody%40example.com&password=wrong1", None),
    )
    .await;
    assert!(location.unwrap().contains("Invalid%20login%20credentials"));

    let (_, location, _) = send(
        &app,
        form("/auth/signup", "email=short%40example.com&password=123", None),
    )
    .await;
    assert!(location.unwrap().starts_with("/auth?mode=signup&notice="));
}

#[tokio::test]
async fn signed_in_writer_publishes_edits_and_deletes() {
    let (_dir, app) = site(false);
    let cookie = sign_in(&app, "writer@example.com").await;

    let (status, _, body) = send(&app, get("/create", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Write New Article"));

    let (status, _, body) = send(
        &app,
        form("/create", "title=&content=Body&author=Me", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please fill in all required fields."));

    let (status, location, _) = send(
        &app,
        form(
            "/create",
            "title=Quiet+Luxury&content=First.%0A%0ASecond.&author=Me&tags=style%2C+craft",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location.unwrap();
    assert!(location.starts_with("/blog/"));
    let path = location.split('?').next().unwrap().to_string();
    let id = path.trim_start_matches("/blog/").to_string();

    let (status, _, body) = send(&app, get(&path, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Quiet Luxury"));
    assert!(body.contains("<p>Second.</p>"));
    assert!(body.contains(&format!("/edit/{}", id)));

    let (status, location, _) = send(
        &app,
        form(
            &format!("/edit/{}", id),
            "title=Quiet+Luxury+Revisited&content=Updated.&author=Me",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.unwrap().contains("saved"));
    let (_, _, body) = send(&app, get(&path, None)).await;
    assert!(body.contains("Quiet Luxury Revisited"));

    let (status, location, _) =
        send(&app, form(&format!("/blog/{}/delete", id), "", Some(&cookie))).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.unwrap().starts_with("/?notice="));
    let (status, _, _) = send(&app, get(&path, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_api_round_trip() {
    let (_dir, app) = site(false);
    let cookie = sign_in(&app, "api@example.com").await;

    let invalid = json!({ "title": "", "content": "c", "author": "a" });
    let (status, _, _) =
        send(&app, json_request("POST", "/api/posts", &invalid, Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let new_post = json!({
        "title": "Sustainable Fashion",
        "content": "Body",
        "author": "Sofia",
        "tags": ["sustainability"]
    });
    let (status, _, body) =
        send(&app, json_request("POST", "/api/posts", &new_post, Some(&cookie))).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created.get("publishedAt").is_some());

    let uri = format!("/api/posts/{}", id);
    let patch = json!({ "excerpt": "Short" });
    let (status, _, body) = send(&app, json_request("PUT", &uri, &patch, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["excerpt"], "Short");
    assert_eq!(updated["title"], "Sustainable Fashion");

    let (status, _, _) =
        send(&app, json_request("PUT", "/api/posts/missing", &patch, Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) =
        send(&app, json_request("DELETE", &uri, &json!({}), Some(&cookie))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_endpoint_reports_sign_in_state() {
    let (_dir, app) = site(false);
    let (_, _, body) = send(&app, get("/api/session", None)).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["signedIn"], false);

    let cookie = sign_in(&app, "session@example.com").await;
    let (_, _, body) = send(&app, get("/api/session", Some(&cookie))).await;
    let session: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(session["signedIn"], true);
    assert_eq!(session["email"], "session@example.com");

    let (_, location, _) = send(&app, form("/auth/signout", "", Some(&cookie))).await;
    assert_eq!(location.as_deref(), Some("/"));
    let (_, _, body) = send(&app, get("/api/session", Some(&cookie))).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["signedIn"], false);
}

#[tokio::test]
async fn replay_endpoint_builds_a_schedule() {
    let (_dir, app) = site(false);
    let trace = json!({
        "events": [
            { "timestamp": 0.0, "scrollY": 900.0, "sectionId": "blog-card-0",
              "animationProgress": 0.1, "visibility": 0.2 },
            { "timestamp": 400.0, "scrollY": 1100.0, "sectionId": "blog-card-1",
              "animationProgress": 0.3, "visibility": 0.5 },
            { "timestamp": 1000.0, "scrollY": 1300.0, "sectionId": "blog-card-0",
              "animationProgress": 0.6, "visibility": 1.0 }
        ],
        "speed": 2.0,
        "sections": ["blog-card-0"]
    });
    let (status, _, body) =
        send(&app, json_request("POST", "/api/animations/replay", &trace, None)).await;
    assert_eq!(status, StatusCode::OK);
    let schedule: Value = serde_json::from_str(&body).unwrap();
    let steps = schedule["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1]["at"], 0.5);
    assert_eq!(steps[1]["sectionId"], "blog-card-0");
    assert_eq!(schedule["duration"], 0.55);

    let empty = json!({ "events": [] });
    let (status, _, _) =
        send(&app, json_request("POST", "/api/animations/replay", &empty, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn startup_seeds_before_the_first_visit() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(SiteConfig::local(dir.path())).unwrap();
    warm_up(&state).await;
    let app = router(state);

    let (_, _, json) = send(&app, get("/api/posts", None)).await;
    let posts: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(posts.len(), atelier::seed::sample_articles().len());
}

#[tokio::test]
async fn editor_shows_a_notice_when_the_store_fails() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = SiteConfig::local(dir.path());
    config.no_seed = true;
    config.supabase_url = Some(server.uri());
    config.supabase_key = Some("anon".into());
    let app = router(build_state(config).unwrap());

    let cookie = sign_in(&app, "editor@example.com").await;
    let (status, _, body) = send(&app, get("/edit/42", Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Unable to load this article"));
    assert!(body.contains("<html"));
}
