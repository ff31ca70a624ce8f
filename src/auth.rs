#![cfg(not(tarpaulin_include))]

use std::collections::HashMap;
use std::fs::{self, create_dir_all};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Form, Json,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{Error, Result};
use crate::views::AuthMode;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "session";
const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds
const MIN_PASSWORD_LEN: usize = 6;

/// A registered account
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub email: String,

    /// Argon2 hash of the user's password
    pub password_hash: String,

    pub created_at: SystemTime,
}

/// Sign-in / sign-up form
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,

    /// Where to go after signing in
    #[serde(default)]
    pub next: Option<String>,
}

/// A signed-in visitor, attached to requests by [`require_auth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub expires_at: SystemTime,
}

lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Read all accounts; a missing file means no accounts yet
pub fn get_users(users_file: &Path) -> Result<HashMap<String, User>> {
    if !users_file.exists() {
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(users_file)?;
    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_users(users_file: &Path, users: &HashMap<String, User>) -> Result<()> {
    if let Some(dir) = users_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(users)?;
    fs::write(users_file, json)?;
    Ok(())
}

/// Create an account. Emails are matched case-insensitively.
pub fn register_user(users_file: &Path, email: &str, password: &str) -> Result<()> {
    let email = normalize_email(email);
    if !EMAIL_RE.is_match(&email) {
        return Err(Error::Validation("Please enter a valid email address".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let mut users = get_users(users_file)?;
    if users.contains_key(&email) {
        return Err(Error::Validation("User already registered".to_string()));
    }

    let user = User {
        email: email.clone(),
        password_hash: hash_password(password)?,
        created_at: SystemTime::now(),
    };
    users.insert(email.clone(), user);
    save_users(users_file, &users)?;
    log::info!("registered account {}", email);
    Ok(())
}

pub fn verify_user(users_file: &Path, email: &str, password: &str) -> Result<bool> {
    let users = get_users(users_file)?;
    match users.get(&normalize_email(email)) {
        Some(user) => verify_password(password, &user.password_hash),
        None => Ok(false),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| Error::Auth("Password hashing failed".to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| Error::Auth("Invalid password hash format".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Start a session and return its id
pub fn create_session(email: &str) -> String {
    let session_id = Uuid::new_v4().to_string();
    let session = Session {
        email: normalize_email(email),
        expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
    };
    if let Ok(mut sessions) = SESSIONS.write() {
        sessions.retain(|_, s| s.expires_at > SystemTime::now());
        sessions.insert(session_id.clone(), session);
    }
    session_id
}

/// Email of the session's owner, if the session exists and has not expired
pub fn validate_session(session_id: &str) -> Option<String> {
    let sessions = SESSIONS.read().ok()?;
    sessions
        .get(session_id)
        .filter(|s| s.expires_at > SystemTime::now())
        .map(|s| s.email.clone())
}

pub fn end_session(session_id: &str) {
    if let Ok(mut sessions) = SESSIONS.write() {
        sessions.remove(session_id);
    }
}

/// Signed-in user for a request, if any
pub fn current_user(jar: &CookieJar) -> Option<CurrentUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    validate_session(cookie.value()).map(|email| CurrentUser { email })
}

fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

/// Only allow local redirect targets. Browsers read `\` as `/`, so it is refused.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path[1..].starts_with(['/', '\\'])
                && !path.chars().any(|c| c == '\\' || c.is_control()) =>
        {
            path
        }
        _ => "/",
    }
}

fn notice_redirect(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(notice)))
}

/// Gate for routes that create, edit or delete articles
///
/// Signed-in requests get a [`CurrentUser`] extension. Anonymous API calls get
/// a 401; anonymous page visits are sent to the sign-in page.
pub async fn require_auth(jar: CookieJar, mut request: Request, next: Next) -> Response {
    if let Some(user) = current_user(&jar) {
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if path.starts_with("/api/") {
        return Error::Auth("Authentication required".to_string()).into_response();
    }
    Redirect::to(&format!(
        "/auth?notice={}&next={}",
        urlencoding::encode("Please sign in to create or edit articles."),
        urlencoding::encode(&path)
    ))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// `GET /auth`
pub async fn serve_auth_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<AuthQuery>,
) -> Result<Response> {
    if current_user(&jar).is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let mode = match query.mode.as_deref() {
        Some("signup") => AuthMode::SignUp,
        _ => AuthMode::SignIn,
    };
    let html = state.views.auth(
        mode,
        query.notice.as_deref(),
        safe_next(query.next.as_deref()),
    )?;
    Ok(Html(html).into_response())
}

/// Run password hashing and `users.json` I/O off the async workers
async fn off_runtime<T: Send + 'static>(
    work: impl FnOnce() -> Result<T> + Send + 'static,
) -> Result<T> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// `POST /auth/signin`
pub async fn handle_signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    let users_file = state.config.users_file();
    let (email, password) = (credentials.email.clone(), credentials.password.clone());
    match off_runtime(move || verify_user(&users_file, &email, &password)).await {
        Ok(true) => {
            let session_id = create_session(&credentials.email);
            let target = safe_next(credentials.next.as_deref());
            let target = if target == "/" { "/?welcome=1" } else { target };
            (jar.add(session_cookie(session_id)), Redirect::to(target)).into_response()
        }
        Ok(false) => {
            notice_redirect("/auth", "Invalid login credentials").into_response()
        }
        Err(e) => {
            log::error!("sign-in failed: {}", e);
            notice_redirect("/auth", "An unexpected error occurred.").into_response()
        }
    }
}

/// `POST /auth/signup`
pub async fn handle_signup(
    State(state): State<Arc<AppState>>,
    Form(credentials): Form<Credentials>,
) -> Redirect {
    let users_file = state.config.users_file();
    let Credentials { email, password, .. } = credentials;
    match off_runtime(move || register_user(&users_file, &email, &password)).await {
        Ok(()) => notice_redirect("/auth", "Account created! You can now sign in."),
        Err(Error::Validation(msg)) => {
            Redirect::to(&format!("/auth?mode=signup&notice={}", urlencoding::encode(&msg)))
        }
        Err(e) => {
            log::error!("sign-up failed: {}", e);
            Redirect::to("/auth?mode=signup&notice=An+unexpected+error+occurred.")
        }
    }
}

/// `POST /auth/signout`
pub async fn handle_signout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        end_session(cookie.value());
    }
    (
        jar.remove(session_cookie(String::new())),
        Redirect::to("/"),
    )
}

/// `GET /api/session`, for client-side scripts
pub async fn session_info(jar: CookieJar) -> impl IntoResponse {
    match current_user(&jar) {
        Some(user) => (
            StatusCode::OK,
            Json(serde_json::json!({ "signedIn": true, "email": user.email })),
        ),
        None => (
            StatusCode::OK,
            Json(serde_json::json!({ "signedIn": false })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn register_then_verify() {
        let dir = tempdir().unwrap();
        let users = dir.path().join("users.json");
        register_user(&users, "Reader@Example.com", "secret123").unwrap();

        assert!(verify_user(&users, "reader@example.com", "secret123").unwrap());
        assert!(!verify_user(&users, "reader@example.com", "wrong-pass").unwrap());
        assert!(!verify_user(&users, "nobody@example.com", "secret123").unwrap());

        let stored = get_users(&users).unwrap();
        assert!(!stored["reader@example.com"].password_hash.contains("secret123"));
    }

    #[test]
    fn registration_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let users = dir.path().join("users.json");
        assert!(matches!(
            register_user(&users, "not-an-email", "secret123"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            register_user(&users, "a@b.co", "12345"),
            Err(Error::Validation(_))
        ));
        register_user(&users, "a@b.co", "123456").unwrap();
        assert!(matches!(
            register_user(&users, "A@B.co", "123456"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn sessions_validate_until_ended() {
        let id = create_session("writer@example.com");
        assert_eq!(validate_session(&id).as_deref(), Some("writer@example.com"));
        end_session(&id);
        assert!(validate_session(&id).is_none());
        assert!(validate_session("not-a-session").is_none());
    }

    #[test]
    fn redirect_targets_stay_local() {
        assert_eq!(safe_next(Some("/edit/1")), "/edit/1");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/blog/1\\..")), "/");
        assert_eq!(safe_next(Some("/\t/evil.example")), "/");
        assert_eq!(safe_next(Some("/create\nLocation: x")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
