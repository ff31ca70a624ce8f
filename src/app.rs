use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::animation::{ReplaySchedule, ScrollEvent, replay_schedule};
use crate::auth::{self, CurrentUser, current_user, require_auth};
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::post::{BlogPost, EditorForm, NewPost, PostPatch};
use crate::seed;
use crate::service::BlogService;
use crate::store::open_store;
use crate::views::{IndexPage, Views};

pub struct AppState {
    pub service: BlogService,
    pub views: Views,
    pub config: SiteConfig,
    /// Set once the first landing-page visit has tried seeding
    pub seeded: AtomicBool,
}

pub fn build_state(config: SiteConfig) -> Result<Arc<AppState>> {
    let store = open_store(&config.backend())?;
    Ok(Arc::new(AppState {
        service: BlogService::new(store),
        views: Views::new()?,
        config,
        seeded: AtomicBool::new(false),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .route("/", get(serve_index))
        .route("/about", get(serve_about))
        .route("/blog/:id", get(serve_post))
        .route(
            "/blog/:id/delete",
            post(delete_post).route_layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/create",
            get(serve_create)
                .post(create_post)
                .route_layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/edit/:id",
            get(serve_edit)
                .post(update_post)
                .route_layer(middleware::from_fn(require_auth)),
        )
        .route("/auth", get(auth::serve_auth_page))
        .route("/auth/signin", post(auth::handle_signin))
        .route("/auth/signup", post(auth::handle_signup))
        .route("/auth/signout", post(auth::handle_signout))
        .route("/api/session", get(auth::session_info))
        .route(
            "/api/posts",
            get(api_list_posts)
                .merge(post(api_create_post).route_layer(middleware::from_fn(require_auth))),
        )
        .route(
            "/api/posts/:id",
            get(api_get_post).merge(
                put(api_update_post)
                    .delete(api_delete_post)
                    .route_layer(middleware::from_fn(require_auth)),
            ),
        )
        .route("/api/animations/replay", post(api_replay))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(serve_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Seed an empty store before the first request, unless seeding is off
pub async fn warm_up(state: &AppState) {
    if state.config.no_seed {
        return;
    }
    if let Some(report) = seed::seed_once(&state.service, &state.seeded).await {
        log::info!("Startup seeding added {} articles", report.added);
    }
}

pub async fn run(config: SiteConfig) -> Result<()> {
    let addr = config.addr;
    let state = build_state(config)?;
    warm_up(&state).await;
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    #[serde(default)]
    welcome: Option<String>,
    #[serde(default)]
    notice: Option<String>,
}

fn user_email(user: &Option<CurrentUser>) -> Option<&str> {
    user.as_ref().map(|u| u.email.as_str())
}

fn redirect_with_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(notice)))
}

async fn serve_index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    if !state.config.no_seed {
        seed::seed_once(&state.service, &state.seeded).await;
    }
    let user = current_user(&jar);
    let (posts, load_error) = match state.service.all_posts().await {
        Ok(posts) => (posts, false),
        Err(e) => {
            log::error!("Error fetching articles: {}", e);
            (Vec::new(), true)
        }
    };
    let html = state.views.index(&IndexPage {
        posts: &posts,
        user: user_email(&user),
        welcome: query.welcome.is_some(),
        notice: query.notice.as_deref(),
        load_error,
    })?;
    Ok(Html(html))
}

async fn serve_about(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Html<String>> {
    let user = current_user(&jar);
    Ok(Html(state.views.about(user_email(&user))?))
}

async fn serve_post(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let user = current_user(&jar);
    let email = user_email(&user);
    match state.service.post(&id).await {
        Ok(Some(post)) => {
            let html = state.views.post(Some(&post), email, query.notice.as_deref())?;
            Ok(Html(html).into_response())
        }
        Ok(None) => {
            let html = state.views.post(None, email, None)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(e) => {
            log::error!("Error fetching article {}: {}", id, e);
            let html = state.views.post(None, email, None)?;
            Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}

async fn serve_not_found(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Response> {
    let user = current_user(&jar);
    let html = state.views.not_found(user_email(&user))?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

async fn serve_create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>> {
    let html = state
        .views
        .editor(&EditorForm::default(), None, Some(&user.email), None)?;
    Ok(Html(html))
}

/// Validate the editor form, filling in a placeholder image when needed
fn form_to_post(form: &EditorForm) -> Result<NewPost> {
    let mut rng = rand::thread_rng();
    form.clone().into_new_post(&mut rng)
}

fn editor_with_notice(
    state: &AppState,
    form: &EditorForm,
    editing: Option<&str>,
    user: &CurrentUser,
    notice: &str,
) -> Result<Response> {
    let html = state
        .views
        .editor(form, editing, Some(&user.email), Some(notice))?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<EditorForm>,
) -> Result<Response> {
    let new_post = match form_to_post(&form) {
        Ok(post) => post,
        Err(Error::Validation(msg)) => {
            return editor_with_notice(&state, &form, None, &user, &msg);
        }
        Err(e) => return Err(e),
    };
    match state.service.create(new_post).await {
        Ok(post) => {
            log::info!("{} published {}", user.email, post.id);
            let path = format!("/blog/{}", post.id);
            Ok(redirect_with_notice(&path, "Your article has been published successfully.")
                .into_response())
        }
        Err(e) => {
            log::error!("Error creating article: {}", e);
            editor_with_notice(
                &state,
                &form,
                None,
                &user,
                "An error occurred while creating the article.",
            )
        }
    }
}

async fn serve_edit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.service.post(&id).await {
        Ok(Some(post)) => {
            let form = EditorForm::from_post(&post);
            let html = state
                .views
                .editor(&form, Some(&id), Some(&user.email), None)?;
            Ok(Html(html).into_response())
        }
        Ok(None) => {
            let html = state.views.not_found(Some(&user.email))?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(e) => {
            log::error!("Error loading article {} for editing: {}", id, e);
            let html = state.views.editor(
                &EditorForm::default(),
                Some(&id),
                Some(&user.email),
                Some("Unable to load this article. Please try again."),
            )?;
            Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<EditorForm>,
) -> Result<Response> {
    let patch = match form_to_post(&form) {
        Ok(post) => PostPatch::from(post),
        Err(Error::Validation(msg)) => {
            return editor_with_notice(&state, &form, Some(&id), &user, &msg);
        }
        Err(e) => return Err(e),
    };
    match state.service.update(&id, patch).await {
        Ok(Some(post)) => {
            log::info!("{} updated {}", user.email, post.id);
            let path = format!("/blog/{}", post.id);
            Ok(redirect_with_notice(&path, "Your changes have been saved.").into_response())
        }
        Ok(None) => {
            let html = state.views.not_found(Some(&user.email))?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(e) => {
            log::error!("Error updating article {}: {}", id, e);
            editor_with_notice(
                &state,
                &form,
                Some(&id),
                &user,
                "An error occurred while updating the article.",
            )
        }
    }
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Redirect {
    match state.service.delete(&id).await {
        Ok(()) => {
            log::info!("{} deleted {}", user.email, id);
            redirect_with_notice("/", "The article has been deleted successfully.")
        }
        Err(e) => {
            log::error!("Error deleting article {}: {}", id, e);
            redirect_with_notice(
                &format!("/blog/{}", id),
                "An error occurred while deleting the article.",
            )
        }
    }
}

async fn api_list_posts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BlogPost>>> {
    Ok(Json(state.service.all_posts().await?))
}

async fn api_get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>> {
    Ok(Json(state.service.require_post(&id).await?))
}

async fn api_create_post(
    State(state): State<Arc<AppState>>,
    Json(post): Json<NewPost>,
) -> Result<(StatusCode, Json<BlogPost>)> {
    post.validate()?;
    let created = state.service.create(post).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn api_update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<BlogPost>> {
    if patch.is_empty() {
        return Err(Error::Validation("Nothing to update".to_string()));
    }
    state
        .service
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("post {}", id)))
}

async fn api_delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayRequest {
    events: Vec<ScrollEvent>,
    #[serde(default = "default_speed")]
    speed: f64,
    /// Sections present on the replaying page; every section when absent
    #[serde(default)]
    sections: Option<Vec<String>>,
}

fn default_speed() -> f64 {
    1.0
}

#[derive(Debug, serde::Serialize)]
struct ReplayResponse {
    duration: f64,
    #[serde(flatten)]
    schedule: ReplaySchedule,
}

/// Turn a recorded trace into the scrubs a page applies to replay it
async fn api_replay(Json(request): Json<ReplayRequest>) -> Result<Json<ReplayResponse>> {
    let sections = request.sections;
    let known = |id: &str| {
        sections
            .as_ref()
            .is_none_or(|list| list.iter().any(|s| s == id))
    };
    let schedule = replay_schedule(&request.events, request.speed, known)
        .ok_or_else(|| Error::Validation("No events to replay".to_string()))?;
    Ok(Json(ReplayResponse {
        duration: schedule.duration(),
        schedule,
    }))
}
