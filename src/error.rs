use thiserror::Error;

/// Result type alias for atelier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the site
#[derive(Error, Debug)]
pub enum Error {
    /// The hosted store answered with a non-success status
    #[error("remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure talking to the hosted store
    #[cfg(feature = "web")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Trace archive could not be encoded or decoded
    #[error("trace archive error: {0}")]
    Archive(#[from] bincode::Error),

    #[error("{0} not found")]
    NotFound(String),

    /// User input rejected before it reached the store
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[cfg(feature = "web")]
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[cfg(feature = "web")]
    #[error("template syntax error: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),
}

impl Error {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Error::Remote {
            status,
            message: message.into(),
        }
    }
}

#[cfg(feature = "web")]
mod response {
    use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };

    use super::Error;

    impl Error {
        pub fn status_code(&self) -> StatusCode {
            match self {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::Validation(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
                Error::Auth(_) => StatusCode::UNAUTHORIZED,
                Error::Remote { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
                Error::Io(_) | Error::Archive(_) | Error::Template(_) | Error::TemplateSyntax(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                log::error!("request failed: {}", self);
            }
            (
                status,
                Json(serde_json::json!({
                    "status": "error",
                    "message": self.to_string(),
                })),
            )
                .into_response()
        }
    }
}
