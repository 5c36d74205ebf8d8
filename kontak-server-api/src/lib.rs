use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use log::info;
use tower_http::services::ServeDir;

use kontak_server_domain::{ServiceError, service::ArcProfileService};

pub mod profiles;

// Multipart bodies may exceed the photo ceiling slightly; the service
// enforces the 5 MiB limit itself.
const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub profile_service: ArcProfileService,
}

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        let (status, msg) = match self.0 {
            ServiceError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ServiceError::Unauthorized(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            ServiceError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::UploadRejected(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn build_router(profile_service: ArcProfileService) -> Router {
    let upload_dir =
        std::env::var("KONTAK_UPLOAD_DIR").expect("KONTAK_UPLOAD_DIR env var not set");

    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/profiles/verify", post(profiles::verify))
                .route(
                    "/profiles/{unique_code}",
                    get(profiles::get_by_code).put(profiles::update),
                )
                .route("/profiles/{unique_code}/upload", post(profiles::upload_photo)),
        )
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(AppState { profile_service })
}

pub async fn run(
    profile_service: ArcProfileService,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = build_router(profile_service);

    let port = std::env::var("KONTAK_HTTP_PORT")
        .expect("KONTAK_HTTP_PORT must be set")
        .parse::<u16>()
        .expect("KONTAK_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    info!("API server listening on port {}", port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP API shut down gracefully");
}
