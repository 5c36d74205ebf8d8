use std::sync::Arc;

use log::info;

use kontak_persistence_sqlite::profiles::SqliteProfileRepository;
use kontak_server_domain::{
    profile::MemoryProfileRepository,
    service::{ArcPhotoStorage, ArcProfileRepository, ArcProfileService, ProfileServiceImpl},
};

use crate::photos::FsPhotoStorage;

mod logs;
mod photos;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

async fn select_profile_repository() -> ArcProfileRepository {
    let store = std::env::var("KONTAK_STORE").unwrap_or_else(|_| "sqlite".to_string());
    match store.as_str() {
        "memory" => {
            info!("Using in-memory profile store with sample records");
            Arc::new(Box::new(MemoryProfileRepository::with_sample_profiles()))
        }
        "sqlite" => {
            info!("Using SQLite profile store");
            Arc::new(Box::new(SqliteProfileRepository::connect().await))
        }
        other => panic!("Unknown KONTAK_STORE value: {}", other),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger();

    let profile_repository = select_profile_repository().await;
    let photo_storage: ArcPhotoStorage = Arc::new(Box::new(FsPhotoStorage::from_env()));
    let profile_service: ArcProfileService = Arc::new(Box::new(ProfileServiceImpl::new(
        profile_repository,
        photo_storage,
    )));

    info!("Starting application");

    kontak_server_api::run(profile_service, shutdown_signal()).await;
}
