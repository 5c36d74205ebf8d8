use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use kontak_persistence_sqlite::{PROFILES_SCHEMA, profiles::SqliteProfileRepository};
use kontak_server_domain::profile::{ProfileRepository, sample_profiles};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("KONTAK_PROFILE_DB").expect("KONTAK_PROFILE_DB env var not set");

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create parent directory for profile DB");
            println!(
                "Created parent directory for profile DB at {}",
                parent.display()
            );
        }
    }

    if std::path::Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path).expect("Failed to remove existing profile DB");
        println!("Removed existing profile DB at {}", db_path);
    }

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::query(PROFILES_SCHEMA)
        .execute(&pool)
        .await
        .expect("Failed to create profiles table");
    println!("Created new profile DB at {}", db_path);

    let repo = SqliteProfileRepository::new(pool);
    for profile in sample_profiles() {
        repo.create_profile(&profile)
            .await
            .expect("Failed to seed profile");
        println!("Seeded profile {} ({})", profile.id, profile.full_name);
    }
}
