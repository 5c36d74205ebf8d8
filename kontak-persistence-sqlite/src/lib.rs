use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod profiles;

/// All fields are TEXT; optional fields are stored as empty strings and
/// timestamps as RFC 3339.
pub const PROFILES_SCHEMA: &str = "CREATE TABLE profiles (
    id TEXT PRIMARY KEY,
    pin TEXT NOT NULL,
    unique_code TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT '',
    full_name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    job_title TEXT NOT NULL DEFAULT '',
    company_name TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    mobile_primary TEXT NOT NULL DEFAULT '',
    landline_number TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    about_text TEXT NOT NULL DEFAULT '',
    facebook_link TEXT NOT NULL DEFAULT '',
    instagram_link TEXT NOT NULL DEFAULT '',
    tiktok_link TEXT NOT NULL DEFAULT '',
    whatsapp_number TEXT NOT NULL DEFAULT '',
    viber_number TEXT NOT NULL DEFAULT '',
    website_link TEXT NOT NULL DEFAULT '',
    profile_photo TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL DEFAULT ''
);";

pub async fn create_profile_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("KONTAK_PROFILE_DB").expect("KONTAK_PROFILE_DB env var not set");
    let options = SqliteConnectOptions::new().filename(&db_path);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to create profile DB pool")
}
