use chrono::Utc;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use kontak_persistence_sqlite::profiles::SqliteProfileRepository;
use kontak_server_domain::{
    profile::{Profile, ProfileRepository, sentinels},
    util::{generate_pin, generate_unique_code, is_valid_pin},
};

/// Out-of-band provisioning: assigns the next id for today's date, generates
/// the PIN (unless given) and the public unique code, and inserts a record
/// with sentinel social values.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 && args.len() != 3 {
        eprintln!("Usage: add_profile <full_name> [<pin>]");
        std::process::exit(1);
    }

    let full_name = &args[1];
    let pin = if args.len() == 3 {
        if !is_valid_pin(&args[2]) {
            eprintln!("PIN must be exactly 5 digits");
            std::process::exit(1);
        }
        args[2].clone()
    } else {
        generate_pin()
    };

    let db_path = std::env::var("KONTAK_PROFILE_DB").expect("KONTAK_PROFILE_DB env var not set");
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create pool");

    let id = next_profile_id(&pool).await;
    let unique_code = generate_unique_code();

    let profile = Profile {
        id: id.clone(),
        pin: pin.clone(),
        unique_code: unique_code.clone(),
        full_name: full_name.clone(),
        facebook_link: sentinels::FACEBOOK_LINK.to_string(),
        instagram_link: sentinels::INSTAGRAM_LINK.to_string(),
        tiktok_link: sentinels::TIKTOK_LINK.to_string(),
        whatsapp_number: sentinels::WHATSAPP_NUMBER.to_string(),
        viber_number: sentinels::VIBER_NUMBER.to_string(),
        website_link: sentinels::WEBSITE_LINK.to_string(),
        created_at: Some(Utc::now()),
        ..Profile::default()
    };

    let repo = SqliteProfileRepository::new(pool);
    repo.create_profile(&profile)
        .await
        .expect("Failed to insert new profile");

    println!("Created profile [{}] for [{}]", id, full_name);
    println!("PIN: {}", pin);
    println!("Unique code: {}", unique_code);
}

/// Ids are `YYYYMMDD-NNNN-NNNN`; the 8-digit sequence restarts each day and
/// is split across the two trailing groups.
async fn next_profile_id(pool: &Pool<Sqlite>) -> String {
    let date = Utc::now().format("%Y%m%d").to_string();
    let latest: Option<String> =
        sqlx::query_scalar("SELECT id FROM profiles WHERE id LIKE ? ORDER BY id DESC LIMIT 1")
            .bind(format!("{}-%", date))
            .fetch_optional(pool)
            .await
            .expect("Failed to query for latest profile id");

    let sequence = latest
        .and_then(|id| {
            let digits: String = id
                .splitn(2, '-')
                .nth(1)
                .map(|tail| tail.chars().filter(|c| c.is_ascii_digit()).collect())
                .unwrap_or_default();
            digits.parse::<u64>().ok()
        })
        .unwrap_or(0)
        + 1;

    format!("{}-{:04}-{:04}", date, sequence / 10000, sequence % 10000)
}
