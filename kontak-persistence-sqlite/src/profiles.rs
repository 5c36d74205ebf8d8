use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use kontak_server_domain::{
    ServiceError, ServiceResult,
    profile::{Profile, ProfileRepository, ProfileStatus, validate_new_profile},
};

use crate::create_profile_db_pool;

pub struct SqliteProfileRepository {
    pool: Pool<Sqlite>,
}

impl SqliteProfileRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn connect() -> Self {
        Self::new(create_profile_db_pool().await)
    }

    fn profile_from_row(row: &SqliteRow) -> sqlx::Result<Profile> {
        Ok(Profile {
            id: row.try_get("id")?,
            pin: row.try_get("pin")?,
            unique_code: row.try_get("unique_code")?,
            status: map_status(row.try_get("status")?),
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            job_title: row.try_get("job_title")?,
            company_name: row.try_get("company_name")?,
            location: row.try_get("location")?,
            mobile_primary: row.try_get("mobile_primary")?,
            landline_number: row.try_get("landline_number")?,
            address: row.try_get("address")?,
            about_text: row.try_get("about_text")?,
            facebook_link: row.try_get("facebook_link")?,
            instagram_link: row.try_get("instagram_link")?,
            tiktok_link: row.try_get("tiktok_link")?,
            whatsapp_number: row.try_get("whatsapp_number")?,
            viber_number: row.try_get("viber_number")?,
            website_link: row.try_get("website_link")?,
            profile_photo: map_string_to_option(row.try_get("profile_photo")?),
            created_at: map_timestamp(row.try_get("created_at")?),
            updated_at: map_timestamp(row.try_get("updated_at")?),
        })
    }

    async fn get_profile_where(&self, column: &str, key: &str) -> ServiceResult<Option<Profile>> {
        let row = sqlx::query(&format!("SELECT * FROM profiles WHERE {} = ?", column))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        match row {
            Some(row) => Self::profile_from_row(&row)
                .map(Some)
                .map_err(|e| ServiceError::Internal(e.to_string())),
            None => Ok(None),
        }
    }
}

fn map_string_to_option(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn map_status(s: String) -> Option<ProfileStatus> {
    match s.as_str() {
        "active" => Some(ProfileStatus::Active),
        "banned" => Some(ProfileStatus::Banned),
        _ => None,
    }
}

fn status_to_string(status: Option<ProfileStatus>) -> &'static str {
    match status {
        Some(ProfileStatus::Active) => "active",
        Some(ProfileStatus::Banned) => "banned",
        None => "",
    }
}

fn map_timestamp(s: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn timestamp_to_string(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|dt| dt.to_rfc3339()).unwrap_or_default()
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn get_profile_by_code(&self, code: &str) -> ServiceResult<Option<Profile>> {
        self.get_profile_where("unique_code", code).await
    }

    async fn get_profile_by_id(&self, id: &str) -> ServiceResult<Option<Profile>> {
        self.get_profile_where("id", id).await
    }

    async fn create_profile(&self, profile: &Profile) -> ServiceResult<()> {
        validate_new_profile(profile)?;
        sqlx::query(
            "INSERT INTO profiles (id, pin, unique_code, status, full_name, email, job_title, \
             company_name, location, mobile_primary, landline_number, address, about_text, \
             facebook_link, instagram_link, tiktok_link, whatsapp_number, viber_number, \
             website_link, profile_photo, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.id)
        .bind(&profile.pin)
        .bind(&profile.unique_code)
        .bind(status_to_string(profile.status))
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.job_title)
        .bind(&profile.company_name)
        .bind(&profile.location)
        .bind(&profile.mobile_primary)
        .bind(&profile.landline_number)
        .bind(&profile.address)
        .bind(&profile.about_text)
        .bind(&profile.facebook_link)
        .bind(&profile.instagram_link)
        .bind(&profile.tiktok_link)
        .bind(&profile.whatsapp_number)
        .bind(&profile.viber_number)
        .bind(&profile.website_link)
        .bind(profile.profile_photo.clone().unwrap_or_default())
        .bind(timestamp_to_string(Some(profile.created_at.unwrap_or_else(Utc::now))))
        .bind(timestamp_to_string(profile.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> ServiceResult<()> {
        let result = sqlx::query(
            "UPDATE profiles SET pin = ?, status = ?, full_name = ?, email = ?, job_title = ?, \
             company_name = ?, location = ?, mobile_primary = ?, landline_number = ?, \
             address = ?, about_text = ?, facebook_link = ?, instagram_link = ?, \
             tiktok_link = ?, whatsapp_number = ?, viber_number = ?, website_link = ?, \
             profile_photo = ?, updated_at = ? WHERE unique_code = ?",
        )
        .bind(&profile.pin)
        .bind(status_to_string(profile.status))
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.job_title)
        .bind(&profile.company_name)
        .bind(&profile.location)
        .bind(&profile.mobile_primary)
        .bind(&profile.landline_number)
        .bind(&profile.address)
        .bind(&profile.about_text)
        .bind(&profile.facebook_link)
        .bind(&profile.instagram_link)
        .bind(&profile.tiktok_link)
        .bind(&profile.whatsapp_number)
        .bind(&profile.viber_number)
        .bind(&profile.website_link)
        .bind(profile.profile_photo.clone().unwrap_or_default())
        .bind(timestamp_to_string(profile.updated_at))
        .bind(&profile.unique_code)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if result.rows_affected() == 0 {
            return ServiceError::not_found(format!(
                "No profile for code {}",
                profile.unique_code
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use kontak_server_domain::profile::sample_profiles;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use crate::PROFILES_SCHEMA;

    use super::*;

    async fn make_repo() -> SqliteProfileRepository {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query(PROFILES_SCHEMA).execute(&pool).await.unwrap();
        SqliteProfileRepository::new(pool)
    }

    #[tokio::test]
    async fn test_round_trip_by_both_keys() {
        let repo = make_repo().await;
        let profile = sample_profiles()[1].clone();
        repo.create_profile(&profile).await.unwrap();

        let by_id = repo.get_profile_by_id(&profile.id).await.unwrap().unwrap();
        assert_eq!(by_id.unique_code, profile.unique_code);
        assert_eq!(by_id.pin, profile.pin);
        assert!(by_id.created_at.is_some());
        assert!(by_id.updated_at.is_none());
        assert!(by_id.profile_photo.is_none());

        let by_code = repo
            .get_profile_by_code(&profile.unique_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.id, profile.id);
        assert!(repo.get_profile_by_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_persists_changes() {
        let repo = make_repo().await;
        let mut profile = sample_profiles()[1].clone();
        repo.create_profile(&profile).await.unwrap();

        profile.company_name = "Acme".to_string();
        profile.status = Some(ProfileStatus::Banned);
        profile.updated_at = Some(Utc::now());
        repo.update_profile(&profile).await.unwrap();

        let reloaded = repo
            .get_profile_by_code(&profile.unique_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.company_name, "Acme");
        assert_eq!(reloaded.status, Some(ProfileStatus::Banned));
        assert!(reloaded.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_code_is_not_found() {
        let repo = make_repo().await;
        let profile = sample_profiles()[0].clone();
        let err = repo.update_profile(&profile).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
