use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::{
    ServiceError, ServiceResult,
    photo::PhotoStorage,
    profile::{Profile, ProfileRepository, ProfileUpdate, UniqueCode},
    util::is_valid_pin,
};

pub type ArcProfileRepository = Arc<Box<dyn ProfileRepository + Send + Sync + 'static>>;
pub type ArcPhotoStorage = Arc<Box<dyn PhotoStorage + Send + Sync + 'static>>;
pub type ArcProfileService = Arc<Box<dyn ProfileService + Send + Sync + 'static>>;

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const PROFILE_CACHE_CAPACITY: u64 = 1000;

#[async_trait::async_trait]
pub trait ProfileService {
    /// Read-only lookup by unique code.
    async fn fetch_by_code(&self, code: &str) -> ServiceResult<Profile>;
    /// Checks an (id, pin) pair and returns the record's unique code.
    /// Never returns the record itself; callers fetch separately.
    async fn verify(&self, id: &str, pin: &str) -> ServiceResult<UniqueCode>;
    /// Merges the provided fields into the record addressed by `code` and
    /// returns the merged record. All-or-nothing: an invalid `pin` in the
    /// update fails the whole call with nothing written.
    async fn update(&self, code: &str, update: &ProfileUpdate) -> ServiceResult<Profile>;
    /// Persists an uploaded image and writes its path into the record.
    /// Returns the stored path.
    async fn store_photo(
        &self,
        code: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String>;
}

pub struct ProfileServiceImpl {
    profile_repository: ArcProfileRepository,
    photo_storage: ArcPhotoStorage,
    profile_cache: moka::sync::Cache<UniqueCode, Profile>,
}

impl ProfileServiceImpl {
    pub fn new(profile_repository: ArcProfileRepository, photo_storage: ArcPhotoStorage) -> Self {
        Self {
            profile_repository,
            photo_storage,
            profile_cache: moka::sync::Cache::builder()
                .max_capacity(PROFILE_CACHE_CAPACITY)
                .build(),
        }
    }

    async fn fetch_for_write(&self, code: &str) -> ServiceResult<Profile> {
        match self.profile_repository.get_profile_by_code(code).await? {
            Some(profile) => Ok(profile),
            None => ServiceError::not_found(format!("No profile for code {}", code)),
        }
    }

    async fn persist(&self, profile: Profile) -> ServiceResult<Profile> {
        self.profile_repository.update_profile(&profile).await?;
        self.profile_cache
            .insert(profile.unique_code.clone(), profile.clone());
        Ok(profile)
    }

    fn extension_for(content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl ProfileService for ProfileServiceImpl {
    async fn fetch_by_code(&self, code: &str) -> ServiceResult<Profile> {
        if let Some(profile) = self.profile_cache.get(code) {
            return Ok(profile);
        }
        match self.profile_repository.get_profile_by_code(code).await? {
            Some(profile) => {
                self.profile_cache.insert(code.to_string(), profile.clone());
                Ok(profile)
            }
            None => ServiceError::not_found(format!("No profile for code {}", code)),
        }
    }

    async fn verify(&self, id: &str, pin: &str) -> ServiceResult<UniqueCode> {
        let id = id.trim();
        if id.is_empty() || !is_valid_pin(pin) {
            return ServiceError::unauthorized("Malformed ID Number or PIN");
        }
        // Unknown id and wrong pin fail identically, so callers cannot
        // probe which ids exist.
        let Some(profile) = self.profile_repository.get_profile_by_id(id).await? else {
            return ServiceError::unauthorized("Invalid ID Number or PIN");
        };
        if profile.pin != pin {
            return ServiceError::unauthorized("Invalid ID Number or PIN");
        }
        info!("Verified credentials for profile {}", id);
        Ok(profile.unique_code)
    }

    async fn update(&self, code: &str, update: &ProfileUpdate) -> ServiceResult<Profile> {
        if let Some(pin) = &update.pin {
            if !is_valid_pin(pin) {
                return ServiceError::bad_request("PIN must be exactly 5 digits");
            }
        }
        let mut profile = self.fetch_for_write(code).await?;
        update.apply(&mut profile);
        profile.updated_at = Some(Utc::now());
        info!("Updated profile {}", profile.id);
        self.persist(profile).await
    }

    async fn store_photo(
        &self,
        code: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String> {
        let mut profile = self.fetch_for_write(code).await?;
        let Some(extension) = Self::extension_for(content_type) else {
            return ServiceError::upload_rejected(format!(
                "Unsupported image type: {}",
                content_type
            ));
        };
        if bytes.len() > MAX_PHOTO_BYTES {
            return ServiceError::upload_rejected("Photo exceeds the 5 MiB limit");
        }
        let path = self.photo_storage.store_photo(code, extension, bytes).await?;
        profile.profile_photo = Some(path.clone());
        profile.updated_at = Some(Utc::now());
        info!("Stored photo for profile {} at {}", profile.id, path);
        self.persist(profile).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        photo::MemoryPhotoStorage,
        profile::{MemoryProfileRepository, sentinels},
    };

    use super::*;

    fn make_service() -> ProfileServiceImpl {
        let repo: ArcProfileRepository =
            Arc::new(Box::new(MemoryProfileRepository::with_sample_profiles()));
        let photos: ArcPhotoStorage = Arc::new(Box::new(MemoryPhotoStorage::new()));
        ProfileServiceImpl::new(repo, photos)
    }

    #[tokio::test]
    async fn test_verify_returns_only_the_unique_code() {
        let service = make_service();
        let code = service.verify("20251001-0000-0001", "12345").await.unwrap();
        assert_eq!(code, "gsdbhb7390bcsdhjughu");
    }

    #[tokio::test]
    async fn test_verify_trims_the_id() {
        let service = make_service();
        let code = service
            .verify("  20251001-0000-0001 ", "12345")
            .await
            .unwrap();
        assert_eq!(code, "gsdbhb7390bcsdhjughu");
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_input_before_lookup() {
        let service = make_service();
        for (id, pin) in [("", "12345"), ("   ", "12345"), ("x", "1234"), ("x", "12a45")] {
            let err = service.verify(id, pin).await.unwrap_err();
            let ServiceError::Unauthorized(msg) = err else {
                panic!("expected Unauthorized");
            };
            assert_eq!(msg, "Malformed ID Number or PIN");
        }
    }

    #[tokio::test]
    async fn test_verify_failures_are_indistinguishable() {
        let service = make_service();
        let unknown_id = service.verify("unknown-id", "12345").await.unwrap_err();
        let wrong_pin = service
            .verify("20251001-0000-0001", "00000")
            .await
            .unwrap_err();
        assert_eq!(unknown_id.to_string(), wrong_pin.to_string());
    }

    #[tokio::test]
    async fn test_update_changes_only_provided_fields() {
        let service = make_service();
        let before = service.fetch_by_code("gsdbhb7390bcsdhjughu").await.unwrap();
        let update = ProfileUpdate {
            full_name: Some("X".to_string()),
            ..ProfileUpdate::default()
        };
        let after = service.update("gsdbhb7390bcsdhjughu", &update).await.unwrap();
        assert_eq!(after.full_name, "X");
        assert_eq!(after.email, before.email);
        assert_eq!(after.facebook_link, sentinels::FACEBOOK_LINK);
        assert!(after.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_with_invalid_pin_writes_nothing() {
        let service = make_service();
        let update = ProfileUpdate {
            pin: Some("123".to_string()),
            full_name: Some("Should Not Stick".to_string()),
            ..ProfileUpdate::default()
        };
        let err = service
            .update("gsdbhb7390bcsdhjughu", &update)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        let profile = service.fetch_by_code("gsdbhb7390bcsdhjughu").await.unwrap();
        assert_eq!(profile.full_name, "Default Name 1");
        assert_eq!(profile.pin, "12345");
        assert!(profile.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_pin_change_persists() {
        let service = make_service();
        let update = ProfileUpdate {
            pin: Some("55555".to_string()),
            ..ProfileUpdate::default()
        };
        service.update("gsdbhb7390bcsdhjughu", &update).await.unwrap();
        assert!(service.verify("20251001-0000-0001", "12345").await.is_err());
        let code = service.verify("20251001-0000-0001", "55555").await.unwrap();
        assert_eq!(code, "gsdbhb7390bcsdhjughu");
    }

    #[tokio::test]
    async fn test_update_unknown_code_is_not_found() {
        let service = make_service();
        let err = service
            .update("no-such-code", &ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_photo_writes_path_into_record() {
        let service = make_service();
        let path = service
            .store_photo("gsdbhb7390bcsdhjughu", "image/png", vec![0u8; 128])
            .await
            .unwrap();
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));
        let profile = service.fetch_by_code("gsdbhb7390bcsdhjughu").await.unwrap();
        assert_eq!(profile.profile_photo.as_deref(), Some(path.as_str()));
    }

    #[tokio::test]
    async fn test_store_photo_rejects_wrong_type_and_oversize() {
        let service = make_service();
        let err = service
            .store_photo("gsdbhb7390bcsdhjughu", "text/plain", vec![0u8; 8])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UploadRejected(_)));

        let err = service
            .store_photo(
                "gsdbhb7390bcsdhjughu",
                "image/png",
                vec![0u8; MAX_PHOTO_BYTES + 1],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UploadRejected(_)));

        let profile = service.fetch_by_code("gsdbhb7390bcsdhjughu").await.unwrap();
        assert!(profile.profile_photo.is_none());
    }

    #[tokio::test]
    async fn test_verify_then_update_then_fetch() {
        let service = make_service();
        let code = service.verify("20251001-0000-0001", "12345").await.unwrap();
        assert_eq!(code, "gsdbhb7390bcsdhjughu");

        let update = ProfileUpdate {
            company_name: Some("Acme".to_string()),
            ..ProfileUpdate::default()
        };
        let updated = service.update(&code, &update).await.unwrap();
        assert_eq!(updated.company_name, "Acme");
        assert_eq!(updated.full_name, "Default Name 1");

        let fetched = service.fetch_by_code(&code).await.unwrap();
        assert_eq!(fetched.company_name, "Acme");
    }
}
