use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::{ServiceError, ServiceResult};

pub type ProfileId = String;
pub type UniqueCode = String;

/// Placeholder values written at provisioning time. A social field holding
/// its sentinel is treated as "not yet configured" by the public renderer.
pub mod sentinels {
    pub const FACEBOOK_LINK: &str = "Update your Facebook Link";
    pub const INSTAGRAM_LINK: &str = "Update your Instagram Link";
    pub const TIKTOK_LINK: &str = "Update your TikTok Link";
    pub const WHATSAPP_NUMBER: &str = "Update your WhatsApp Number";
    pub const VIBER_NUMBER: &str = "Update your Viber Number";
    pub const WEBSITE_LINK: &str = "Update your web link";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Banned,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Private login key, `YYYYMMDD-NNNN-NNNN`, assigned at provisioning.
    pub id: ProfileId,
    /// Exactly 5 ASCII digits. Stored in clear text, matching the deployed
    /// system; flagged as a weakness in DESIGN.md.
    pub pin: String,
    /// Public sharing key. Opaque, never derived from `id`.
    pub unique_code: UniqueCode,
    pub status: Option<ProfileStatus>,

    pub full_name: String,
    pub email: String,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub mobile_primary: String,
    pub landline_number: String,
    pub address: String,
    pub about_text: String,

    pub facebook_link: String,
    pub instagram_link: String,
    pub tiktok_link: String,
    pub whatsapp_number: String,
    pub viber_number: String,
    pub website_link: String,

    pub profile_photo: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update merged into an existing record. Absent fields are left
/// unchanged. `id`, `unique_code` and `status` are not reachable through
/// this path; status changes are an administrative concern.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landline_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viber_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile) {
        fn merge(target: &mut String, source: &Option<String>) {
            if let Some(value) = source {
                *target = value.clone();
            }
        }
        if let Some(pin) = &self.pin {
            profile.pin = pin.clone();
        }
        merge(&mut profile.full_name, &self.full_name);
        merge(&mut profile.email, &self.email);
        merge(&mut profile.job_title, &self.job_title);
        merge(&mut profile.company_name, &self.company_name);
        merge(&mut profile.location, &self.location);
        merge(&mut profile.mobile_primary, &self.mobile_primary);
        merge(&mut profile.landline_number, &self.landline_number);
        merge(&mut profile.address, &self.address);
        merge(&mut profile.about_text, &self.about_text);
        merge(&mut profile.facebook_link, &self.facebook_link);
        merge(&mut profile.instagram_link, &self.instagram_link);
        merge(&mut profile.tiktok_link, &self.tiktok_link);
        merge(&mut profile.whatsapp_number, &self.whatsapp_number);
        merge(&mut profile.viber_number, &self.viber_number);
        merge(&mut profile.website_link, &self.website_link);
        if let Some(photo) = &self.profile_photo {
            profile.profile_photo = Some(photo.clone());
        }
    }
}

#[async_trait::async_trait]
pub trait ProfileRepository {
    async fn get_profile_by_code(&self, code: &str) -> ServiceResult<Option<Profile>>;
    async fn get_profile_by_id(&self, id: &str) -> ServiceResult<Option<Profile>>;
    async fn create_profile(&self, profile: &Profile) -> ServiceResult<()>;
    /// Whole-record replace addressed by `unique_code`. Last write wins.
    async fn update_profile(&self, profile: &Profile) -> ServiceResult<()>;
}

/// Every record entering a store must carry a well-formed id and PIN.
pub fn validate_new_profile(profile: &Profile) -> ServiceResult<()> {
    if !crate::util::is_valid_id_format(&profile.id) {
        return ServiceError::bad_request(format!("Malformed profile id {}", profile.id));
    }
    if !crate::util::is_valid_pin(&profile.pin) {
        return ServiceError::bad_request("PIN must be exactly 5 digits");
    }
    Ok(())
}

/// In-memory store keyed by unique code, with a secondary id index.
/// Used for local runs and tests; selected with `KONTAK_STORE=memory`.
#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: DashMap<UniqueCode, Profile>,
    codes_by_id: DashMap<ProfileId, UniqueCode>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_profiles() -> Self {
        let repo = Self::new();
        for profile in sample_profiles() {
            repo.codes_by_id
                .insert(profile.id.clone(), profile.unique_code.clone());
            repo.profiles.insert(profile.unique_code.clone(), profile);
        }
        repo
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn get_profile_by_code(&self, code: &str) -> ServiceResult<Option<Profile>> {
        Ok(self.profiles.get(code).map(|entry| entry.value().clone()))
    }

    async fn get_profile_by_id(&self, id: &str) -> ServiceResult<Option<Profile>> {
        let Some(code) = self.codes_by_id.get(id).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        self.get_profile_by_code(&code).await
    }

    async fn create_profile(&self, profile: &Profile) -> ServiceResult<()> {
        validate_new_profile(profile)?;
        if self.codes_by_id.contains_key(&profile.id) {
            return ServiceError::bad_request(format!("Profile id {} already exists", profile.id));
        }
        if self.profiles.contains_key(&profile.unique_code) {
            return ServiceError::bad_request(format!(
                "Unique code {} already exists",
                profile.unique_code
            ));
        }
        let mut profile = profile.clone();
        profile.created_at = Some(Utc::now());
        self.codes_by_id
            .insert(profile.id.clone(), profile.unique_code.clone());
        self.profiles.insert(profile.unique_code.clone(), profile);
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> ServiceResult<()> {
        let Some(mut entry) = self.profiles.get_mut(&profile.unique_code) else {
            return ServiceError::not_found(format!(
                "No profile for code {}",
                profile.unique_code
            ));
        };
        *entry = profile.clone();
        Ok(())
    }
}

/// The five records the original deployment was seeded with.
pub fn sample_profiles() -> Vec<Profile> {
    fn fresh(
        id: &str,
        pin: &str,
        code: &str,
        full_name: &str,
        email: &str,
        job_title: &str,
        company_name: &str,
        mobile: &str,
        landline: &str,
        address: &str,
    ) -> Profile {
        Profile {
            id: id.to_string(),
            pin: pin.to_string(),
            unique_code: code.to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            job_title: job_title.to_string(),
            company_name: company_name.to_string(),
            mobile_primary: mobile.to_string(),
            landline_number: landline.to_string(),
            address: address.to_string(),
            facebook_link: sentinels::FACEBOOK_LINK.to_string(),
            instagram_link: sentinels::INSTAGRAM_LINK.to_string(),
            tiktok_link: sentinels::TIKTOK_LINK.to_string(),
            whatsapp_number: sentinels::WHATSAPP_NUMBER.to_string(),
            viber_number: sentinels::VIBER_NUMBER.to_string(),
            website_link: sentinels::WEBSITE_LINK.to_string(),
            ..Profile::default()
        }
    }

    let mut profiles = vec![
        fresh(
            "20251001-0000-0001",
            "12345",
            "gsdbhb7390bcsdhjughu",
            "Default Name 1",
            "default1@example.com",
            "Default Job",
            "Default Company",
            "123-456-7890",
            "238490-9083287",
            "Default Address 1",
        ),
        fresh(
            "20251001-0000-0002",
            "67890",
            "cjfidhverkscdkdscmkdsjf",
            "John Doe",
            "john@example.com",
            "Developer",
            "Tech Corp",
            "987-654-3210",
            "555-123-4567",
            "123 Tech St",
        ),
        fresh(
            "20251001-0000-0003",
            "54321",
            "xyz789abc123def456",
            "Jane Smith",
            "jane@example.com",
            "Designer",
            "Creative Ltd",
            "555-123-4567",
            "555-987-6543",
            "456 Art Ave",
        ),
        fresh(
            "20251001-0000-0004",
            "11111",
            "abc123xyz789ghi456",
            "Default Name 4",
            "default4@example.com",
            "Default Job",
            "Default Company",
            "111-222-3333",
            "111-444-5555",
            "Default Address 4",
        ),
        fresh(
            "20251001-0000-0005",
            "99999",
            "def456jkl789mno123",
            "Default Name 5",
            "default5@example.com",
            "Default Job",
            "Default Company",
            "444-555-6666",
            "444-777-8888",
            "Default Address 5",
        ),
    ];

    let john = &mut profiles[1];
    john.facebook_link = "https://facebook.com/johndoe".to_string();
    john.instagram_link = "https://instagram.com/johndoe".to_string();
    john.tiktok_link = "https://tiktok.com/@johndoe".to_string();
    john.whatsapp_number = "+1234567890".to_string();
    john.website_link = "https://johndoe.com".to_string();

    let jane = &mut profiles[2];
    jane.facebook_link = "https://facebook.com/janesmith".to_string();
    jane.instagram_link = "https://instagram.com/janesmith".to_string();
    jane.tiktok_link = "https://tiktok.com/@janesmith".to_string();
    jane.whatsapp_number = "+0987654321".to_string();
    jane.website_link = "https://janesmith.com".to_string();

    profiles
}
