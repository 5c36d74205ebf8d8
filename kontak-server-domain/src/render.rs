use serde::Serialize;

use crate::profile::{Profile, ProfileStatus, sentinels};

pub const ABOUT_FALLBACK: &str = "No about information provided yet.";

pub const BANNED_NOTICE: &str = "This profile is currently banned.";

/// Any value containing this substring counts as unconfigured, even an
/// admin-provided one. Deliberately loose; kept as observed (DESIGN.md).
const PLACEHOLDER_MARKER: &str = "Update your";

const LOCATION_PLACEHOLDER: &str = "Default Location";

/// A field is "unset" when empty, equal to its sentinel placeholder, or
/// containing the placeholder marker.
pub fn is_unset(value: &str, sentinel: &str) -> bool {
    value.is_empty() || value == sentinel || value.contains(PLACEHOLDER_MARKER)
}

fn visible(value: &str, sentinel: &str) -> Option<String> {
    if is_unset(value, sentinel) {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SocialKind {
    Facebook,
    Instagram,
    Tiktok,
    Whatsapp,
    Viber,
    Website,
}

impl SocialKind {
    pub fn label(&self) -> &'static str {
        match self {
            SocialKind::Facebook => "Facebook",
            SocialKind::Instagram => "Instagram",
            SocialKind::Tiktok => "Tiktok",
            SocialKind::Whatsapp => "WhatsApp",
            SocialKind::Viber => "Viber",
            SocialKind::Website => "Website",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SocialLink {
    pub kind: SocialKind,
    pub url: String,
}

/// Read-only presentation of a profile. Suppression is per field and never
/// touches stored data.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileView {
    pub full_name: String,
    pub job_title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub about_text: String,
    pub email: Option<String>,
    pub mobile_primary: Option<String>,
    pub landline_number: Option<String>,
    pub address: Option<String>,
    pub profile_photo: Option<String>,
    /// A banned profile still renders; the notice is overlaid on top of
    /// the normal content.
    pub banned: bool,
    pub socials: Vec<SocialLink>,
}

impl PublicProfileView {
    pub fn of(profile: &Profile) -> Self {
        let socials = [
            (SocialKind::Facebook, &profile.facebook_link, sentinels::FACEBOOK_LINK),
            (SocialKind::Instagram, &profile.instagram_link, sentinels::INSTAGRAM_LINK),
            (SocialKind::Tiktok, &profile.tiktok_link, sentinels::TIKTOK_LINK),
            (SocialKind::Whatsapp, &profile.whatsapp_number, sentinels::WHATSAPP_NUMBER),
            (SocialKind::Viber, &profile.viber_number, sentinels::VIBER_NUMBER),
            (SocialKind::Website, &profile.website_link, sentinels::WEBSITE_LINK),
        ]
        .into_iter()
        .filter_map(|(kind, value, sentinel)| {
            visible(value, sentinel).map(|url| SocialLink { kind, url })
        })
        .collect();

        let location = match profile.location.as_str() {
            LOCATION_PLACEHOLDER => None,
            other => visible(other, ""),
        };

        let about_text = if profile.about_text.is_empty() {
            ABOUT_FALLBACK.to_string()
        } else {
            profile.about_text.clone()
        };

        Self {
            full_name: profile.full_name.clone(),
            job_title: profile.job_title.clone(),
            company_name: profile.company_name.clone(),
            location,
            about_text,
            email: visible(&profile.email, ""),
            mobile_primary: visible(&profile.mobile_primary, ""),
            landline_number: visible(&profile.landline_number, ""),
            address: visible(&profile.address, ""),
            profile_photo: profile.profile_photo.clone(),
            banned: profile.status == Some(ProfileStatus::Banned),
            socials,
        }
    }

    pub fn social(&self, kind: SocialKind) -> Option<&SocialLink> {
        self.socials.iter().find(|link| link.kind == kind)
    }
}
