use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use kontak_server_domain::{
    ServiceError,
    profile::{Profile, ProfileUpdate},
};

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub id: String,
    pub pin: String,
}

pub async fn get_by_code(
    State(state): State<AppState>,
    Path(unique_code): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = state.profile_service.fetch_by_code(&unique_code).await?;
    Ok(Json(profile))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> ApiResult<Json<Value>> {
    let unique_code = state
        .profile_service
        .verify(&payload.id, &payload.pin)
        .await?;
    Ok(Json(json!({ "uniqueCode": unique_code })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(unique_code): Path<String>,
    Json(payload): Json<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    let profile = state.profile_service.update(&unique_code, &payload).await?;
    Ok(Json(profile))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Path(unique_code): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::BadRequest(format!("Failed to read photo field: {}", e)))?;
        let path = state
            .profile_service
            .store_photo(&unique_code, &content_type, bytes.to_vec())
            .await?;
        return Ok(Json(json!({ "profilePhoto": path })));
    }
    Err(ServiceError::BadRequest("Missing multipart field 'photo'".to_string()).into())
}
