use std::sync::Arc;

use kontak_server_domain::{
    profile::{Profile, ProfileUpdate},
    util::is_valid_pin,
};

use crate::{ApiError, ProfileTransport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    /// Initial: prompting for id + PIN.
    Unauthenticated,
    /// Verified owner of the addressed code; fields editable.
    Authenticated,
    /// The addressed code resolves to no record. Terminal for the session.
    NotFound,
}

/// One editing session for a single unique code. Every failed call leaves
/// the previously loaded state untouched; only a successful server response
/// replaces the in-memory copy.
pub struct EditorSession<T: ProfileTransport> {
    transport: Arc<T>,
    unique_code: String,
    state: EditorState,
    profile: Option<Profile>,
}

impl<T: ProfileTransport> EditorSession<T> {
    pub fn new(transport: Arc<T>, unique_code: impl Into<String>) -> Self {
        Self {
            transport,
            unique_code: unique_code.into(),
            state: EditorState::Unauthenticated,
            profile: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Initial fetch by code. A 404 moves the session to its terminal
    /// NotFound state; other failures leave the state unchanged.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.transport.get_public_profile(&self.unique_code).await {
            Ok(profile) => {
                self.profile = Some(profile);
                Ok(())
            }
            Err(ApiError::Api { status: 404, .. }) => {
                self.state = EditorState::NotFound;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Verifies the credentials and checks that the verified identity owns
    /// the code under edit; a mismatch is a failed authentication, not
    /// access to someone else's record.
    pub async fn login(&mut self, id: &str, pin: &str) -> Result<(), ApiError> {
        if self.state == EditorState::NotFound {
            return Err(ApiError::Session("Profile not found".to_string()));
        }
        let verified_code = self.transport.verify_by_id(id, pin).await?;
        if verified_code != self.unique_code {
            return Err(ApiError::Api {
                status: 401,
                message: "Invalid ID Number or PIN".to_string(),
            });
        }
        self.state = EditorState::Authenticated;
        Ok(())
    }

    /// Pushes a partial update; the in-memory copy is refreshed from the
    /// server's response so server-side normalization is reflected.
    pub async fn apply_update(&mut self, update: &ProfileUpdate) -> Result<&Profile, ApiError> {
        self.require_authenticated()?;
        let updated = self
            .transport
            .update_profile(&self.unique_code, update)
            .await?;
        self.profile = Some(updated);
        Ok(self.profile.as_ref().unwrap())
    }

    /// PIN change is validated locally; nothing is sent unless the new PIN
    /// and its confirmation are equal and both exactly 5 digits.
    pub async fn change_pin(&mut self, new_pin: &str, confirm_pin: &str) -> Result<(), ApiError> {
        self.require_authenticated()?;
        if new_pin.is_empty() || confirm_pin.is_empty() {
            return Err(ApiError::Validation(
                "Please fill in both PIN fields".to_string(),
            ));
        }
        if !is_valid_pin(new_pin) {
            return Err(ApiError::Validation(
                "PIN must be exactly 5 digits".to_string(),
            ));
        }
        if new_pin != confirm_pin {
            return Err(ApiError::Validation("PINs do not match".to_string()));
        }
        let update = ProfileUpdate {
            pin: Some(new_pin.to_string()),
            ..ProfileUpdate::default()
        };
        self.apply_update(&update).await?;
        Ok(())
    }

    /// Uploads a photo, then refetches so the in-memory copy carries the
    /// stored path the server wrote.
    pub async fn upload_photo(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        self.require_authenticated()?;
        let path = self
            .transport
            .upload_profile_photo(&self.unique_code, file_name, content_type, bytes)
            .await?;
        let refreshed = self.transport.get_public_profile(&self.unique_code).await?;
        self.profile = Some(refreshed);
        Ok(path)
    }

    fn require_authenticated(&self) -> Result<(), ApiError> {
        match self.state {
            EditorState::Authenticated => Ok(()),
            EditorState::Unauthenticated => {
                Err(ApiError::Session("Not authenticated".to_string()))
            }
            EditorState::NotFound => Err(ApiError::Session("Profile not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kontak_server_domain::{
        ServiceError,
        photo::MemoryPhotoStorage,
        profile::MemoryProfileRepository,
        service::{
            ArcPhotoStorage, ArcProfileRepository, ProfileService, ProfileServiceImpl,
        },
    };

    use super::*;

    /// Drives the editor against the in-process service, mapping
    /// ServiceError onto the HTTP statuses the real server would return.
    struct InProcessTransport {
        service: ProfileServiceImpl,
        update_calls: AtomicUsize,
    }

    impl InProcessTransport {
        fn new() -> Self {
            let repo: ArcProfileRepository =
                Arc::new(Box::new(MemoryProfileRepository::with_sample_profiles()));
            let photos: ArcPhotoStorage = Arc::new(Box::new(MemoryPhotoStorage::new()));
            Self {
                service: ProfileServiceImpl::new(repo, photos),
                update_calls: AtomicUsize::new(0),
            }
        }
    }

    fn to_api_error(err: ServiceError) -> ApiError {
        let (status, message) = match err {
            ServiceError::NotFound(msg) => (404, msg),
            ServiceError::Unauthorized(msg) => (401, msg),
            ServiceError::BadRequest(msg) | ServiceError::UploadRejected(msg) => (400, msg),
            ServiceError::Internal(msg) => (500, msg),
        };
        ApiError::Api { status, message }
    }

    #[async_trait::async_trait]
    impl ProfileTransport for InProcessTransport {
        async fn get_public_profile(&self, unique_code: &str) -> Result<Profile, ApiError> {
            self.service
                .fetch_by_code(unique_code)
                .await
                .map_err(to_api_error)
        }

        async fn verify_by_id(&self, id: &str, pin: &str) -> Result<String, ApiError> {
            self.service.verify(id, pin).await.map_err(to_api_error)
        }

        async fn update_profile(
            &self,
            unique_code: &str,
            update: &ProfileUpdate,
        ) -> Result<Profile, ApiError> {
            self.update_calls.fetch_add(1, Ordering::Relaxed);
            self.service
                .update(unique_code, update)
                .await
                .map_err(to_api_error)
        }

        async fn upload_profile_photo(
            &self,
            unique_code: &str,
            _file_name: &str,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> Result<String, ApiError> {
            self.service
                .store_photo(unique_code, content_type, bytes)
                .await
                .map_err(to_api_error)
        }
    }

    async fn loaded_session(
        code: &str,
    ) -> (Arc<InProcessTransport>, EditorSession<InProcessTransport>) {
        let transport = Arc::new(InProcessTransport::new());
        let mut session = EditorSession::new(transport.clone(), code);
        session.load().await.unwrap();
        (transport, session)
    }

    #[tokio::test]
    async fn test_login_moves_to_authenticated() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        assert_eq!(session.state(), EditorState::Unauthenticated);
        session.login("20251001-0000-0001", "12345").await.unwrap();
        assert_eq!(session.state(), EditorState::Authenticated);
    }

    #[tokio::test]
    async fn test_failed_login_stays_unauthenticated() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        let err = session.login("20251001-0000-0001", "00000").await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 401, .. }));
        assert_eq!(session.state(), EditorState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_valid_credentials_for_another_code_are_rejected() {
        // John's credentials verify fine but do not own this code.
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        let err = session.login("20251001-0000-0002", "67890").await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 401, .. }));
        assert_eq!(session.state(), EditorState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_unknown_code_is_terminal() {
        let (_, mut session) = loaded_session("no-such-code").await;
        assert_eq!(session.state(), EditorState::NotFound);
        let err = session.login("20251001-0000-0001", "12345").await.unwrap_err();
        assert!(matches!(err, ApiError::Session(_)));
        assert_eq!(session.state(), EditorState::NotFound);
    }

    #[tokio::test]
    async fn test_update_requires_authentication() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        let err = session
            .apply_update(&ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Session(_)));
    }

    #[tokio::test]
    async fn test_update_refreshes_from_server_response() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        session.login("20251001-0000-0001", "12345").await.unwrap();
        let update = ProfileUpdate {
            company_name: Some("Acme".to_string()),
            ..ProfileUpdate::default()
        };
        session.apply_update(&update).await.unwrap();
        let profile = session.profile().unwrap();
        assert_eq!(profile.company_name, "Acme");
        // The server stamped updated_at; a locally applied patch would not
        // carry it.
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_update_leaves_profile_untouched() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        session.login("20251001-0000-0001", "12345").await.unwrap();
        let update = ProfileUpdate {
            pin: Some("123".to_string()),
            full_name: Some("Should Not Stick".to_string()),
            ..ProfileUpdate::default()
        };
        let err = session.apply_update(&update).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 400, .. }));
        assert_eq!(session.profile().unwrap().full_name, "Default Name 1");
    }

    #[tokio::test]
    async fn test_change_pin_validates_before_any_call() {
        let (transport, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        session.login("20251001-0000-0001", "12345").await.unwrap();

        for (new_pin, confirm) in [("", ""), ("123", "123"), ("12a45", "12a45"), ("55555", "55556")]
        {
            let err = session.change_pin(new_pin, confirm).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert_eq!(transport.update_calls.load(Ordering::Relaxed), 0);

        session.change_pin("55555", "55555").await.unwrap();
        assert_eq!(transport.update_calls.load(Ordering::Relaxed), 1);
        assert_eq!(session.profile().unwrap().pin, "55555");
    }

    #[tokio::test]
    async fn test_upload_photo_refreshes_profile() {
        let (_, mut session) = loaded_session("gsdbhb7390bcsdhjughu").await;
        session.login("20251001-0000-0001", "12345").await.unwrap();
        let path = session
            .upload_photo("me.png", "image/png", vec![0u8; 64])
            .await
            .unwrap();
        assert_eq!(
            session.profile().unwrap().profile_photo.as_deref(),
            Some(path.as_str())
        );
    }
}
