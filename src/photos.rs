use std::path::PathBuf;

use uuid::Uuid;

use kontak_server_domain::{ServiceError, ServiceResult, photo::PhotoStorage};

/// Stores uploaded images as files under the configured upload directory
/// and hands back the `/uploads/{name}` path the static route serves.
pub struct FsPhotoStorage {
    upload_dir: PathBuf,
}

impl FsPhotoStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn from_env() -> Self {
        let upload_dir =
            std::env::var("KONTAK_UPLOAD_DIR").expect("KONTAK_UPLOAD_DIR env var not set");
        std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");
        Self::new(upload_dir)
    }
}

#[async_trait::async_trait]
impl PhotoStorage for FsPhotoStorage {
    async fn store_photo(
        &self,
        code: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String> {
        let file_name = format!("{}-{}.{}", code, Uuid::new_v4(), extension);
        let path = self.upload_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to write photo: {}", e)))?;
        Ok(format!("/uploads/{}", file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_photo_writes_file_and_returns_uploads_path() {
        let dir = std::env::temp_dir().join(format!("kontak-photos-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let storage = FsPhotoStorage::new(&dir);

        let path = storage
            .store_photo("somecode", "png", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(path.starts_with("/uploads/somecode-"));
        assert!(path.ends_with(".png"));

        let file_name = path.strip_prefix("/uploads/").unwrap();
        let written = std::fs::read(dir.join(file_name)).unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
