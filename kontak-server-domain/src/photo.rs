use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::ServiceResult;

/// Out-of-band storage for uploaded images. Implementations return a
/// server-relative path (`/uploads/...`) suitable for `profile_photo`.
#[async_trait::async_trait]
pub trait PhotoStorage {
    async fn store_photo(
        &self,
        code: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String>;
}

#[derive(Default)]
pub struct MemoryPhotoStorage {
    photos: DashMap<String, Vec<u8>>,
    next_id: AtomicU64,
}

impl MemoryPhotoStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }
}

#[async_trait::async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn store_photo(
        &self,
        code: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = format!("/uploads/{}-{}.{}", code, id, extension);
        self.photos.insert(path.clone(), bytes);
        Ok(path)
    }
}
