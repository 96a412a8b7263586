//! Media slot workflows.
//!
//! Every piece of tour media (cover image, button images, intro audio, stop
//! audio and images) follows the same two operations:
//!
//! - **upload**: write the object, then persist its public URL into the
//!   owning row's pointer column. The two steps are not transactional; a
//!   failed pointer write after a successful upload leaves an orphaned
//!   object behind.
//! - **remove**: parse the stored URL, delete the object best-effort, then
//!   unconditionally null the pointer column. Only the final database write
//!   can fail the operation.
//!
//! The slot table below replaces what used to be a per-column copy of this
//! logic with drifting bucket names and defensive checks.

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{AdminError, AdminResult, ButtonKey};
use crate::storage::{parse_public_url, ObjectStore};

/// What kind of file a slot accepts, driving extension sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["jpg", "jpeg", "png", "webp"],
            Self::Audio => &["mp3", "m4a", "wav"],
        }
    }

    fn default_extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Audio => "mp3",
        }
    }
}

/// A media-bearing column: which table and column own the pointer, and
/// where the object lives under the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    TourCover,
    TourHighlightsButton,
    TourMapButton,
    TourStartButton,
    TourIntroAudio,
    StopAudio,
    StopImage,
}

impl MediaSlot {
    pub fn table(&self) -> &'static str {
        match self {
            Self::TourCover
            | Self::TourHighlightsButton
            | Self::TourMapButton
            | Self::TourStartButton
            | Self::TourIntroAudio => "tours",
            Self::StopAudio | Self::StopImage => "stops",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::TourCover => "cover_image_url",
            Self::TourHighlightsButton => "highlights_image_url",
            Self::TourMapButton => "map_image_url",
            Self::TourStartButton => "start_image_url",
            Self::TourIntroAudio => "intro_audio_url",
            Self::StopAudio => "audio_url",
            Self::StopImage => "image_url",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::TourIntroAudio | Self::StopAudio => MediaKind::Audio,
            _ => MediaKind::Image,
        }
    }

    fn owner_label(&self) -> &'static str {
        match self.table() {
            "tours" => "Tour",
            _ => "Stop",
        }
    }

    /// Storage key for a fresh upload into this slot. Keys are never reused:
    /// each upload gets a new UUID so stale CDN caches cannot serve the old
    /// object under the new URL.
    pub fn object_key(&self, owner_id: Uuid, file_name: Option<&str>) -> String {
        let ext = safe_extension(file_name, self.kind());
        let folder = match self {
            Self::TourCover => format!("tours/{}/cover", owner_id),
            Self::TourHighlightsButton => format!("tours/{}/images/highlights", owner_id),
            Self::TourMapButton => format!("tours/{}/images/map", owner_id),
            Self::TourStartButton => format!("tours/{}/images/start", owner_id),
            Self::TourIntroAudio => format!("tours/{}/intro", owner_id),
            Self::StopAudio => format!("stops/{}/audio", owner_id),
            Self::StopImage => format!("stops/{}/images", owner_id),
        };

        format!("{}/{}.{}", folder, Uuid::new_v4(), ext)
    }
}

impl From<ButtonKey> for MediaSlot {
    fn from(key: ButtonKey) -> Self {
        match key {
            ButtonKey::Highlights => MediaSlot::TourHighlightsButton,
            ButtonKey::Map => MediaSlot::TourMapButton,
            ButtonKey::Start => MediaSlot::TourStartButton,
        }
    }
}

pub struct MediaService {
    db_pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl MediaService {
    pub fn new(db_pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { db_pool, store }
    }

    /// Upload a file into a slot and persist its public URL.
    ///
    /// The pointer column is only written after the upload succeeded, so a
    /// failed upload leaves the row untouched.
    pub async fn upload(
        &self,
        slot: MediaSlot,
        owner_id: Uuid,
        file_name: Option<&str>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> AdminResult<String> {
        self.ensure_owner_exists(slot, owner_id).await?;

        let key = slot.object_key(owner_id, file_name);

        self.store
            .upload_object(&key, data, content_type)
            .await
            .map_err(|e| AdminError::StorageError(e.to_string()))?;

        let url = self.store.public_url(&key);

        let result = sqlx::query(&format!(
            "UPDATE {} SET {} = $1, updated_at = NOW() WHERE id = $2",
            slot.table(),
            slot.column()
        ))
        .bind(&url)
        .bind(owner_id)
        .execute(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound(slot.owner_label()));
        }

        tracing::info!(
            "Uploaded {} for {} {}: {}",
            slot.column(),
            slot.owner_label(),
            owner_id,
            url
        );

        Ok(url)
    }

    /// Delete a slot's object best-effort, then null its pointer column.
    ///
    /// The pointer is cleared even when the physical delete fails, so the
    /// admin UI never keeps referencing a dead link; a leaked object is the
    /// accepted tradeoff.
    pub async fn remove(&self, slot: MediaSlot, owner_id: Uuid) -> AdminResult<()> {
        let row: Option<(Option<String>,)> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            slot.column(),
            slot.table()
        ))
        .bind(owner_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        let (stored_url,) = row.ok_or(AdminError::NotFound(slot.owner_label()))?;

        if let Some(url) = stored_url {
            best_effort_delete(self.store.as_ref(), &url).await;
        }

        sqlx::query(&format!(
            "UPDATE {} SET {} = NULL, updated_at = NOW() WHERE id = $1",
            slot.table(),
            slot.column()
        ))
        .bind(owner_id)
        .execute(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "Cleared {} for {} {}",
            slot.column(),
            slot.owner_label(),
            owner_id
        );

        Ok(())
    }

    /// Upload a category cover image. Categories carry no pointer column;
    /// the caller receives the public URL and nothing is persisted.
    pub async fn upload_category_cover(
        &self,
        category_id: Uuid,
        file_name: Option<&str>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> AdminResult<String> {
        let exists = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if exists.is_none() {
            return Err(AdminError::NotFound("Category"));
        }

        let key = category_cover_key(category_id, file_name);

        self.store
            .upload_object(&key, data, content_type)
            .await
            .map_err(|e| AdminError::StorageError(e.to_string()))?;

        Ok(self.store.public_url(&key))
    }

    async fn ensure_owner_exists(&self, slot: MediaSlot, owner_id: Uuid) -> AdminResult<()> {
        let exists = sqlx::query_as::<_, (Uuid,)>(&format!(
            "SELECT id FROM {} WHERE id = $1",
            slot.table()
        ))
        .bind(owner_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if exists.is_none() {
            return Err(AdminError::NotFound(slot.owner_label()));
        }

        Ok(())
    }
}

/// Best-effort removal of the object behind a stored public URL.
///
/// URLs that do not parse as public object URLs mean there is no storage
/// object to delete; storage failures are logged and swallowed. Neither
/// case blocks the caller from clearing the pointer.
async fn best_effort_delete(store: &dyn ObjectStore, stored_url: &str) {
    match parse_public_url(stored_url) {
        Some(path) => {
            if let Err(e) = store.delete_object(&path.bucket, &path.key).await {
                tracing::warn!(
                    "Storage delete failed for {}/{}: {}",
                    path.bucket,
                    path.key,
                    e
                );
            }
        }
        None => {
            tracing::debug!("No storage object behind {:?}, skipping delete", stored_url);
        }
    }
}

fn category_cover_key(category_id: Uuid, file_name: Option<&str>) -> String {
    let ext = safe_extension(file_name, MediaKind::Image);
    format!("categories/{}/cover/{}.{}", category_id, Uuid::new_v4(), ext)
}

/// Lowercased extension from the uploaded filename, constrained to the
/// slot kind's allow-list; anything else falls back to the kind default.
fn safe_extension(file_name: Option<&str>, kind: MediaKind) -> &'static str {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext {
        Some(ext) => kind
            .allowed_extensions()
            .iter()
            .copied()
            .find(|allowed| *allowed == ext)
            .unwrap_or_else(|| kind.default_extension()),
        None => kind.default_extension(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::client::MockObjectStore;
    use mockall::predicate::eq;

    #[test]
    fn test_slot_wiring() {
        assert_eq!(MediaSlot::TourCover.table(), "tours");
        assert_eq!(MediaSlot::TourCover.column(), "cover_image_url");
        assert_eq!(MediaSlot::TourHighlightsButton.column(), "highlights_image_url");
        assert_eq!(MediaSlot::TourMapButton.column(), "map_image_url");
        assert_eq!(MediaSlot::TourStartButton.column(), "start_image_url");
        assert_eq!(MediaSlot::TourIntroAudio.column(), "intro_audio_url");
        assert_eq!(MediaSlot::StopAudio.table(), "stops");
        assert_eq!(MediaSlot::StopAudio.column(), "audio_url");
        assert_eq!(MediaSlot::StopImage.column(), "image_url");

        assert_eq!(MediaSlot::TourIntroAudio.kind(), MediaKind::Audio);
        assert_eq!(MediaSlot::StopAudio.kind(), MediaKind::Audio);
        assert_eq!(MediaSlot::StopImage.kind(), MediaKind::Image);
    }

    #[test]
    fn test_button_key_mapping() {
        assert_eq!(
            MediaSlot::from(ButtonKey::Highlights),
            MediaSlot::TourHighlightsButton
        );
        assert_eq!(MediaSlot::from(ButtonKey::Map), MediaSlot::TourMapButton);
        assert_eq!(MediaSlot::from(ButtonKey::Start), MediaSlot::TourStartButton);
    }

    #[test]
    fn test_safe_extension() {
        assert_eq!(safe_extension(Some("photo.PNG"), MediaKind::Image), "png");
        assert_eq!(safe_extension(Some("photo.gif"), MediaKind::Image), "jpg");
        assert_eq!(safe_extension(Some("noext"), MediaKind::Image), "jpg");
        assert_eq!(safe_extension(None, MediaKind::Image), "jpg");
        assert_eq!(safe_extension(Some("intro.wav"), MediaKind::Audio), "wav");
        assert_eq!(safe_extension(Some("intro.ogg"), MediaKind::Audio), "mp3");
        assert_eq!(
            safe_extension(Some("archive.tar.gz"), MediaKind::Audio),
            "mp3"
        );
    }

    #[test]
    fn test_object_key_layout() {
        let stop_id = Uuid::new_v4();
        let key = MediaSlot::StopImage.object_key(stop_id, Some("photo.webp"));

        assert!(key.starts_with(&format!("stops/{}/images/", stop_id)));
        assert!(key.ends_with(".webp"));

        let file = key.rsplit('/').next().unwrap();
        let stem = file.strip_suffix(".webp").unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_intro_audio_key_layout() {
        let tour_id = Uuid::new_v4();
        let key = MediaSlot::TourIntroAudio.object_key(tour_id, Some("intro.m4a"));

        assert!(key.starts_with(&format!("tours/{}/intro/", tour_id)));
        assert!(key.ends_with(".m4a"));
    }

    #[test]
    fn test_category_cover_key_layout() {
        let category_id = Uuid::new_v4();
        let key = category_cover_key(category_id, None);

        assert!(key.starts_with(&format!("categories/{}/cover/", category_id)));
        assert!(key.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_best_effort_delete_skips_foreign_urls() {
        let mut store = MockObjectStore::new();
        store.expect_delete_object().never();

        best_effort_delete(&store, "https://cdn.example.com/files/xyz.mp3").await;
    }

    #[tokio::test]
    async fn test_best_effort_delete_targets_parsed_bucket_and_key() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete_object()
            .with(eq("tour-audio"), eq("tours/abc/intro/xyz.mp3"))
            .times(1)
            .returning(|_, _| Ok(()));

        best_effort_delete(
            &store,
            "https://proj.supabase.co/storage/v1/object/public/tour-audio/tours/abc/intro/xyz.mp3",
        )
        .await;
    }

    #[tokio::test]
    async fn test_best_effort_delete_swallows_storage_failures() {
        let mut store = MockObjectStore::new();
        store.expect_delete_object().times(1).returning(|_, _| {
            Err(crate::storage::StorageError::Delete(
                "status 500: boom".to_string(),
            ))
        });

        // Must not panic or propagate; the caller clears the pointer next.
        best_effort_delete(
            &store,
            "https://proj.supabase.co/storage/v1/object/public/tour-media/stops/s1/audio/a.mp3",
        )
        .await;
    }
}
