//! Album cover and album photo management for a logged-in operator.
//!
//! The panel keeps two caches mirroring the image service: every album cover,
//! and the photos of the most recently searched album. Caches are only ever
//! replaced by a fresh listing from the service or filtered after a delete,
//! never patched with locally made-up entries.

use std::sync::Arc;

use crate::models::images::{same_album, AlbumCover, AlbumPhoto, ImageKind};
use crate::models::uploads::{PendingUpload, SelectedFile};
use crate::service::{ImageService, ServiceError};
use crate::session::Authorization;

pub mod error;

pub use self::error::{Error, NotFoundReason, ValidationError};

/// What happened to the visible photo list after a photo upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoListRefresh {
    /// The photo went into the searched album, which was fetched again.
    Refreshed,
    /// The photo went into another album; the list is as it was.
    Unchanged,
}

pub struct AdminPanel<S> {
    service: Arc<S>,
    authorization: Authorization,
    max_upload_bytes: u64,
    covers: Vec<AlbumCover>,
    album_photos: Vec<AlbumPhoto>,
    search_album: String,
    cover_draft: PendingUpload,
    photo_draft: PendingUpload,
}

fn check_size(file: &SelectedFile, limit: u64) -> Result<(), ValidationError> {
    let size = file.size();
    if size > limit {
        return Err(ValidationError::FileTooLarge { size, limit });
    }
    Ok(())
}

impl<S: ImageService> AdminPanel<S> {
    pub(crate) fn new(service: Arc<S>, authorization: Authorization, max_upload_bytes: u64) -> Self {
        AdminPanel {
            service,
            authorization,
            max_upload_bytes,
            covers: Vec::new(),
            album_photos: Vec::new(),
            search_album: String::new(),
            cover_draft: PendingUpload::default(),
            photo_draft: PendingUpload::default(),
        }
    }

    pub fn covers(&self) -> &[AlbumCover] {
        &self.covers
    }

    pub fn album_photos(&self) -> &[AlbumPhoto] {
        &self.album_photos
    }

    /// The album name of the last search, successful or not.
    pub fn search_album(&self) -> &str {
        &self.search_album
    }

    pub fn cover_draft(&self) -> &PendingUpload {
        &self.cover_draft
    }

    pub fn photo_draft(&self) -> &PendingUpload {
        &self.photo_draft
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn set_cover_name(&mut self, name: impl Into<String>) {
        self.cover_draft.album = name.into();
    }

    pub fn select_cover_file(&mut self, file: SelectedFile) {
        self.cover_draft.file = Some(file);
    }

    pub fn set_photo_album(&mut self, album: impl Into<String>) {
        self.photo_draft.album = album.into();
    }

    pub fn select_photo_file(&mut self, file: SelectedFile) {
        self.photo_draft.file = Some(file);
    }

    /// Replace the cover cache with the service's current list.
    pub async fn list_covers(&mut self) -> Result<usize, Error> {
        let covers = self
            .service
            .list_covers()
            .await
            .map_err(Error::service("Couldn't fetch album covers"))?;

        tracing::info!(count = covers.len(), "Album covers refreshed");
        self.covers = covers;

        Ok(self.covers.len())
    }

    /// Remember `album` as the searched album and fetch its photos.
    ///
    /// An album without photos is reported the same way as an album the
    /// service doesn't know, and clears the photo list in both cases.
    pub async fn search_album_photos(&mut self, album: &str) -> Result<usize, Error> {
        self.search_album = album.to_string();
        self.refresh_album_photos().await
    }

    async fn refresh_album_photos(&mut self) -> Result<usize, Error> {
        if self.search_album.trim().is_empty() {
            return Err(ValidationError::MissingSearchAlbum.into());
        }

        let result = self.service.list_album_photos(&self.search_album).await;
        let reason = match result {
            Ok(photos) if !photos.is_empty() => {
                tracing::info!(
                    album = %self.search_album,
                    count = photos.len(),
                    "Album photos refreshed"
                );
                self.album_photos = photos;
                return Ok(self.album_photos.len());
            },
            Ok(_) => NotFoundReason::NoPhotos,
            Err(ServiceError::NotFound) => NotFoundReason::UnknownAlbum,
            Err(err) => return Err(Error::service("Couldn't fetch album photos")(err)),
        };

        tracing::info!(album = %self.search_album, ?reason, "Album not found");
        self.album_photos.clear();

        Err(Error::AlbumNotFound {
            album: self.search_album.clone(),
            reason,
        })
    }

    /// Create an album from the cover draft, then re-list all covers.
    pub async fn upload_cover(&mut self) -> Result<usize, Error> {
        let file = match &self.cover_draft.file {
            Some(file) if self.cover_draft.is_complete() => file,
            _ => return Err(ValidationError::MissingCoverInput.into()),
        };
        check_size(file, self.max_upload_bytes)?;

        let name = &self.cover_draft.album;
        self.service
            .upload_cover(name, file)
            .await
            .map_err(Error::service("Couldn't upload album cover"))?;
        tracing::info!(album = %name, %file, "Album cover uploaded");

        self.cover_draft.clear();
        self.list_covers().await
    }

    /// Add the photo draft to its album.
    ///
    /// The album has to be one of the cached covers. The target album name is
    /// kept for the next upload, the file is not.
    pub async fn upload_album_photo(&mut self) -> Result<PhotoListRefresh, Error> {
        let file = match &self.photo_draft.file {
            Some(file) if self.photo_draft.is_complete() => file,
            _ => return Err(ValidationError::MissingPhotoInput.into()),
        };
        check_size(file, self.max_upload_bytes)?;

        let album = &self.photo_draft.album;
        if !self.covers.iter().any(|cover| same_album(&cover.name, album)) {
            return Err(ValidationError::UnknownAlbum(album.clone()).into());
        }

        self.service
            .upload_album_photo(album, file)
            .await
            .map_err(Error::service("Couldn't upload photo to album"))?;
        tracing::info!(%album, %file, "Photo uploaded to album");

        self.photo_draft.file = None;

        if same_album(&self.search_album, &self.photo_draft.album) {
            self.refresh_album_photos().await?;
            Ok(PhotoListRefresh::Refreshed)
        } else {
            Ok(PhotoListRefresh::Unchanged)
        }
    }

    /// Delete a listed image and drop it from the cache it was listed in.
    pub async fn delete_image(&mut self, id: &str, kind: ImageKind) -> Result<(), Error> {
        let listed = match kind {
            ImageKind::Cover => self.covers.iter().any(|cover| cover.id == id),
            ImageKind::Photo => self.album_photos.iter().any(|photo| photo.id == id),
        };
        if !listed {
            return Err(ValidationError::UnknownImage {
                kind,
                id: id.to_string(),
            }
            .into());
        }

        self.service
            .delete_image(id, &self.authorization)
            .await
            .map_err(Error::service("Couldn't delete image"))?;
        tracing::info!(%id, %kind, "Image deleted");

        match kind {
            ImageKind::Cover => self.covers.retain(|cover| cover.id != id),
            ImageKind::Photo => self.album_photos.retain(|photo| photo.id != id),
        }

        Ok(())
    }
}
