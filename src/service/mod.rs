use thiserror::Error;

use crate::models::uploads::SelectedFile;
use crate::session::Authorization;
use elysia_api_structs::{AlbumCover, AlbumPhoto, Credentials, LoginResponse};

pub mod http;
pub mod multipart;

pub use self::http::HttpImageService;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(surf::Error),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<surf::Error> for ServiceError {
    fn from(error: surf::Error) -> Self {
        ServiceError::Http(error)
    }
}

/// The remote image store holding album covers and album photos.
#[async_trait::async_trait]
pub trait ImageService: Send + Sync {
    async fn list_covers(&self) -> Result<Vec<AlbumCover>, ServiceError>;

    /// Photos of the named album. An album without photos yields an empty
    /// list, an album the service doesn't know yields `NotFound`.
    async fn list_album_photos(&self, album: &str) -> Result<Vec<AlbumPhoto>, ServiceError>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError>;

    async fn upload_cover(&self, name: &str, image: &SelectedFile) -> Result<(), ServiceError>;

    async fn upload_album_photo(
        &self,
        album: &str,
        image: &SelectedFile,
    ) -> Result<(), ServiceError>;

    async fn delete_image(
        &self,
        id: &str,
        authorization: &Authorization,
    ) -> Result<(), ServiceError>;
}
