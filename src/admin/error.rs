use thiserror::Error;

use crate::models::images::ImageKind;
use crate::service::ServiceError;

/// Input problems caught before anything is sent to the image service.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a name and select an image")]
    MissingCoverInput,
    #[error("Select an album and a photo")]
    MissingPhotoInput,
    #[error("File size must be less than {} KB", .limit / 1024)]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Album not found: {0}")]
    UnknownAlbum(String),
    #[error("Enter an album name to search")]
    MissingSearchAlbum,
    #[error("No {kind} with id {id} is listed")]
    UnknownImage { kind: ImageKind, id: String },
}

/// Why a search turned up nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The service knows the album but it holds no photos.
    NoPhotos,
    /// The service doesn't know the album.
    UnknownAlbum,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Album not found: {album}")]
    AlbumNotFound {
        album: String,
        reason: NotFoundReason,
    },
    #[error("Please login first")]
    NotLoggedIn,
    #[error("Already logged in, logout first")]
    AlreadyLoggedIn,
    #[error("{0}")]
    LoginRejected(String),
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        source: ServiceError,
    },
}

impl Error {
    pub(crate) fn service(context: &'static str) -> impl FnOnce(ServiceError) -> Error {
        move |source| {
            tracing::error!(%source, "{}", context);
            Error::Service { context, source }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
