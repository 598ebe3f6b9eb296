use std::fmt;
use std::str::FromStr;

pub use elysia_api_structs::{AlbumCover, AlbumPhoto, ImageId};

/// Which local cache an image id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Cover,
    Photo,
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cover" => Ok(ImageKind::Cover),
            "photo" => Ok(ImageKind::Photo),
            other => Err(format!("unknown image kind {:?}, expected cover or photo", other)),
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Cover => write!(f, "cover"),
            ImageKind::Photo => write!(f, "photo"),
        }
    }
}

/// Album names are matched without regard to case.
pub fn same_album(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
