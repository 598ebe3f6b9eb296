use std::fmt;
use std::path::Path;
use std::str::FromStr;

use surf::http::{mime, Mime};

/// Largest image the console accepts before contacting the service.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

fn mime_from_file_name(file_name: &str) -> Option<Mime> {
    let extension = Path::new(file_name)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" | "jfif" => Some(mime::JPEG),
        "png" => Some(mime::PNG),
        "ico" => Some(mime::ICO),
        "gif" => Mime::from_str("image/gif").ok(),
        "webp" => Mime::from_str("image/webp").ok(),
        "avif" => Mime::from_str("image/avif").ok(),
        "bmp" => Mime::from_str("image/bmp").ok(),
        "heic" => Mime::from_str("image/heic").ok(),
        other => Mime::from_extension(other),
    }
}

/// Content type from the file's magic bytes, else from its extension.
fn content_type_for(file_name: &str, data: &[u8]) -> String {
    Mime::sniff(data)
        .ok()
        .or_else(|| mime_from_file_name(file_name))
        .map(|mime| mime.essence().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// An image chosen by the operator, read fully into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name, &data);

        SelectedFile {
            file_name,
            content_type,
            data,
        }
    }

    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} does not point to a file", path.display()),
                )
            })?;

        let data = async_std::fs::read(path.as_os_str()).await?;
        tracing::debug!(%file_name, size = data.len(), "Read selected file");

        Ok(SelectedFile::new(file_name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

impl fmt::Display for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} KB)", self.file_name, self.size() as f64 / 1024.0)
    }
}

/// Draft of an upload: the target album name and the chosen file.
///
/// For covers the name is the new album's name, for photos it names an
/// existing album.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingUpload {
    pub album: String,
    pub file: Option<SelectedFile>,
}

impl PendingUpload {
    pub fn is_complete(&self) -> bool {
        !self.album.trim().is_empty() && self.file.is_some()
    }

    pub fn clear(&mut self) {
        *self = PendingUpload::default();
    }
}
