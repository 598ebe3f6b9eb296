#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use elysia_admin::models::images::{AlbumCover, AlbumPhoto};
use elysia_admin::models::uploads::SelectedFile;
use elysia_admin::service::{ImageService, ServiceError};
use elysia_admin::session::{Authorization, Session};
use elysia_api_structs::{Credentials, LoginResponse};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin123";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    ListCovers,
    ListAlbumPhotos(String),
    Login(String),
    UploadCover(String),
    UploadAlbumPhoto(String),
    Delete(String, Authorization),
}

#[derive(Default)]
struct State {
    covers: Vec<AlbumCover>,
    photos: Vec<(String, AlbumPhoto)>,
    next_id: u32,
    token: Option<String>,
    login_outage: bool,
    fail_deletes: bool,
    requests: Vec<Request>,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("img{:04}", self.next_id)
    }
}

/// In-memory image service recording every request it receives.
#[derive(Default)]
pub struct FakeImageService {
    state: Mutex<State>,
}

impl FakeImageService {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeImageService::default())
    }

    pub fn with_token(token: &str) -> Arc<Self> {
        let service = FakeImageService::default();
        service.state.lock().unwrap().token = Some(token.to_string());
        Arc::new(service)
    }

    /// Add a cover as if another operator had created it.
    pub fn add_cover(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.covers.push(AlbumCover {
            id: id.clone(),
            name: name.to_string(),
            url: format!("https://cdn.example.com/{}.jpg", id),
            kind: "image/jpeg".to_string(),
        });
        id
    }

    pub fn add_photo(&self, album: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let photo = AlbumPhoto {
            id: id.clone(),
            name: Some(album.to_string()),
            url: format!("https://cdn.example.com/{}.jpg", id),
            kind: "image/jpeg".to_string(),
        };
        state.photos.push((album.to_string(), photo));
        id
    }

    pub fn set_login_outage(&self, outage: bool) {
        self.state.lock().unwrap().login_outage = outage;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn photo_count(&self) -> usize {
        self.state.lock().unwrap().photos.len()
    }

    fn record(&self, request: Request) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait::async_trait]
impl ImageService for FakeImageService {
    async fn list_covers(&self) -> Result<Vec<AlbumCover>, ServiceError> {
        let state = self.record(Request::ListCovers);
        Ok(state.covers.clone())
    }

    async fn list_album_photos(&self, album: &str) -> Result<Vec<AlbumPhoto>, ServiceError> {
        let state = self.record(Request::ListAlbumPhotos(album.to_string()));
        if !state.covers.iter().any(|cover| same(&cover.name, album)) {
            return Err(ServiceError::NotFound);
        }

        Ok(state
            .photos
            .iter()
            .filter(|(name, _)| same(name, album))
            .map(|(_, photo)| photo.clone())
            .collect())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError> {
        let state = self.record(Request::Login(credentials.username.clone()));
        if state.login_outage {
            return Err(ServiceError::UnexpectedStatus {
                status: 502,
                body: "Bad Gateway".to_string(),
            });
        }
        if credentials.username != USERNAME || credentials.password != PASSWORD {
            return Err(ServiceError::Rejected("Invalid credentials".to_string()));
        }

        Ok(LoginResponse {
            message: "ok".to_string(),
            token: state.token.clone(),
        })
    }

    async fn upload_cover(&self, name: &str, image: &SelectedFile) -> Result<(), ServiceError> {
        let mut state = self.record(Request::UploadCover(name.to_string()));
        let id = state.next_id();
        state.covers.push(AlbumCover {
            id: id.clone(),
            name: name.to_string(),
            url: format!("https://cdn.example.com/{}", image.file_name),
            kind: image.content_type.clone(),
        });
        Ok(())
    }

    async fn upload_album_photo(
        &self,
        album: &str,
        image: &SelectedFile,
    ) -> Result<(), ServiceError> {
        let mut state = self.record(Request::UploadAlbumPhoto(album.to_string()));
        let id = state.next_id();
        let photo = AlbumPhoto {
            id,
            name: Some(album.to_string()),
            url: format!("https://cdn.example.com/{}", image.file_name),
            kind: image.content_type.clone(),
        };
        state.photos.push((album.to_string(), photo));
        Ok(())
    }

    async fn delete_image(
        &self,
        id: &str,
        authorization: &Authorization,
    ) -> Result<(), ServiceError> {
        let mut state = self.record(Request::Delete(id.to_string(), authorization.clone()));
        if state.fail_deletes {
            return Err(ServiceError::UnexpectedStatus {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }

        let before = state.covers.len() + state.photos.len();
        state.covers.retain(|cover| cover.id != id);
        state.photos.retain(|(_, photo)| photo.id != id);
        if state.covers.len() + state.photos.len() == before {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }
}

pub fn image(name: &str, size: usize) -> SelectedFile {
    SelectedFile::new(name, vec![0xab; size])
}

pub async fn logged_in(service: &Arc<FakeImageService>) -> Session<FakeImageService> {
    let mut session = Session::new(service.clone());
    session.login(USERNAME, PASSWORD).await.unwrap();
    session
}
