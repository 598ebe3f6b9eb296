use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use surf::http::Mime;
use surf::{Body, StatusCode};
use url::Url;

use super::multipart::Form;
use super::{ImageService, ServiceError};
use crate::models::uploads::SelectedFile;
use crate::session::Authorization;
use elysia_api_structs::{AlbumCover, AlbumPhoto, Credentials, ErrorResponse, LoginResponse};

// Everything outside of the RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|')
    .add(b'[')
    .add(b']')
    .add(b'@')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'&')
    .add(b'+')
    .add(b'$')
    .add(b',')
    .add(b'!')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*');

/// Image service reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpImageService {
    client: surf::Client,
    endpoint: String,
}

impl HttpImageService {
    pub fn new(endpoint: &Url) -> Self {
        HttpImageService {
            client: surf::Client::new(),
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn post_form(&self, path: &str, form: Form<'_>) -> Result<(), ServiceError> {
        let encoded = form.encode();
        let mut body = Body::from_bytes(encoded.body);
        body.set_mime(Mime::from_str(&encoded.content_type)?);

        let res = self.client.post(self.url(path)).body(body).await?;
        let mut res = expect_success(res).await?;
        let ack = res.body_string().await.unwrap_or_default();
        tracing::debug!(status = %res.status(), %ack, "Upload accepted");

        Ok(())
    }
}

pub(crate) fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Pass 2xx responses through. Otherwise an `{error}` body becomes
/// `Rejected` whatever the status, and a bare 404 becomes `NotFound`.
async fn expect_success(mut res: surf::Response) -> Result<surf::Response, ServiceError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.body_string().await.unwrap_or_default();
    tracing::warn!(%status, %body, "Image service returned an error");

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse { error }) => Err(ServiceError::Rejected(error)),
        Err(_) if status == StatusCode::NotFound => Err(ServiceError::NotFound),
        Err(_) => Err(ServiceError::UnexpectedStatus {
            status: status.into(),
            body,
        }),
    }
}

#[async_trait::async_trait]
impl ImageService for HttpImageService {
    #[tracing::instrument(skip(self))]
    async fn list_covers(&self) -> Result<Vec<AlbumCover>, ServiceError> {
        let res = self.client.get(self.url("/images")).await?;
        let covers: Vec<AlbumCover> = expect_success(res).await?.body_json().await?;
        tracing::debug!(count = covers.len(), "Fetched album covers");

        Ok(covers)
    }

    #[tracing::instrument(skip(self))]
    async fn list_album_photos(&self, album: &str) -> Result<Vec<AlbumPhoto>, ServiceError> {
        let url = self.url(&format!("/images/album/{}", encode_path_segment(album)));
        let res = self.client.get(url).await?;
        if res.status() == StatusCode::NotFound {
            return Err(ServiceError::NotFound);
        }
        let photos: Vec<AlbumPhoto> = expect_success(res).await?.body_json().await?;
        tracing::debug!(count = photos.len(), "Fetched album photos");

        Ok(photos)
    }

    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError> {
        let res = self
            .client
            .post(self.url("/admin/login"))
            .body(Body::from_json(credentials)?)
            .await?;

        Ok(expect_success(res).await?.body_json().await?)
    }

    #[tracing::instrument(skip(self, image), fields(file = %image))]
    async fn upload_cover(&self, name: &str, image: &SelectedFile) -> Result<(), ServiceError> {
        let form = Form::new()
            .file("image", &image.file_name, &image.content_type, &image.data)
            .text("name", name);

        self.post_form("/upload", form).await
    }

    #[tracing::instrument(skip(self, image), fields(file = %image))]
    async fn upload_album_photo(
        &self,
        album: &str,
        image: &SelectedFile,
    ) -> Result<(), ServiceError> {
        let form = Form::new()
            .file("image", &image.file_name, &image.content_type, &image.data)
            .text("name", album);

        self.post_form("/upload/album", form).await
    }

    #[tracing::instrument(skip(self, authorization))]
    async fn delete_image(
        &self,
        id: &str,
        authorization: &Authorization,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!("/delete/{}", encode_path_segment(id)));
        let req = match authorization {
            Authorization::Bearer(token) => self
                .client
                .delete(url)
                .header("Authorization", format!("Bearer {}", token)),
            Authorization::Credentials(credentials) => self
                .client
                .delete(url)
                .body(Body::from_json(credentials)?),
        };

        let mut res = expect_success(req.await?).await?;
        let ack = res.body_string().await.unwrap_or_default();
        tracing::debug!(%ack, "Image deleted");

        Ok(())
    }
}
