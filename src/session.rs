//! Gate between the logged-out console and the admin panel.

use std::fmt;
use std::sync::Arc;

use crate::admin::{AdminPanel, Error};
use crate::models::uploads::DEFAULT_MAX_UPLOAD_BYTES;
use crate::service::{ImageService, ServiceError};
use elysia_api_structs::Credentials;

const LOGIN_FALLBACK_ERROR: &str = "Something went wrong";

/// Proof of a successful login, presented to the service for deletes.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Token issued by the service at login.
    Bearer(String),
    /// The credentials accepted at login, for services that don't issue tokens.
    Credentials(Credentials),
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::Bearer(_) => write!(f, "Bearer(<redacted>)"),
            Authorization::Credentials(credentials) => {
                f.debug_tuple("Credentials").field(credentials).finish()
            },
        }
    }
}

pub struct Session<S> {
    service: Arc<S>,
    max_upload_bytes: u64,
    panel: Option<AdminPanel<S>>,
}

impl<S: ImageService> Session<S> {
    pub fn new(service: Arc<S>) -> Self {
        Session {
            service,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            panel: None,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.panel.is_some()
    }

    pub fn admin(&self) -> Result<&AdminPanel<S>, Error> {
        self.panel.as_ref().ok_or(Error::NotLoggedIn)
    }

    pub fn admin_mut(&mut self) -> Result<&mut AdminPanel<S>, Error> {
        self.panel.as_mut().ok_or(Error::NotLoggedIn)
    }

    /// Log in and open the admin panel, returning the service's greeting.
    ///
    /// The panel lists the album covers as soon as it opens. If that listing
    /// fails its error is returned, but the session stays logged in.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, Error> {
        if self.is_logged_in() {
            return Err(Error::AlreadyLoggedIn);
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = match self.service.login(&credentials).await {
            Ok(response) => response,
            Err(ServiceError::Rejected(error)) if !error.is_empty() => {
                tracing::warn!(%username, %error, "Login rejected");
                return Err(Error::LoginRejected(error));
            },
            Err(err) => {
                tracing::warn!(%username, error = %err, "Login failed");
                return Err(Error::LoginRejected(LOGIN_FALLBACK_ERROR.to_string()));
            },
        };
        tracing::info!(%username, "Logged in");

        let authorization = match response.token {
            Some(token) => Authorization::Bearer(token),
            None => Authorization::Credentials(credentials),
        };

        let panel = self.panel.insert(AdminPanel::new(
            self.service.clone(),
            authorization,
            self.max_upload_bytes,
        ));
        panel.list_covers().await?;

        Ok(response.message)
    }

    /// Drop the admin panel with everything it holds.
    pub fn logout(&mut self) {
        if self.panel.take().is_some() {
            tracing::info!("Logged out");
        }
    }
}
