use std::sync::Arc;

use structopt::StructOpt;

pub mod admin;
pub mod console;
pub mod models;
pub mod service;
pub mod session;
pub mod telemetry;

use crate::console::Console;
use crate::service::HttpImageService;
use crate::session::Session;

#[derive(Debug)]
pub enum Error {
    InvalidEndpoint(url::ParseError),
    TelemetryInitError(anyhow::Error),
    ConsoleIoError(std::io::Error),
}

impl From<Error> for i32 {
    fn from(error: Error) -> i32 {
        match error {
            Error::InvalidEndpoint(_) => 2,
            Error::TelemetryInitError(_) => 4,
            Error::ConsoleIoError(_) => 5,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidEndpoint(err) => {
                write!(f, "Invalid image service endpoint: {}", err)
            },
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::ConsoleIoError(err) => {
                write!(f, "Console I/O failed: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Base URL of the image service API.
    #[structopt(long, env = "ELYSIA_API_ENDPOINT")]
    endpoint: String,

    /// Largest image accepted for upload, in KiB.
    #[structopt(long, default_value = "500", env = "ELYSIA_MAX_UPLOAD_KIB")]
    max_upload_kib: u64,
}

impl Args {
    fn max_upload_bytes(&self) -> u64 {
        self.max_upload_kib.saturating_mul(1024)
    }
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();

    let endpoint = url::Url::parse(&args.endpoint).map_err(Error::InvalidEndpoint)?;

    telemetry::init().map_err(Error::TelemetryInitError)?;
    tracing::info!(%endpoint, "Starting admin console");

    let service = Arc::new(HttpImageService::new(&endpoint));
    let session = Session::new(service).with_max_upload_bytes(args.max_upload_bytes());

    let result = Console::new(session).run().await;
    telemetry::shutdown();

    result.map_err(Error::ConsoleIoError)
}
