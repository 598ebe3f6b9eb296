//! Line-oriented operator console on top of a [`Session`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_std::io::prelude::*;
use structopt::clap::AppSettings;
use structopt::StructOpt;
use thiserror::Error;

use crate::admin::{self, AdminPanel, PhotoListRefresh};
use crate::models::images::ImageKind;
use crate::models::uploads::{PendingUpload, SelectedFile};
use crate::service::ImageService;
use crate::session::Session;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "elysia",
    no_version,
    setting = AppSettings::NoBinaryName,
    setting = AppSettings::VersionlessSubcommands
)]
pub enum Command {
    /// Log in to the image service.
    Login { username: String, password: String },
    /// Log out and forget everything fetched so far.
    Logout,
    /// Show login state and upload drafts.
    Status,
    /// Fetch and show all album covers.
    Covers,
    /// Show the photos of the last searched album.
    Photos,
    /// Fetch and show the photos of an album.
    Search {
        #[structopt(name = "ALBUM", required = true, min_values = 1)]
        album: Vec<String>,
    },
    /// Create an album from a cover image.
    ///
    /// Only the given parts of the draft are replaced, so a rejected upload can
    /// be retried with just the missing piece.
    UploadCover {
        /// Name of the new album.
        #[structopt(long, short)]
        name: Option<String>,
        /// Cover image file.
        #[structopt(name = "FILE", parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Upload a photo into an existing album.
    UploadPhoto {
        /// Album to upload into.
        #[structopt(long, short)]
        album: Option<String>,
        /// Photo file.
        #[structopt(name = "FILE", parse(from_os_str))]
        file: Option<PathBuf>,
    },
    /// Delete a listed cover or photo.
    Delete {
        /// Either "cover" or "photo".
        #[structopt(name = "KIND")]
        kind: ImageKind,
        #[structopt(name = "ID")]
        id: String,
    },
    /// Leave the console.
    #[structopt(alias = "exit")]
    Quit,
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Admin(#[from] admin::Error),
    #[error("Couldn't read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unterminated quote")]
    UnterminatedQuote,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

/// Split a console line into words. Double quotes group words, and `\"`
/// inside quotes is a literal quote.
pub fn split_line(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            },
            '\\' if quoted => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(ConsoleError::UnterminatedQuote),
            },
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            },
            c => {
                current.push(c);
                in_word = true;
            },
        }
    }

    if quoted {
        return Err(ConsoleError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

async fn read_file(path: &Path) -> Result<SelectedFile, ConsoleError> {
    SelectedFile::open(path)
        .await
        .map_err(|source| ConsoleError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}

fn render_covers<S: ImageService>(admin: &AdminPanel<S>) -> String {
    let covers = admin.covers();
    if covers.is_empty() {
        return "No album covers yet".to_string();
    }

    let mut out = format!("All album covers ({}):", covers.len());
    for cover in covers {
        let _ = write!(
            out,
            "\n  {}  {}  [{}]  {}",
            cover.id, cover.name, cover.kind, cover.url
        );
    }
    out
}

fn render_photos<S: ImageService>(admin: &AdminPanel<S>) -> String {
    let photos = admin.album_photos();
    if admin.search_album().is_empty() || photos.is_empty() {
        return "No album photos to show".to_string();
    }

    let mut out = format!(
        "Photos in album {} ({}):",
        admin.search_album(),
        photos.len()
    );
    for photo in photos {
        let _ = write!(out, "\n  {}  [{}]  {}", photo.id, photo.kind, photo.url);
    }
    out
}

fn render_draft(label: &str, draft: &PendingUpload) -> String {
    let album = if draft.album.is_empty() {
        "-"
    } else {
        &draft.album
    };
    match &draft.file {
        Some(file) => format!("{}: album {}, selected {}", label, album, file),
        None => format!("{}: album {}, no file selected", label, album),
    }
}

pub struct Console<S> {
    session: Session<S>,
}

impl<S: ImageService> Console<S> {
    pub fn new(session: Session<S>) -> Self {
        Console { session }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn prompt(&self) -> &'static str {
        if self.session.is_logged_in() {
            "elysia (admin)> "
        } else {
            "elysia> "
        }
    }

    /// Run one console line. Failures of any kind come back as text.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        let words = match split_line(line) {
            Ok(words) if words.is_empty() => return Reply::Continue(String::new()),
            Ok(words) => words,
            Err(err) => return Reply::Continue(format!("Error: {}", err)),
        };

        let command = match Command::from_iter_safe(words) {
            Ok(command) => command,
            Err(err) => return Reply::Continue(err.message),
        };

        if let Command::Quit = command {
            self.session.logout();
            return Reply::Quit;
        }

        match self.execute(command).await {
            Ok(output) => Reply::Continue(output),
            Err(err) => Reply::Continue(format!("Error: {}", err)),
        }
    }

    async fn execute(&mut self, command: Command) -> Result<String, ConsoleError> {
        let output = match command {
            Command::Login { username, password } => {
                let message = self.session.login(&username, &password).await?;
                format!("{}\n{}", message, render_covers(self.session.admin()?))
            },
            Command::Logout => {
                self.session.logout();
                "Logged out".to_string()
            },
            Command::Status => self.status(),
            Command::Covers => {
                let admin = self.session.admin_mut()?;
                admin.list_covers().await?;
                render_covers(admin)
            },
            Command::Photos => render_photos(self.session.admin()?),
            Command::Search { album } => {
                let admin = self.session.admin_mut()?;
                admin.search_album_photos(&album.join(" ")).await?;
                render_photos(admin)
            },
            Command::UploadCover { name, file } => {
                let admin = self.session.admin_mut()?;
                if let Some(name) = name {
                    admin.set_cover_name(name);
                }
                if let Some(path) = file {
                    admin.select_cover_file(read_file(&path).await?);
                }
                admin.upload_cover().await?;
                format!("Album cover uploaded\n{}", render_covers(admin))
            },
            Command::UploadPhoto { album, file } => {
                let admin = self.session.admin_mut()?;
                if let Some(album) = album {
                    admin.set_photo_album(album);
                }
                if let Some(path) = file {
                    admin.select_photo_file(read_file(&path).await?);
                }
                match admin.upload_album_photo().await? {
                    PhotoListRefresh::Refreshed => {
                        format!("Photo uploaded to album\n{}", render_photos(admin))
                    },
                    PhotoListRefresh::Unchanged => "Photo uploaded to album".to_string(),
                }
            },
            Command::Delete { kind, id } => {
                self.session.admin_mut()?.delete_image(&id, kind).await?;
                "Image deleted".to_string()
            },
            Command::Quit => String::new(),
        };

        Ok(output)
    }

    fn status(&self) -> String {
        match self.session.admin() {
            Ok(admin) => format!(
                "Logged in, {} album covers cached, searched album {:?}\n{}\n{}",
                admin.covers().len(),
                admin.search_album(),
                render_draft("Cover draft", admin.cover_draft()),
                render_draft("Photo draft", admin.photo_draft()),
            ),
            Err(_) => "Not logged in".to_string(),
        }
    }

    /// Read commands from stdin until end of input or `quit`.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let stdin = async_std::io::stdin();
        let mut stdout = async_std::io::stdout();
        let mut line = String::new();

        loop {
            stdout.write_all(self.prompt().as_bytes()).await?;
            stdout.flush().await?;

            line.clear();
            if stdin.read_line(&mut line).await? == 0 {
                break;
            }

            match self.handle_line(&line).await {
                Reply::Continue(output) if output.is_empty() => {},
                Reply::Continue(output) => {
                    stdout.write_all(output.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                },
                Reply::Quit => break,
            }
        }

        self.session.logout();
        Ok(())
    }
}
