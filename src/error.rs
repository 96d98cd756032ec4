//! Error types for attachment sorting

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_MAILBOX_AUTH: i32 = 3;
pub const EXIT_MAILBOX_FETCH: i32 = 4;
pub const EXIT_FILESYSTEM: i32 = 5;

#[derive(Error, Debug)]
pub enum Error {
    /// The mailbox exists but we are not allowed to open it.
    #[error("access to mailbox {} denied: {source}", .path.display())]
    MailboxAuth { path: PathBuf, source: io::Error },

    /// The mailbox cannot be listed.
    #[error("cannot read mailbox {}: {source}", .path.display())]
    MailboxFetch { path: PathBuf, source: io::Error },

    #[error("cannot read message {id}: {source}")]
    ReadMessage { id: String, source: io::Error },

    #[error("cannot decode attachment {name:?}: {reason}")]
    DecodeAttachment { name: String, reason: String },

    #[error("cannot parse message {id}: {source}")]
    ParseMessage {
        id: String,
        source: mailparse::MailParseError,
    },

    /// One or more of the required body fields are absent.
    #[error("required fields not found: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("malformed purchase date {0:?}, expected DD.MM.YYYY")]
    MalformedDate(String),

    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", .path.display())]
    WriteFile { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Fatal errors abort the run, everything else only skips one message or
    /// one attachment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MailboxAuth { .. } | Error::MailboxFetch { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MailboxAuth { .. } => EXIT_MAILBOX_AUTH,
            Error::MailboxFetch { .. }
            | Error::ReadMessage { .. }
            | Error::ParseMessage { .. }
            | Error::DecodeAttachment { .. } => EXIT_MAILBOX_FETCH,
            Error::CreateDir { .. } | Error::WriteFile { .. } => EXIT_FILESYSTEM,
            Error::MissingFields(_) | Error::MalformedDate(_) => EXIT_FAILURE,
        }
    }
}

/// Picks the exit code for an error bubbled up to `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(EXIT_FAILURE, Error::exit_code)
}
