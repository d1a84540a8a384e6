use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Sound resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Sound asset not found: {name:?}")]
    NotFound { name: String },

    #[error("Sound asset unreadable: {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to load sound from {path:?}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("UI sound category rejected: {reason}")]
    CategoryRejected { reason: String },

    #[error("Playback backend error: {0}")]
    Backend(String),
}
