//! Fatal errors. Anything recoverable (lost, duplicated or reordered packets, a failed datagram
//! send) is handled inside the sessions and never reaches the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The source or destination file could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The UDP socket could not be created or bound.
    #[error("failed to bind socket to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The peer address could not be resolved.
    #[error("failed to resolve peer address {0}")]
    Resolve(String),

    /// Reading from the file being sent failed.
    #[error("failed to read source: {0}")]
    Source(#[source] io::Error),

    /// Writing to the destination failed.
    #[error("failed to write destination: {0}")]
    Sink(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
