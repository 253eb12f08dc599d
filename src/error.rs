//! Error type shared by the loader, the reshaper and the animator.
//!
//! Chart rendering reports through `anyhow` instead, since plotters' backend
//! errors are only `Debug`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Input that cannot be interpreted: bad year labels, mismatched columns,
    /// non-numeric cells, unsupported file types.
    #[error("{source_name}: {message}")]
    DataFormat {
        source_name: String,
        message: String,
    },

    /// Animation requested over a range with `first > last`.
    #[error("empty year range: first year {first} is after last year {last}")]
    EmptyRange { first: i32, last: i32 },

    #[error("year range {first}..={last} spans more than {max} frames")]
    RangeTooWide { first: i32, last: i32, max: usize },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A frame could not be read back for assembly. Produced frames are left on disk.
    #[error("frame {}: {source}", path.display())]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn data_format(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataFormat {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
