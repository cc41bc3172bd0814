use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("no {0} with id `{1}`")]
    NotFound(&'static str, String),
    #[error("cannot connect node `{0}` to itself")]
    SelfLoop(String),
    #[error("nodes `{0}` and `{1}` are already connected by link `{2}`")]
    DuplicateLink(String, String, String),
    #[error("{0} id `{1}` is used more than once")]
    DuplicateId(&'static str, String),
    #[error("link `{0}` refers to missing node `{1}`")]
    DanglingReference(String, String),
    #[error("malformed topology document: {0}")]
    MalformedSchema(String),
    #[error("topology is limited to {1} {0}s")]
    CapacityExceeded(&'static str, usize),
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to access {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot tell the topology format of {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error("invalid configuration {}: {}", .path.display(), .source)]
    Config { path: PathBuf, source: serde_yaml::Error },
    #[error(transparent)]
    Model(#[from] Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl ToString) -> Self {
        Error::MalformedSchema(reason.to_string())
    }
}

impl FileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FileError::Io { path: path.into(), source }
    }
}
