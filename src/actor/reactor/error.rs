use thiserror::Error;

use crate::model::WindowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReactorError {
    #[error("window {0} is already managed")]
    DuplicateWindow(WindowId),
    #[error("window {0} was never added")]
    UnknownWindow(WindowId),
    #[error("no screen on output {0:?}")]
    UnknownOutput(String),
}
