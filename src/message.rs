//! Progress notifications.
//!
//! The pipeline reports each unit of work through a [`Progress`] sink.
//! Notifications are informational only, but an error returned by the sink
//! aborts the run.

use crate::version::Version;

/// One progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
    /// A version is about to be built.
    SwitchVersion(&'a Version),
    /// A file was parsed; `percent` is the share of files processed so far.
    ParseClass { percent: f64, class: &'a str },
    /// Diagnostics collected while parsing one file.
    ParseErrors { file: &'a str, errors: &'a [String] },
    /// A class went through the visitor pipeline.
    ClassVisited { class: &'a str, modified: bool },
    /// The build of a version is complete.
    ParseVersionFinished {
        version: &'a Version,
        modified: usize,
        removed: usize,
        errors: usize,
    },
}

pub type ProgressError = Box<dyn std::error::Error + Send + Sync>;

pub trait Progress {
    fn notify(&mut self, message: Message<'_>) -> Result<(), ProgressError>;
}

impl<F> Progress for F
where
    F: FnMut(Message<'_>) -> Result<(), ProgressError>,
{
    fn notify(&mut self, message: Message<'_>) -> Result<(), ProgressError> {
        self(message)
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    fn notify(&mut self, _message: Message<'_>) -> Result<(), ProgressError> {
        Ok(())
    }
}
