pub mod file;
pub mod kml;
pub mod memory;

pub use file::KmlFileSink;
pub use memory::MemorySink;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::ViewState;

/// Errors raised while writing view-state documents
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Error opening {kind} kml file {}: {source}", path.display())]
    Create {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing {kind} kml file {}: {source}", path.display())]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for the overview and perspective documents
///
/// Output is latest-state-only: every `emit` fully replaces the previous pair.
#[async_trait]
pub trait ViewStateSink: Send {
    /// Name of this sink, for logs
    fn name(&self) -> &str;

    /// Create (or truncate) both output targets before playback starts
    async fn prepare(&mut self) -> SinkResult<()>;

    /// Replace both documents with the given view-state
    async fn emit(&mut self, view: &ViewState) -> SinkResult<()>;
}
