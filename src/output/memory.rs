use async_trait::async_trait;

use crate::core::ViewState;
use crate::output::kml::{render_overview, render_perspective};
use crate::output::{SinkResult, ViewStateSink};

/// Sink that keeps the latest documents in memory
///
/// Mirrors the file sink's latest-state-only behavior without touching disk.
#[derive(Debug, Default)]
pub struct MemorySink {
    marker_name: String,
    prepared: bool,
    emits: usize,
    last_view: Option<ViewState>,
    overview: Option<String>,
    perspective: Option<String>,
}

impl MemorySink {
    pub fn new(marker_name: &str) -> Self {
        Self {
            marker_name: marker_name.to_string(),
            ..Default::default()
        }
    }

    /// Number of view-states emitted so far
    pub fn emits(&self) -> usize {
        self.emits
    }

    pub fn last_view(&self) -> Option<&ViewState> {
        self.last_view.as_ref()
    }

    /// Latest overview document, empty after `prepare`
    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }

    pub fn perspective(&self) -> Option<&str> {
        self.perspective.as_deref()
    }
}

#[async_trait]
impl ViewStateSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn prepare(&mut self) -> SinkResult<()> {
        self.prepared = true;
        self.overview = Some(String::new());
        self.perspective = Some(String::new());
        Ok(())
    }

    async fn emit(&mut self, view: &ViewState) -> SinkResult<()> {
        self.emits += 1;
        self.last_view = Some(*view);
        self.overview = Some(render_overview(view, &self.marker_name));
        self.perspective = Some(render_perspective(view));
        Ok(())
    }
}
