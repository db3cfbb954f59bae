use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::ViewState;
use crate::output::kml::{render_overview, render_perspective};
use crate::output::{SinkError, SinkResult, ViewStateSink};

/// Default file name of the overhead document
pub const OVERVIEW_FILE: &str = "overview.kml";

/// Default file name of the pilot perspective document
pub const PERSPECTIVE_FILE: &str = "perspective.kml";

const OVERVIEW: &str = "overview";
const PERSPECTIVE: &str = "perspective";

/// Writes the two KML documents to fixed paths
///
/// Each document goes to a sibling `.tmp` file first and is renamed over the
/// target, so a reader polling the file never sees a half-written document.
pub struct KmlFileSink {
    name: String,
    overview_path: PathBuf,
    perspective_path: PathBuf,
    marker_name: String,
}

impl KmlFileSink {
    pub fn new(overview_path: PathBuf, perspective_path: PathBuf, marker_name: &str) -> Self {
        Self {
            name: format!("kml:{}", overview_path.parent().unwrap_or(Path::new(".")).display()),
            overview_path,
            perspective_path,
            marker_name: marker_name.to_string(),
        }
    }

    #[cfg(test)]
    pub fn overview_path(&self) -> &Path {
        &self.overview_path
    }

    #[cfg(test)]
    pub fn perspective_path(&self) -> &Path {
        &self.perspective_path
    }

    /// Write `contents` to `path` through a temporary sibling
    async fn replace(kind: &'static str, path: &Path, contents: &str) -> SinkResult<()> {
        let write_err = |source| SinkError::Write {
            kind,
            path: path.to_path_buf(),
            source,
        };

        let tmp = tmp_path(path);
        let result = match tokio::fs::write(&tmp, contents).await {
            Ok(()) => tokio::fs::rename(&tmp, path).await,
            Err(e) => Err(e),
        };

        if let Err(source) = result {
            // The target keeps its previous document
            if let Err(e) = tokio::fs::remove_file(&tmp).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", tmp.display(), e);
                }
            }
            return Err(write_err(source));
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl ViewStateSink for KmlFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn prepare(&mut self) -> SinkResult<()> {
        for (kind, path) in [(OVERVIEW, &self.overview_path), (PERSPECTIVE, &self.perspective_path)] {
            tokio::fs::File::create(path)
                .await
                .map_err(|source| SinkError::Create {
                    kind,
                    path: path.clone(),
                    source,
                })?;
            debug!("Created {} target {}", kind, path.display());
        }

        info!(
            "Writing {} and {}",
            self.overview_path.display(),
            self.perspective_path.display()
        );
        Ok(())
    }

    async fn emit(&mut self, view: &ViewState) -> SinkResult<()> {
        let overview = render_overview(view, &self.marker_name);
        let perspective = render_perspective(view);

        Self::replace(OVERVIEW, &self.overview_path, &overview).await?;
        Self::replace(PERSPECTIVE, &self.perspective_path, &perspective).await?;
        Ok(())
    }
}
