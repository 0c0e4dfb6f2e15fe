use std::path::{Path, PathBuf};

use url::Url;

use crate::filename::sanitize_file_name;
use crate::{CoreError, SiteProfile};

/// The thread being harvested; fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTarget {
    pub source_url: String,
    pub board: String,
    pub thread_id: String,
    pub site: SiteProfile,
    pub destination_dir: PathBuf,
}

impl ThreadTarget {
    /// Parse `url`, resolve its site profile and place the thread under
    /// `{output_root}/{board}/{thread_id}`. Nothing is created on disk.
    pub fn from_url(url: &str, output_root: &Path) -> Result<Self, CoreError> {
        let parsed = Url::parse(url.trim()).map_err(|err| CoreError::InvalidUrl(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CoreError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| CoreError::InvalidUrl("missing host".to_string()))?;
        let site = SiteProfile::resolve(host)?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let board = segments
            .first()
            .and_then(|s| sanitize_file_name(s))
            .ok_or(CoreError::MissingPathSegment { segment: "board" })?;
        let thread_id = segments
            .get(site.thread_segment())
            .and_then(|s| sanitize_file_name(s))
            .ok_or(CoreError::MissingPathSegment { segment: "thread" })?;

        let destination_dir = output_root.join(&board).join(&thread_id);
        Ok(Self {
            source_url: parsed.to_string(),
            board,
            thread_id,
            site,
            destination_dir,
        })
    }
}
