//! Asset download worker: existence check, retried GET with extension
//! fallback, then a streamed atomic write.

use std::path::Path;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use grabber_core::{
    extension_of, fallback_position, swap_extension, AssetLink, DownloadOutcome, FailureReason,
    FALLBACK_EXTENSIONS,
};
use reqwest::StatusCode;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::map_reqwest_error;
use crate::RetryPolicy;

pub(crate) async fn download_asset(
    client: &reqwest::Client,
    retry: &RetryPolicy,
    link: &AssetLink,
    destination_dir: &Path,
    force_refresh: bool,
) -> DownloadOutcome {
    let writer = AtomicFileWriter::new(destination_dir.to_path_buf());

    if !force_refresh {
        if let Some(existing) = existing_file(&writer, link) {
            return DownloadOutcome::skipped_existing(existing);
        }
    }

    match reqwest::Url::parse(&link.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => return DownloadOutcome::skipped_unsupported(link.file_name.clone()),
    }

    let mut candidate = Candidate::new(link);
    let Some(response) = request_with_retry(client, retry, &mut candidate).await else {
        return DownloadOutcome::failed(candidate.file_name, FailureReason::MaxRetriesExceeded);
    };

    let status = response.status();
    if status != StatusCode::OK {
        return DownloadOutcome::failed(
            candidate.file_name,
            FailureReason::NonSuccessStatus(status.as_u16()),
        );
    }

    match write_body(response, &writer, &candidate.file_name).await {
        Ok(bytes) => DownloadOutcome::downloaded(candidate.file_name, bytes),
        Err(reason) => DownloadOutcome::failed(candidate.file_name, reason),
    }
}

/// Name of a file already holding this asset, if any. Fallback links may have
/// been saved under any candidate extension.
fn existing_file(writer: &AtomicFileWriter, link: &AssetLink) -> Option<String> {
    let current = extension_of(&link.file_name);
    if link.extension_fallback && fallback_position(current).is_some() {
        return FALLBACK_EXTENSIONS
            .iter()
            .map(|ext| swap_extension(&link.file_name, current, ext))
            .find(|name| writer.exists(name));
    }
    writer
        .exists(&link.file_name)
        .then(|| link.file_name.clone())
}

/// The url/filename pair currently being tried.
struct Candidate {
    url: String,
    file_name: String,
    /// Index into [`FALLBACK_EXTENSIONS`] when fallback applies.
    extension: Option<usize>,
}

impl Candidate {
    fn new(link: &AssetLink) -> Self {
        let extension = if link.extension_fallback {
            fallback_position(extension_of(&link.file_name))
        } else {
            None
        };
        Self {
            url: link.url.clone(),
            file_name: link.file_name.clone(),
            extension,
        }
    }

    /// Move to the next fallback extension, wrapping around after the last.
    fn advance_extension(&mut self) {
        let Some(index) = self.extension else {
            return;
        };
        let from = FALLBACK_EXTENSIONS[index];
        let next = (index + 1) % FALLBACK_EXTENSIONS.len();
        let to = FALLBACK_EXTENSIONS[next];

        self.url = swap_extension(&self.url, from, to);
        self.file_name = swap_extension(&self.file_name, from, to);
        self.extension = Some(next);
        engine_debug!("Trying {} as {}", self.file_name, to);
    }
}

/// GET the candidate until it answers with something other than 404/429.
/// `None` once the attempt budget is spent.
async fn request_with_retry(
    client: &reqwest::Client,
    retry: &RetryPolicy,
    candidate: &mut Candidate,
) -> Option<reqwest::Response> {
    for attempt in 1..=retry.max_attempts {
        let more_attempts = attempt < retry.max_attempts;
        match client.get(candidate.url.as_str()).send().await {
            Err(err) => {
                engine_warn!(
                    "GET {} failed (attempt {}/{}): {}",
                    candidate.url,
                    attempt,
                    retry.max_attempts,
                    map_reqwest_error(err)
                );
            }
            Ok(response) => match response.status() {
                StatusCode::NOT_FOUND => {
                    engine_debug!(
                        "GET {} -> 404 (attempt {}/{})",
                        candidate.url,
                        attempt,
                        retry.max_attempts
                    );
                    if more_attempts {
                        candidate.advance_extension();
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    engine_debug!(
                        "GET {} -> 429 (attempt {}/{})",
                        candidate.url,
                        attempt,
                        retry.max_attempts
                    );
                }
                _ => return Some(response),
            },
        }

        if more_attempts && !retry.delay.is_zero() {
            tokio::time::sleep(retry.delay).await;
        }
    }
    None
}

async fn write_body(
    response: reqwest::Response,
    writer: &AtomicFileWriter,
    file_name: &str,
) -> Result<u64, FailureReason> {
    let mut pending = writer.begin().map_err(write_error)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| {
            FailureReason::WriteError(format!("reading body: {}", map_reqwest_error(err)))
        })?;
        pending.write_chunk(&chunk).map_err(write_error)?;
    }
    let bytes = pending.bytes_written();
    pending.commit(file_name).map_err(write_error)?;
    Ok(bytes)
}

fn write_error(err: PersistError) -> FailureReason {
    FailureReason::WriteError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, fallback: bool) -> AssetLink {
        AssetLink {
            url: format!("https://i.4cdn.org/w/{name}"),
            file_name: name.to_string(),
            extension_fallback: fallback,
        }
    }

    #[test]
    fn candidate_cycles_through_fallback_extensions() {
        let mut candidate = Candidate::new(&link("1.jpg", true));
        let mut seen = vec![candidate.file_name.clone()];
        for _ in 0..4 {
            candidate.advance_extension();
            seen.push(candidate.file_name.clone());
        }
        assert_eq!(seen, vec!["1.jpg", "1.png", "1.webm", "1.gif", "1.jpg"]);
        assert_eq!(candidate.url, "https://i.4cdn.org/w/1.jpg");
    }

    #[test]
    fn candidate_without_fallback_never_changes() {
        let mut candidate = Candidate::new(&link("1.jpg", false));
        candidate.advance_extension();
        assert_eq!(candidate.file_name, "1.jpg");
        assert_eq!(candidate.url, "https://i.4cdn.org/w/1.jpg");
    }

    #[test]
    fn existing_fallback_file_is_found_under_any_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("1.webm"), b"x").unwrap();
        let writer = AtomicFileWriter::new(dir.path().to_path_buf());

        assert_eq!(
            existing_file(&writer, &link("1.jpg", true)).as_deref(),
            Some("1.webm")
        );
        assert_eq!(existing_file(&writer, &link("1.jpg", false)), None);
    }
}
