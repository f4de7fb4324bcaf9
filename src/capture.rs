use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::browser::BrowserSession;
use crate::config::CaptureConfig;
use crate::error::CaptureError;

/// Resolve a local document to an absolute `file://` URL.
///
/// Fails before any browser is launched if the file is missing, so a bad
/// input path never pays for a Chromium startup.
pub fn file_url(path: &Path) -> Result<Url, CaptureError> {
    if !path.exists() {
        return Err(CaptureError::MissingInput(path.to_path_buf()));
    }
    let absolute = path.canonicalize()?;
    Url::from_file_path(&absolute).map_err(|_| CaptureError::InvalidPath(absolute))
}

/// Render the configured document and write a PNG screenshot.
///
/// The browser is released on every exit path, failed navigations
/// included. Returns the output path on success.
pub async fn run(config: &CaptureConfig) -> Result<PathBuf, CaptureError> {
    let url = file_url(&config.input)?;
    info!("Capturing {} -> {}", url, config.output.display());

    let session = BrowserSession::launch(config).await?;
    let shot = capture_page(&session, &url, config).await;
    session.close().await;
    let bytes = shot?;

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&config.output, &bytes).await?;
    info!("Wrote {} bytes to {}", bytes.len(), config.output.display());
    Ok(config.output.clone())
}

async fn capture_page(
    session: &BrowserSession,
    url: &Url,
    config: &CaptureConfig,
) -> Result<Vec<u8>, CaptureError> {
    session.goto(url).await?;
    session
        .wait_until_ready(Duration::from_millis(config.settle_ms))
        .await?;
    session.screenshot_png(config.full_page).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_url_for_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<html><body>hi</body></html>").unwrap();

        let url = file_url(file.path()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with(
            file.path().file_name().unwrap().to_str().unwrap()
        ));
    }

    #[test]
    fn file_url_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let url = file_url(&path).unwrap();
        // Canonicalized, so the URL carries an absolute path.
        assert!(Path::new(url.path()).is_absolute());
    }

    #[test]
    fn file_url_missing_input() {
        let err = file_url(Path::new("does-not-exist.html")).unwrap_err();
        match err {
            CaptureError::MissingInput(path) => {
                assert_eq!(path, PathBuf::from("does-not-exist.html"));
            }
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }
}
