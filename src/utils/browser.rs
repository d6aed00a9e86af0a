//! Opening links in the default browser

use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not open {url}: {source}")]
pub struct BrowserError {
    url: String,
    #[source]
    source: std::io::Error,
}

/// Opens a URL somewhere the user can see it
pub trait BrowserLauncher: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), BrowserError>;
}

/// The system's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open_url(&self, url: &str) -> Result<(), BrowserError> {
        tracing::info!("Opening {}", url);
        open::that(url).map_err(|source| BrowserError {
            url: url.to_string(),
            source,
        })
    }
}
