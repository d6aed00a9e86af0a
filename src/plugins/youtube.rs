//! YouTube lookups via the yt-dlp executable
//!
//! Only searches; nothing is downloaded and nothing is opened here.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors from a video search
#[derive(Debug, Error)]
pub enum VideoResolveError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    #[error("no video found")]
    NotFound,
}

/// Resolves a free-text query to the URL of the top matching video
#[async_trait]
pub trait VideoResolver: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, VideoResolveError>;

    /// Top result URL, or `None` when the search failed or found nothing
    async fn resolve_video_url(&self, query: &str) -> Option<String> {
        match self.search(query).await {
            Ok(url) => {
                debug!("Resolved {:?} to {}", query, url);
                Some(url)
            }
            Err(e) => {
                warn!("YouTube search for {:?} failed: {}", query, e);
                None
            }
        }
    }
}

/// Runs `yt-dlp` in quiet, search-only mode
pub struct YtDlpResolver {
    program: String,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--quiet", "--no-warnings", "--skip-download", "--no-playlist"])
            .args(["--print", "webpage_url"])
            .arg(format!("ytsearch1:{}", query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl VideoResolver for YtDlpResolver {
    async fn search(&self, query: &str) -> Result<String, VideoResolveError> {
        let output = tokio::time::timeout(self.timeout, self.command(query).output())
            .await
            .map_err(|_| VideoResolveError::Timeout(self.timeout))?
            .map_err(|source| VideoResolveError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VideoResolveError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_first_url(&String::from_utf8_lossy(&output.stdout)).ok_or(VideoResolveError::NotFound)
    }
}

/// First non-empty line of yt-dlp output that looks like a URL
fn parse_first_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(str::to_string)
}
