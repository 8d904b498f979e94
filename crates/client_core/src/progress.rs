//! Download-progress polling for server-version downloads.

use std::time::Duration;

use tracing::debug;

use shared::protocol::DownloadProgress;

use crate::{ClientEvent, PanelApi, PanelClient};

pub(crate) const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// The progress route reported a settled state (completed or error).
    Settled(DownloadProgress),
    /// A poll failed; the backend drops finished downloads from its progress
    /// table, so treat the download as done and refresh the version list.
    AssumedComplete { version: String },
}

impl PanelClient {
    /// Polls the progress route once per second until the download leaves
    /// the in-flight states, publishing each sample as
    /// [`ClientEvent::Download`].
    pub async fn watch_download(&self, version: &str) -> DownloadOutcome {
        self.watch_download_every(version, POLL_INTERVAL).await
    }

    async fn watch_download_every(&self, version: &str, interval: Duration) -> DownloadOutcome {
        loop {
            tokio::time::sleep(interval).await;
            match self.download_progress(version).await {
                Ok(progress) => {
                    let _ = self.events.send(ClientEvent::Download(progress.clone()));
                    if !progress.status.is_in_flight() {
                        return DownloadOutcome::Settled(progress);
                    }
                }
                Err(err) => {
                    debug!(%err, version, "progress poll failed, assuming download settled");
                    tokio::time::sleep(interval).await;
                    return DownloadOutcome::AssumedComplete {
                        version: version.to_string(),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/progress_tests.rs"]
mod tests;
