//! Radarr client stub
//!
//! Radarr instances are accepted in the profile file and honor the
//! same `process_webhook` contract, but the movie pipeline itself is
//! not built yet.
//! TODO: parse the Radarr import payload (movieFile/movie shapes) and
//! wire up its deletefile/monitor/MoviesSearch remediation calls.

use tracing::warn;

use crate::error::{Error, Result};

/// Placeholder client for configured Radarr instances
#[derive(Debug, Default)]
pub struct RadarrClient;

impl RadarrClient {
    pub fn new() -> Self {
        Self
    }

    pub async fn process_webhook(&self, _body: &[u8]) -> Result<()> {
        warn!("radarr webhook received, but the radarr pipeline is not implemented yet");
        Err(Error::Unsupported("radarr webhook processing".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn radarr_reports_unsupported() {
        let err = RadarrClient::new().process_webhook(b"{}").await.unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
