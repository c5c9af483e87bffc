//! Backend API clients
//!
//! One client per configured instance, selected by instance type. All
//! variants share the same capability: take a raw webhook body and run
//! the validate -> match -> evaluate -> remediate pipeline against
//! their backend's payload shape and API surface.

pub mod radarr;
pub mod sonarr;

pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

use crate::error::Result;

/// Backend client, dispatched by configured instance type.
#[derive(Debug)]
pub enum ArrClient {
    Sonarr(SonarrClient),
    Radarr(RadarrClient),
}

impl ArrClient {
    /// Run the webhook pipeline for this backend.
    ///
    /// Parse/match/evaluate are pure; network calls happen only when
    /// remediation is required. Remote-call failures are logged inside
    /// the pipeline, not returned: the caller runs detached from the
    /// webhook response and only validation errors surface here.
    pub async fn process_webhook(&self, body: &[u8]) -> Result<()> {
        match self {
            ArrClient::Sonarr(client) => client.process_webhook(body).await,
            ArrClient::Radarr(client) => client.process_webhook(body).await,
        }
    }
}

/// Containing directory of a media file path, with separators folded
/// to `/` so the result is independent of the host platform.
pub(crate) fn containing_dir(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    match normalized.rsplit_once('/') {
        Some(("", _)) => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
        None => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::containing_dir;

    #[test]
    fn containing_dir_unix_path() {
        assert_eq!(
            containing_dir("/media/anime/SomeShow/file.mkv"),
            "/media/anime/SomeShow"
        );
    }

    #[test]
    fn containing_dir_windows_separators() {
        assert_eq!(
            containing_dir("\\media\\anime\\SomeShow\\file.mkv"),
            "/media/anime/SomeShow"
        );
    }

    #[test]
    fn containing_dir_edge_cases() {
        assert_eq!(containing_dir("/file.mkv"), "/");
        assert_eq!(containing_dir("file.mkv"), ".");
    }
}
