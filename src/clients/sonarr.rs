//! Sonarr API client and webhook pipeline
//!
//! Parses Sonarr import webhooks, resolves the applicable language
//! profile (first matching tag, then the containing directory),
//! evaluates compliance, and on failure remediates: delete the episode
//! file, re-monitor the episodes, trigger a new search. Remediation is
//! strictly ordered and best-effort; a failed step aborts the rest and
//! is visible only in the logs.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::containing_dir;
use crate::compliance::satisfies;
use crate::error::{Error, Result};
use crate::instance::Profile;

const API_KEY_HEADER: &str = "X-Api-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Incoming Sonarr webhook, reduced to the fields the pipeline needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    #[serde(default)]
    series: Series,
    #[serde(default)]
    episodes: Vec<EpisodeRef>,
    #[serde(default)]
    episode_file: EpisodeFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Series {
    #[serde(default)]
    path: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    original_language: OriginalLanguage,
}

#[derive(Debug, Default, Deserialize)]
struct OriginalLanguage {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct EpisodeRef {
    #[serde(default)]
    id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeFile {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    media_info: MediaInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaInfo {
    #[serde(default)]
    audio_languages: Vec<String>,
    #[serde(default)]
    subtitles: Vec<String>,
}

/// Validated media descriptor for one import event.
///
/// Derived from a payload, used for one pipeline run, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonarrMediaInfo {
    pub episode_ids: Vec<i64>,
    pub episode_file_id: i64,
    pub media_path: String,
    pub tags: Vec<String>,
    pub original_language: String,
    pub audios: Vec<String>,
    pub subtitles: Vec<String>,
}

/// Sonarr REST client bound to one configured instance
#[derive(Debug)]
pub struct SonarrClient {
    http: reqwest::Client,
    base_url: String,
    profiles: Arc<HashMap<String, Profile>>,
}

impl SonarrClient {
    /// Build a client for `base_url`, authenticating every request
    /// with `api_key`. `profiles` is the owning instance's language
    /// map, keyed by tag or containing directory.
    pub fn new(
        base_url: &str,
        api_key: &str,
        profiles: Arc<HashMap<String, Profile>>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(api_key)
                .map_err(|e| Error::Config(format!("invalid api key: {e}")))?,
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            profiles,
        })
    }

    /// Validate the raw body and run the compliance check.
    ///
    /// Returns an error only for unparseable/incomplete payloads; from
    /// matching onward every outcome is logged, not returned.
    pub async fn process_webhook(&self, body: &[u8]) -> Result<()> {
        let info = self.parse_payload(body)?;
        self.run_check(&info).await;
        Ok(())
    }

    /// Deserialize and validate one webhook body.
    ///
    /// Requires at least one episode with a non-zero id, a non-empty
    /// series path, a non-empty original-language name, and a non-zero
    /// episode-file id. Empty audio/subtitle/tag lists are fine; a
    /// freshly imported file may legitimately have none.
    pub fn parse_payload(&self, body: &[u8]) -> Result<SonarrMediaInfo> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;

        let episode_ids: Vec<i64> = payload
            .episodes
            .iter()
            .map(|e| e.id)
            .filter(|id| *id != 0)
            .collect();
        if episode_ids.is_empty() {
            return Err(Error::InvalidPayload("missing episode id".into()));
        }
        if payload.series.path.is_empty() {
            return Err(Error::InvalidPayload("missing series path".into()));
        }
        if payload.series.original_language.name.is_empty() {
            return Err(Error::InvalidPayload(
                "missing original language name".into(),
            ));
        }
        if payload.episode_file.id == 0 {
            return Err(Error::InvalidPayload("missing episode file id".into()));
        }

        Ok(SonarrMediaInfo {
            episode_ids,
            episode_file_id: payload.episode_file.id,
            media_path: containing_dir(&payload.series.path),
            tags: payload.series.tags,
            original_language: payload.series.original_language.name,
            audios: payload.episode_file.media_info.audio_languages,
            subtitles: payload.episode_file.media_info.subtitles,
        })
    }

    /// Resolve the profile for this event and remediate if the file
    /// is missing a required language. No matching profile means no
    /// policy applies; that ends the pipeline quietly.
    async fn run_check(&self, info: &SonarrMediaInfo) {
        let Some(profile) = self.match_profile(info) else {
            warn!(
                tags = ?info.tags,
                media_path = %info.media_path,
                "no profile matched, checked tags and containing folder"
            );
            return;
        };

        if !satisfies(&info.audios, &profile.required_languages_audio) {
            info!(
                need = ?profile.required_languages_audio,
                got = ?info.audios,
                "missing required audio languages"
            );
            self.remediate(info).await;
            return;
        }
        if !satisfies(&info.subtitles, &profile.required_languages_sub) {
            info!(
                need = ?profile.required_languages_sub,
                got = ?info.subtitles,
                "missing required subtitle languages"
            );
            self.remediate(info).await;
            return;
        }

        debug!("all required languages present");
    }

    /// First declared tag with a registered profile wins, in listed
    /// order; otherwise fall back to the containing directory.
    fn match_profile(&self, info: &SonarrMediaInfo) -> Option<&Profile> {
        info.tags
            .iter()
            .find_map(|tag| self.profiles.get(tag))
            .or_else(|| self.profiles.get(&info.media_path))
    }

    /// Ordered remediation: delete file, re-monitor episodes, trigger
    /// a search. Each step waits for the previous one; the first
    /// failure aborts the rest. Nothing is rolled back or retried.
    async fn remediate(&self, info: &SonarrMediaInfo) {
        info!(
            file_id = info.episode_file_id,
            episode_ids = ?info.episode_ids,
            "deleting file and re-monitoring"
        );

        if let Err(e) = self.delete_episode_file(info.episode_file_id).await {
            error!(
                error = %e,
                file_id = info.episode_file_id,
                "failed to delete episode file"
            );
            return;
        }
        if let Err(e) = self.monitor_episodes(&info.episode_ids).await {
            error!(error = %e, episode_ids = ?info.episode_ids, "failed to re-monitor episodes");
            return;
        }
        if let Err(e) = self.search_episodes(&info.episode_ids).await {
            error!(error = %e, episode_ids = ?info.episode_ids, "failed to trigger episode search");
        }
    }

    async fn delete_episode_file(&self, file_id: i64) -> Result<()> {
        let url = format!("{}/api/v3/episodefile/{}", self.base_url, file_id);
        let response = self.http.delete(&url).send().await?;
        check_status(response).await
    }

    async fn monitor_episodes(&self, episode_ids: &[i64]) -> Result<()> {
        let url = format!("{}/api/v3/episode/monitor", self.base_url);
        let response = self
            .http
            .put(&url)
            .json(&json!({ "episodeIds": episode_ids, "monitored": true }))
            .send()
            .await?;
        check_status(response).await
    }

    async fn search_episodes(&self, episode_ids: &[i64]) -> Result<()> {
        let url = format!("{}/api/v3/command", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "name": "EpisodeSearch", "episodeIds": episode_ids }))
            .send()
            .await?;
        check_status(response).await
    }
}

/// Success is any 2xx; anything else carries the status and body back
/// for the remediation log.
async fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}
