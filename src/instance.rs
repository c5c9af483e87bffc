//! Profile and instance model
//!
//! An instance is one configured Sonarr/Radarr backend plus its
//! language map: policy key (tag or containing directory) to the
//! language profile an import there must satisfy. Instances are
//! deserialized from the profile file and replaced wholesale on
//! reload; nothing mutates a live instance.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::clients::{ArrClient, RadarrClient, SonarrClient};
use crate::error::Result;

/// A named language-compliance policy. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Audio languages the imported file must carry
    #[serde(default)]
    pub required_languages_audio: Vec<String>,
    /// Subtitle languages the imported file must carry
    #[serde(default)]
    pub required_languages_sub: Vec<String>,
}

/// Which backend application an instance talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Sonarr,
    Radarr,
}

/// One configured backend: connection details plus its policy map.
///
/// The API client is constructed lazily on first use and cached for
/// the instance's lifetime. Construction performs no network I/O. A
/// changed API key means a fresh instance (the reload path builds new
/// instances anyway), never mutation of an existing one.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArrInstance {
    pub inst_type: InstanceType,
    pub base_path: String,
    pub api_key: String,
    #[serde(default)]
    pub language_map: HashMap<String, Profile>,
    #[serde(skip)]
    client: OnceLock<Arc<ArrClient>>,
}

impl ArrInstance {
    pub fn new(
        inst_type: InstanceType,
        base_path: impl Into<String>,
        api_key: impl Into<String>,
        language_map: HashMap<String, Profile>,
    ) -> Self {
        Self {
            inst_type,
            base_path: base_path.into(),
            api_key: api_key.into(),
            language_map,
            client: OnceLock::new(),
        }
    }

    /// Construct and cache the backend client. Idempotent: a no-op if
    /// a client already exists, and a lost race against a concurrent
    /// initializer just keeps the winner's client.
    pub fn init_client(&self) -> Result<()> {
        if self.client.get().is_some() {
            return Ok(());
        }
        let client = match self.inst_type {
            InstanceType::Sonarr => ArrClient::Sonarr(SonarrClient::new(
                &self.base_path,
                &self.api_key,
                Arc::new(self.language_map.clone()),
            )?),
            InstanceType::Radarr => ArrClient::Radarr(RadarrClient::new()),
        };
        let _ = self.client.set(Arc::new(client));
        Ok(())
    }

    /// The cached client, if `init_client` has run.
    pub fn client(&self) -> Option<Arc<ArrClient>> {
        self.client.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_instance() -> ArrInstance {
        ArrInstance::new(
            InstanceType::Sonarr,
            "http://localhost:8989",
            "key",
            HashMap::new(),
        )
    }

    #[test]
    fn client_init_is_idempotent() {
        let instance = test_instance();
        assert!(instance.client().is_none());

        instance.init_client().unwrap();
        let first = instance.client().unwrap();

        instance.init_client().unwrap();
        let second = instance.client().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn instance_deserializes_from_config_shape() {
        let raw = serde_json::json!({
            "inst_type": "sonarr",
            "base_path": "https://sonarr.example.com",
            "api_key": "secret",
            "language_map": {
                "/media/shows": {
                    "required_languages_audio": ["en", "fr"],
                    "required_languages_sub": ["en"]
                }
            }
        });
        let instance: ArrInstance = serde_json::from_value(raw).unwrap();
        assert_eq!(instance.inst_type, InstanceType::Sonarr);
        assert_eq!(
            instance.language_map["/media/shows"].required_languages_audio,
            vec!["en", "fr"]
        );
        // The client is runtime state, never part of the document.
        assert!(instance.client().is_none());
    }

    #[test]
    fn profile_lists_default_to_empty() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert!(profile.required_languages_audio.is_empty());
        assert!(profile.required_languages_sub.is_empty());
    }
}
