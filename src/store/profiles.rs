//! Profile store
//!
//! Owns the routing table from webhook routing key (the `warden-key`
//! header value) to a configured instance. Loads from the profile
//! file, rebuilds the table wholesale on change, and persists profile
//! updates back to the file.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ConfigSource;
use crate::error::{Error, Result};
use crate::instance::{ArrInstance, Profile};
use crate::store::KeyedStore;

/// Routing-key -> instance store backed by the profile file.
///
/// `resolve` reads the current table snapshot and never touches the
/// file; only `reload` and `upsert_profile` do I/O. Reload swaps the
/// table in one step, so readers racing a reload see either the old
/// or the new generation in full.
pub struct ProfileStore {
    table: KeyedStore<String, Arc<ArrInstance>>,
    source: ConfigSource,
}

impl ProfileStore {
    /// Open the store, seeding an example profile file if none exists.
    ///
    /// An unreadable or unparseable file here is fatal; it is the one
    /// unrecoverable condition in the service.
    pub fn open(source: ConfigSource) -> Result<Self> {
        if !source.exists() {
            warn!("no profile file found, creating one with example values");
            source.seed_example()?;
        }

        let store = Self {
            table: KeyedStore::new(),
            source,
        };
        store.reload()?;
        Ok(store)
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Look up the instance for a routing key. Pure table read.
    pub fn resolve(&self, routing_key: &str) -> Option<Arc<ArrInstance>> {
        self.table.load(routing_key)
    }

    /// Number of currently routable instances.
    pub fn count(&self) -> usize {
        self.table.count()
    }

    /// Rebuild the routing table from the profile file.
    ///
    /// Each entry deserializes independently; a malformed entry is
    /// logged and skipped, never aborting the rest. The new table is
    /// swapped in only after it is complete, and a read failure leaves
    /// the previous table in place.
    pub fn reload(&self) -> Result<()> {
        debug!("reloading profiles");
        let doc = self.source.read_document()?;

        let mut next = HashMap::new();
        for (nickname, value) in doc {
            let instance: ArrInstance = match serde_json::from_value(value) {
                Ok(instance) => instance,
                Err(e) => {
                    warn!(nickname = %nickname, error = %e, "skipping malformed instance entry");
                    continue;
                }
            };
            // Client construction is cheap and does no network I/O, so
            // the first webhook never pays an initialization cost.
            if let Err(e) = instance.init_client() {
                warn!(nickname = %nickname, error = %e, "skipping instance, client construction failed");
                continue;
            }
            info!(
                nickname = %nickname,
                inst_type = ?instance.inst_type,
                base_path = %instance.base_path,
                policies = instance.language_map.len(),
                "loaded instance"
            );
            next.insert(nickname, Arc::new(instance));
        }

        if next.is_empty() {
            warn!("loaded 0 instances, add an instance to the profile file");
        }
        self.table.replace(next);
        Ok(())
    }

    /// Write a profile under `policy_key` in the named instance's
    /// language map, persist the document, and reload so the change is
    /// routable immediately. External edits to the file go through the
    /// same reload path via the change watcher.
    pub fn upsert_profile(
        &self,
        instance: &str,
        policy_key: &str,
        profile: Profile,
    ) -> Result<()> {
        let mut doc = self.source.read_document()?;
        let entry = doc
            .get_mut(instance)
            .ok_or_else(|| Error::NotFound(format!("instance {instance}")))?;
        let fields = entry
            .as_object_mut()
            .ok_or_else(|| Error::Config(format!("instance {instance} is not a table")))?;
        let language_map = fields
            .entry("language_map")
            .or_insert_with(|| Value::Object(Default::default()));
        let language_map = language_map
            .as_object_mut()
            .ok_or_else(|| Error::Config(format!("language_map of {instance} is not a table")))?;
        language_map.insert(policy_key.to_string(), serde_json::to_value(profile)?);

        self.source.write_document(&doc)?;
        info!(instance = %instance, policy_key = %policy_key, "persisted profile update");
        self.reload()
    }
}
