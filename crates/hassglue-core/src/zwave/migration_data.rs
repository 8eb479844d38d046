// ── Migration data snapshot ──
//
// Per config entry, a record of how every discovered value maps onto its
// registry entries. Kept in memory behind an `ArcSwap` and persisted with
// a debounced write: each `save_data` call resets the timer, and `close`
// flushes whatever is still pending.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::helpers::{node_device_identifier, unique_id};
use crate::config::MigrationConfig;
use crate::error::CoreError;
use crate::model::DiscoveryInfo;
use crate::store::{DataStore, Store};

pub const STORAGE_KEY: &str = "zwave_js.legacy_zwave_migration";
pub const STORAGE_VERSION: u32 = 1;

/// How one discovered value maps onto its entity and device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub node_id: u32,
    pub endpoint_index: u32,
    pub command_class: u32,
    pub value_property_name: Option<String>,
    pub value_property_key_name: Option<String>,
    pub value_id: String,
    pub device_id: String,
    pub domain: String,
    pub entity_id: String,
    pub unique_id: String,
    pub unit_of_measurement: Option<String>,
}

/// Records of one config entry, by unique ID.
pub type EntryMigrationData = BTreeMap<String, MigrationRecord>;

/// Records of every config entry, by config entry ID.
pub type MigrationData = BTreeMap<String, EntryMigrationData>;

struct Shared {
    store: Store,
    data: ArcSwap<MigrationData>,
    dirty: AtomicBool,
}

impl Shared {
    async fn flush(&self) -> Result<(), CoreError> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        let data = self.data.load_full();
        if let Err(e) = self.store.save(&*data).await {
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }
        debug!(entries = data.len(), "flushed migration data");
        Ok(())
    }
}

struct PendingWrite {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the migration data for one host instance.
pub struct LegacyMigration {
    shared: Arc<Shared>,
    write_delay: Duration,
    pending: Mutex<Option<PendingWrite>>,
}

impl LegacyMigration {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Store::new(&config.storage_dir, STORAGE_KEY, STORAGE_VERSION),
                data: ArcSwap::from_pointee(MigrationData::new()),
                dirty: AtomicBool::new(false),
            }),
            write_delay: config.write_delay,
            pending: Mutex::new(None),
        }
    }

    /// Current in-memory data.
    pub fn data(&self) -> Arc<MigrationData> {
        self.shared.data.load_full()
    }

    /// Whether in-memory data has not been written yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    /// Replace in-memory data with the persisted copy.
    ///
    /// A missing or empty file leaves the data untouched. While a write is
    /// pending, config entries held in memory win over the stored ones.
    pub async fn load_data(&self) -> Result<(), CoreError> {
        let Some(stored) = self.shared.store.load::<MigrationData>().await? else {
            return Ok(());
        };
        if stored.is_empty() {
            return Ok(());
        }
        if self.has_unsaved_changes() {
            debug!("migration data has unsaved changes, merging over stored copy");
            self.shared.data.rcu(|current| {
                let mut merged = stored.clone();
                merged.extend(MigrationData::clone(current));
                merged
            });
        } else {
            self.shared.data.store(Arc::new(stored));
        }
        Ok(())
    }

    /// Merge `data` (by config entry) and schedule a write.
    pub fn save_data(&self, data: MigrationData) {
        self.shared.data.rcu(|current| {
            let mut next = MigrationData::clone(current);
            next.extend(data.clone());
            next
        });
        self.shared.dirty.store(true, Ordering::Release);
        self.schedule_write();
    }

    /// Collect records for every discovered value of a config entry and
    /// save them. Values without an entity or device entry are skipped.
    pub fn generate_data<'a>(
        &self,
        store: &DataStore,
        config_entry_id: &str,
        discovered: impl IntoIterator<Item = &'a DiscoveryInfo>,
    ) -> EntryMigrationData {
        let entities: BTreeMap<String, _> = store
            .entities
            .entries_for_config_entry(config_entry_id)
            .into_iter()
            .map(|entry| (entry.unique_id.clone(), entry))
            .collect();

        let mut data = EntryMigrationData::new();
        for info in discovered {
            let node = &info.node;
            let value = &info.primary_value;
            let value_id = value.value_id();
            let unique_id = unique_id(node.home_id, &value_id);

            let Some(entity) = entities.get(&unique_id) else {
                debug!(unique_id = %unique_id, "missing entity entry");
                continue;
            };
            let identifier = node_device_identifier(node);
            let Some(device) = store.devices.get_device(std::slice::from_ref(&identifier)) else {
                debug!(identifier = %identifier, "missing device entry");
                continue;
            };

            data.insert(
                unique_id.clone(),
                MigrationRecord {
                    node_id: node.node_id,
                    endpoint_index: node.index,
                    command_class: value.command_class,
                    value_property_name: value.property_name.clone(),
                    value_property_key_name: value.property_key_name.clone(),
                    value_id,
                    device_id: device.id.clone(),
                    domain: entity.domain().to_owned(),
                    entity_id: entity.entity_id.clone(),
                    unique_id,
                    unit_of_measurement: entity.unit_of_measurement.clone(),
                },
            );
        }

        debug!(config_entry_id, records = data.len(), "collected migration data");
        self.save_data(MigrationData::from([(config_entry_id.to_owned(), data.clone())]));
        data
    }

    /// Reload persisted data and return the records of one config entry.
    pub async fn get_data(&self, config_entry_id: &str) -> Result<EntryMigrationData, CoreError> {
        self.load_data().await?;
        Ok(self
            .shared
            .data
            .load()
            .get(config_entry_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Cancel the pending write timer and write any unsaved data now.
    pub async fn close(&self) -> Result<(), CoreError> {
        let pending = self.lock_pending().take();
        if let Some(PendingWrite { cancel, handle }) = pending {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "migration data writer task failed");
            }
        }
        self.shared.flush().await
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingWrite>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_write(&self) {
        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.cancel.cancel();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime for delayed write, data is written on close");
            return;
        };

        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let delay = self.write_delay;
        let token = cancel.clone();
        let handle = runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if let Err(e) = shared.flush().await {
                        warn!(error = %e, "failed to write migration data");
                    }
                }
            }
        });

        *pending = Some(PendingWrite { cancel, handle });
    }
}
