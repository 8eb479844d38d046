// ── Registries and persistence ──
//
// In-memory entity/device registries, the state machine, and the
// versioned JSON file store used for migration data.

mod collection;
mod data_store;
mod device_registry;
mod entity_registry;
pub mod states;
mod storage;

pub use data_store::{DataStore, RegistrySnapshot};
pub use device_registry::DeviceRegistry;
pub use entity_registry::EntityRegistry;
pub use states::{STATE_UNAVAILABLE, STATE_UNKNOWN, State, StateMachine};
pub use storage::Store;
