//! Agent persistence: the on-disk record format, atomic save/load, and the
//! per-tier store that bootstraps missing agent files.

mod record;
mod store;

pub use record::{AgentFile, AgentRecord, FORMAT_VERSION};
pub use store::{load_record, save_record, AgentStore, AgentStoreConfig};
