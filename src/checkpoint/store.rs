use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::ai::{AgentKind, OpponentKind, QLearningAgent, QLearningConfig, RandomAgent};
use crate::checkpoint::record::{AgentFile, AgentRecord, FORMAT_VERSION};
use crate::error::PersistError;

/// Where per-tier agent files live.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentStoreConfig {
    pub data_dir: PathBuf,
}

impl Default for AgentStoreConfig {
    fn default() -> Self {
        AgentStoreConfig {
            data_dir: PathBuf::from("Data"),
        }
    }
}

/// Write `record` to `path` through a temporary file and a rename, so a
/// concurrent reader never sees a half-written file.
pub fn save_record(path: &Path, record: &AgentRecord<'_>) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let saved_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let file = AgentFile {
        format_version: FORMAT_VERSION,
        saved_at,
        agent: record.clone(),
    };
    let json = serde_json::to_string(&file)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(io_err)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }

    debug!(path = %path.display(), kind = record.kind(), "saved agent file");
    Ok(())
}

/// Read the agent record stored at `path`.
pub fn load_record(path: &Path) -> Result<AgentRecord<'static>, PersistError> {
    let json = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: AgentFile<'static> =
        serde_json::from_str(&json).map_err(|source| PersistError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file.agent)
}

/// Maps opponent tiers to their agent files and bootstraps missing ones.
#[derive(Debug, Clone)]
pub struct AgentStore {
    config: AgentStoreConfig,
}

impl AgentStore {
    pub fn new(config: AgentStoreConfig) -> Self {
        AgentStore { config }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// File backing `kind`. Human opponents have none.
    pub fn path_for(&self, kind: OpponentKind) -> Option<PathBuf> {
        match kind {
            OpponentKind::Human => None,
            other => Some(self.config.data_dir.join(format!("{}.json", other.name()))),
        }
    }

    /// Load the agent for `kind`, creating and persisting a fresh one if its
    /// file does not exist yet. Returns `None` for a human opponent.
    pub fn load_opponent(
        &self,
        kind: OpponentKind,
        config: &QLearningConfig,
    ) -> Result<Option<(AgentKind, PathBuf)>, PersistError> {
        let Some(path) = self.path_for(kind) else {
            return Ok(None);
        };
        let agent = AgentKind::load_or_bootstrap(&path, config, || {
            if kind.is_q_tier() {
                AgentKind::QLearning(QLearningAgent::new(config.clone()))
            } else {
                AgentKind::Random(RandomAgent::new())
            }
        })?;
        info!(opponent = %kind, path = %path.display(), "opponent ready");
        Ok(Some((agent, path)))
    }
}
