use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ChainError, ChainResult};

/// Consensus-critical parameters of the admission pipeline. Every node in
/// the network must run with identical values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsensusParams {
    #[serde(default = "default_timestamp_tolerance_secs")]
    pub timestamp_tolerance_secs: u64,
    #[serde(default = "default_proposer_change_time_secs")]
    pub proposer_change_time_secs: u64,
    #[serde(default = "default_genesis_block_proposed_height")]
    pub genesis_block_proposed_height: u32,
}

fn default_timestamp_tolerance_secs() -> u64 {
    40
}

fn default_proposer_change_time_secs() -> u64 {
    60
}

fn default_genesis_block_proposed_height() -> u32 {
    4
}

impl ConsensusParams {
    pub fn load(path: &Path) -> ChainResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|err| ChainError::Config(format!("unable to parse config: {err}")))
    }

    pub fn save(&self, path: &Path) -> ChainResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let encoded = toml::to_string_pretty(self)
            .map_err(|err| ChainError::Config(format!("unable to encode config: {err}")))?;
        fs::write(path, encoded)?;
        Ok(())
    }

    pub fn timestamp_tolerance(&self) -> Duration {
        Duration::from_secs(self.timestamp_tolerance_secs)
    }

    pub fn proposer_change_time(&self) -> Duration {
        Duration::from_secs(self.proposer_change_time_secs)
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            timestamp_tolerance_secs: default_timestamp_tolerance_secs(),
            proposer_change_time_secs: default_proposer_change_time_secs(),
            genesis_block_proposed_height: default_genesis_block_proposed_height(),
        }
    }
}
