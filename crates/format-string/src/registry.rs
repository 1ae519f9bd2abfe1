//! Per-node configuration storage.

use crate::schema::NodeConfig;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Holds the most recent [`NodeConfig`] computed for each node id.
///
/// # Lifecycle
///
/// - Created once when the server starts and shared for the life of the process
/// - An entry is added or replaced every time a node is reconfigured
/// - Entries are never expired or persisted; the editor's project file is the
///   source of truth and reconfigures nodes on load
#[derive(Debug, Default)]
pub struct NodeConfigRegistry {
    configs: RwLock<HashMap<String, NodeConfig>>,
}

impl NodeConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config` for `node_id`, returning the configuration it replaced.
    pub fn insert(&self, node_id: impl Into<String>, config: NodeConfig) -> Option<NodeConfig> {
        self.configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node_id.into(), config)
    }

    /// Returns the stored configuration for `node_id`, if any.
    pub fn get(&self, node_id: &str) -> Option<NodeConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
