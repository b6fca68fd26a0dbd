// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional `config.toml` settings.
//!
//! Read once at startup. A missing file means the built-in agent list and
//! default identities.

use std::path::Path;

use sb_core::{
    AgentDescriptor, AgentRegistry, MachineConfig, RegistryError, SwitchQueuePolicy, UserId,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid agent list: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentEntry {
    pub id: u32,
    pub handle: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub default_user_id: String,
    pub switch_user_id: String,
    pub switch_queue: SwitchQueuePolicy,
    /// Absent means the built-in list. Present but empty is an error.
    pub agents: Option<Vec<AgentEntry>>,
}

impl Default for Settings {
    fn default() -> Self {
        let machine = MachineConfig::default();
        Self {
            default_user_id: machine.default_user_id.to_string(),
            switch_user_id: machine.switch_user_id.to_string(),
            switch_queue: machine.switch_queue,
            agents: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        // Fail at load time, not at first lookup
        settings.registry()?;
        Ok(settings)
    }

    pub fn registry(&self) -> Result<AgentRegistry, RegistryError> {
        match &self.agents {
            None => Ok(AgentRegistry::builtin()),
            Some(entries) => AgentRegistry::new(
                entries
                    .iter()
                    .map(|e| AgentDescriptor::new(e.id, e.handle.clone(), e.name.clone()))
                    .collect(),
            ),
        }
    }

    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            default_user_id: UserId::new(self.default_user_id.clone()),
            switch_user_id: UserId::new(self.switch_user_id.clone()),
            switch_queue: self.switch_queue,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
