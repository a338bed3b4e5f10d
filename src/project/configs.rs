use super::Project;
use crate::constants::DEFAULT_CONFIG;
use crate::core::StitchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Build configuration tree (`configs` in the `.yyp`), rooted at `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Config>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_CONFIG.to_string(),
            children: Vec::new(),
        }
    }
}

impl Config {
    /// Find a config anywhere in this subtree.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Config> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Config> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Every config name in the subtree, depth first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }
}

impl Project {
    /// The configuration tree.
    #[must_use]
    pub fn configs(&self) -> &Config {
        &self.configs
    }

    /// Add a config under the root unless one with that name exists anywhere.
    pub fn add_config(&mut self, name: &str) -> bool {
        if self.configs.find(name).is_some() {
            return false;
        }
        self.configs.children.push(Config {
            name: name.to_string(),
            children: Vec::new(),
        });
        true
    }

    /// Ensure a config exists as a child of `parent`.
    ///
    /// A config that already exists anywhere is left where it is.
    pub fn ensure_config(&mut self, name: &str, parent: &str) -> Result<bool> {
        if self.configs.find(name).is_some() {
            return Ok(false);
        }
        let Some(parent_config) = self.configs.find_mut(parent) else {
            return Err(StitchError::InvalidOption {
                option: "config parent".to_string(),
                reason: format!("config {parent} does not exist"),
            }
            .into());
        };
        parent_config.children.push(Config {
            name: name.to_string(),
            children: Vec::new(),
        });
        Ok(true)
    }
}
