//! Named versions of a shape's command list.
//!
//! Every entry is an owned copy: saving, loading and reverting clone the
//! whole command list, so later edits never reach a stored version and the
//! original snapshot survives any number of saves.

use serde::{Deserialize, Serialize};
use vs_core::{Command, Result, SceneError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistory {
    original: Vec<Command>,
    versions: Vec<Version>,
    /// Version the live commands were last saved as or loaded from.
    /// Cleared as soon as they diverge.
    active: Option<usize>,
}

impl VersionHistory {
    /// Start a history; `original` is captured once and never replaced.
    pub fn new(original: Vec<Command>) -> Self {
        Self {
            original,
            versions: Vec::new(),
            active: None,
        }
    }

    pub fn original(&self) -> &[Command] {
        &self.original
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Append a copy of `commands` and make it active. Returns its index.
    pub fn save(&mut self, name: Option<&str>, commands: &[Command]) -> usize {
        let index = self.versions.len();
        let name = name
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Version {}", index + 1));
        self.versions.push(Version {
            name,
            commands: commands.to_vec(),
        });
        self.active = Some(index);
        index
    }

    /// A copy of version `index`'s commands; that version becomes active.
    pub fn load(&mut self, index: usize) -> Result<Vec<Command>> {
        let version = self.versions.get(index).ok_or(SceneError::VersionOutOfRange {
            index,
            len: self.versions.len(),
        })?;
        self.active = Some(index);
        Ok(version.commands.clone())
    }

    /// A copy of the original commands; no version is active afterwards.
    pub fn revert(&mut self) -> Vec<Command> {
        self.active = None;
        self.original.clone()
    }

    /// The live commands no longer match any saved version.
    pub fn mark_divergent(&mut self) {
        self.active = None;
    }
}
