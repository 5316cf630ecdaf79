//! Emulator registry and process launching.
//!
//! Registered emulators are stored as flat JSON and validated only for
//! path existence. Launching spawns the executable detached and returns the
//! process id; stopping goes through the platform kill command.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// One registered emulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Display name, unique within the registry
    pub name: String,
    /// Path to the emulator executable
    pub executable_path: PathBuf,
}

impl EmulatorConfig {
    pub fn new(name: impl Into<String>, executable_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable_path: executable_path.into(),
        }
    }
}

/// JSON-file-backed emulator registry.
pub struct EmulatorRegistry {
    path: PathBuf,
    entries: Vec<EmulatorConfig>,
}

impl EmulatorRegistry {
    /// Load the registry from a JSON file, starting empty when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(entries) => entries,
                    Err(e) => {
                        log::warn!("Unreadable emulator registry, starting empty: {}", e);
                        Vec::new()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read emulator registry: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Load the registry from its default location in the data directory.
    pub fn load_default() -> Self {
        Self::load(&Config::data_dir().join("emulators.json"))
    }

    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryAccess {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, contents).map_err(|e| Error::file_write(&self.path, e))
    }

    /// Register an emulator. The executable must exist and the name must be
    /// unused.
    pub fn add(&mut self, emulator: EmulatorConfig) -> Result<()> {
        if !emulator.executable_path.exists() {
            return Err(Error::PathNotFound(emulator.executable_path));
        }
        if self.get(&emulator.name).is_some() {
            return Err(Error::EmulatorExists(emulator.name));
        }

        log::info!(
            "Registered emulator '{}' at {:?}",
            emulator.name,
            emulator.executable_path
        );
        self.entries.push(emulator);
        self.save()
    }

    /// Remove an emulator by name.
    pub fn remove(&mut self, name: &str) -> Result<EmulatorConfig> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| Error::EmulatorNotFound(name.to_string()))?;
        let removed = self.entries.remove(index);
        self.save()?;
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<&EmulatorConfig> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn list(&self) -> &[EmulatorConfig] {
        &self.entries
    }

    /// Launch a registered emulator detached, returning its process id.
    pub fn launch(&self, name: &str) -> Result<u32> {
        let emulator = self
            .get(name)
            .ok_or_else(|| Error::EmulatorNotFound(name.to_string()))?;

        if !emulator.executable_path.exists() {
            return Err(Error::EmulatorLaunch {
                name: name.to_string(),
                reason: format!(
                    "executable no longer exists: {}",
                    emulator.executable_path.display()
                ),
            });
        }

        let child = Command::new(&emulator.executable_path)
            .spawn()
            .map_err(|e| Error::EmulatorLaunch {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let pid = child.id();
        log::info!("Launched emulator '{}' with pid {}", name, pid);
        Ok(pid)
    }
}

/// Terminate a process by pid using the platform kill command.
#[cfg(windows)]
pub fn terminate_process(pid: u32) -> Result<()> {
    let output = Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .output()
        .map_err(|e| Error::ProcessTermination {
            pid,
            reason: e.to_string(),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::ProcessTermination {
            pid,
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(not(windows))]
pub fn terminate_process(pid: u32) -> Result<()> {
    let output = Command::new("kill")
        .args(["-9", &pid.to_string()])
        .output()
        .map_err(|e| Error::ProcessTermination {
            pid,
            reason: e.to_string(),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::ProcessTermination {
            pid,
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
