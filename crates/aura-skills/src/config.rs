use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SkillError;

/// Filesystem layout and policy for a [`crate::SkillRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Built-in skills shipped with the assistant.
    pub core_dir: PathBuf,
    /// Parent directory holding one skill tree per module.
    pub modules_dir: PathBuf,
    /// User-authored skills; highest precedence.
    pub user_dir: PathBuf,
    /// Module enablement file (`modules.toml`).
    pub modules_config: PathBuf,
    pub lockfile_path: PathBuf,
    /// Whether a skill seen for the first time (no lockfile entry) loads
    /// active and is locked at its current hash. `true` matches the historical
    /// behavior; `false` requires an explicit `approve_skill` call first.
    pub auto_approve_new: bool,
}

impl RegistryConfig {
    /// Conventional layout under a single base directory, with the lockfile
    /// location overridable via `AURA_SKILLS_LOCKFILE`.
    #[must_use]
    pub fn new(base: &Path) -> Self {
        let lockfile_path = std::env::var("AURA_SKILLS_LOCKFILE")
            .map_or_else(|_| base.join("skills.lock.json"), PathBuf::from);

        Self {
            core_dir: base.join("core"),
            modules_dir: base.join("modules"),
            user_dir: base.join("user"),
            modules_config: base.join("modules.toml"),
            lockfile_path,
            auto_approve_new: true,
        }
    }
}

/// `modules.toml`: which module skill trees the registry scans.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModulesConfig {
    #[serde(default)]
    pub enabled_modules: Vec<String>,
}

impl ModulesConfig {
    /// Read the module enablement file, defaulting to no modules if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SkillError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
