//! SKILL.md loader, approval lockfile, and skill registry.

pub mod config;
pub mod error;
pub mod loader;
pub mod lockfile;
pub mod prompt;
pub mod registry;

pub use config::{ModulesConfig, RegistryConfig};
pub use error::SkillError;
pub use loader::{Skill, SkillSource, discover_skills, load_skill};
pub use lockfile::{LockEntry, Lockfile};
pub use registry::{RegistrySummary, SkillRegistry};
