use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::SkillError;

/// Which precedence tier a skill was discovered in.
///
/// On a name collision the higher tier wins: `User` > `Module` > `Core`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillSource {
    /// Built-in skill shipped with the assistant.
    Core,
    /// Skill provided by an enabled module.
    Module(String),
    /// Skill authored by the user.
    User,
}

impl SkillSource {
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Core => 0,
            Self::Module(_) => 1,
            Self::User => 2,
        }
    }
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Module(name) => write!(f, "module:{name}"),
            Self::User => f.write_str("user"),
        }
    }
}

/// A named capability with a human-authored instruction body.
#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    /// Always true for loaded skills; a definition declaring `api_only: false`
    /// never makes it past the parser.
    pub api_only: bool,
    /// Lowercased, trimmed keyword triggers.
    pub triggers: Vec<String>,
    /// `"METHOD /path"` entries; a trailing `*` makes the path a prefix match.
    pub allowed_endpoints: Vec<String>,
    /// Free-text body injected into LLM context.
    pub instructions: String,
    pub source: SkillSource,
    pub file_path: PathBuf,
    /// Hex SHA-256 over the entire raw file content.
    pub sha256: String,
    pub active: bool,
    pub tags: Vec<String>,
    pub priority: i64,
}

/// Load a skill from a SKILL.md file with frontmatter.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the frontmatter is
/// missing/unclosed, `name` is absent, or the skill declares
/// `api_only: false`.
pub fn load_skill(path: &Path, source: SkillSource) -> Result<Skill, SkillError> {
    let raw = std::fs::read_to_string(path)?;
    parse_skill(&raw, path, source)
}

fn parse_skill(raw: &str, path: &Path, source: SkillSource) -> Result<Skill, SkillError> {
    let sha256 = format!("{:x}", Sha256::digest(raw.as_bytes()));

    let content = raw.trim_start();
    if !content.starts_with("---") {
        return Err(SkillError::Invalid(format!(
            "missing frontmatter delimiter in {}",
            path.display()
        )));
    }

    let after_open = &content[3..];
    let Some(close) = after_open.find("---") else {
        return Err(SkillError::Invalid(format!(
            "unclosed frontmatter in {}",
            path.display()
        )));
    };

    let mut name = None;
    let mut description = String::new();
    let mut version = None;
    let mut author = None;
    let mut api_only = true;
    let mut priority = 0;
    let mut triggers = Vec::new();
    let mut allowed_endpoints = Vec::new();
    let mut tags = Vec::new();

    let mut list_key: Option<&str> = None;
    for line in after_open[..close].lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            let item = item.trim();
            match list_key {
                Some("triggers") => triggers.push(item.to_lowercase()),
                Some("allowed_endpoints") => allowed_endpoints.push(normalize_endpoint(item)),
                Some("tags") => tags.push(item.to_string()),
                _ => {}
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if value.is_empty() {
            list_key = match key {
                "triggers" => Some("triggers"),
                "allowed_endpoints" => Some("allowed_endpoints"),
                "tags" => Some("tags"),
                _ => None,
            };
            continue;
        }
        list_key = None;

        match key {
            "name" => name = Some(value.to_string()),
            "description" => description = value.to_string(),
            "version" => version = Some(value.to_string()),
            "author" => author = Some(value.to_string()),
            "api_only" => api_only = value.eq_ignore_ascii_case("true"),
            "priority" => priority = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    let name = name.filter(|s| !s.is_empty()).ok_or_else(|| {
        SkillError::Invalid(format!("missing 'name' in frontmatter of {}", path.display()))
    })?;

    if !api_only {
        tracing::error!(
            skill = %name,
            path = %path.display(),
            "rejecting skill: api_only is a security boundary and cannot be disabled"
        );
        return Err(SkillError::NotApiOnly(name));
    }

    let instructions = after_open[close + 3..].trim().to_string();

    Ok(Skill {
        name,
        description,
        version: version.unwrap_or_else(|| "0.0.1".to_string()),
        author: author.unwrap_or_else(|| "unknown".to_string()),
        api_only,
        triggers,
        allowed_endpoints,
        instructions,
        source,
        file_path: path.to_path_buf(),
        sha256,
        active: true,
        tags,
        priority,
    })
}

/// Uppercase the method part of a `"METHOD /path"` endpoint entry.
fn normalize_endpoint(entry: &str) -> String {
    match entry.split_once(' ') {
        Some((method, path)) => format!("{} {}", method.to_ascii_uppercase(), path.trim()),
        None => entry.to_string(),
    }
}

/// Scan `base/<skill-name>/SKILL.md` in sorted order and load all valid skills.
///
/// Invalid files are logged with `tracing::warn` and skipped; a missing base
/// directory yields an empty list.
#[must_use]
pub fn discover_skills(base: &Path, source: &SkillSource) -> Vec<Skill> {
    let mut skills = Vec::new();

    let Ok(entries) = std::fs::read_dir(base) else {
        tracing::debug!("skill directory not readable: {}", base.display());
        return skills;
    };

    let mut dirs: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    dirs.sort();

    for dir in dirs {
        let skill_path = dir.join("SKILL.md");
        if !skill_path.is_file() {
            continue;
        }
        match load_skill(&skill_path, source.clone()) {
            Ok(skill) => skills.push(skill),
            Err(e) => tracing::warn!("skipping {}: {e}", skill_path.display()),
        }
    }

    skills
}
