use std::collections::{HashMap, HashSet};

use crate::config::{ModulesConfig, RegistryConfig};
use crate::error::SkillError;
use crate::loader::{Skill, SkillSource, discover_skills};
use crate::lockfile::Lockfile;
use crate::prompt::format_skills_context;

/// One indexed trigger keyword, pre-ranked for deterministic resolution.
#[derive(Debug, Clone)]
struct TriggerEntry {
    trigger: String,
    skill: String,
    priority: i64,
}

/// Aggregated view of all loaded skills across the three precedence tiers,
/// guarded by the approval lockfile.
///
/// Construct one at process startup and hand it to request handlers by
/// reference; `load` and `approve_skill` are control-plane operations and are
/// expected to run from a single caller. `load` builds the replacement skill
/// map and trigger index completely before swapping them in, so readers never
/// observe a half-rebuilt index.
#[derive(Debug)]
pub struct SkillRegistry {
    config: RegistryConfig,
    skills: HashMap<String, Skill>,
    trigger_index: Vec<TriggerEntry>,
    lockfile: Lockfile,
}

/// Operator-facing load statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl SkillRegistry {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            skills: HashMap::new(),
            trigger_index: Vec::new(),
            lockfile: Lockfile::default(),
        }
    }

    /// Discover skills from all tiers, apply the lockfile integrity gate,
    /// rebuild the trigger index, and rewrite the lockfile.
    ///
    /// A skill whose content hash no longer matches its lockfile entry is
    /// deactivated, not deleted; it stays visible to `approve_skill`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lockfile or module config cannot be read, or
    /// the lockfile cannot be rewritten.
    pub fn load(&mut self) -> Result<(), SkillError> {
        let mut lockfile = Lockfile::load(&self.config.lockfile_path)?;
        let modules = ModulesConfig::load(&self.config.modules_config)?;

        let mut tiers = vec![(self.config.core_dir.clone(), SkillSource::Core)];
        for name in modules.enabled_modules {
            let dir = self.config.modules_dir.join(&name);
            tiers.push((dir, SkillSource::Module(name)));
        }
        tiers.push((self.config.user_dir.clone(), SkillSource::User));

        let mut merged: HashMap<String, Skill> = HashMap::new();
        for (dir, source) in tiers {
            for skill in discover_skills(&dir, &source) {
                if let Some(prev) = merged.get(&skill.name) {
                    tracing::info!(
                        skill = %skill.name,
                        old = %prev.source,
                        new = %skill.source,
                        "skill overridden by higher-precedence source"
                    );
                }
                merged.insert(skill.name.clone(), skill);
            }
        }

        for skill in merged.values_mut() {
            match lockfile.get(&skill.name) {
                Some(entry) if entry.sha256 != skill.sha256 => {
                    skill.active = false;
                    tracing::warn!(
                        skill = %skill.name,
                        "content hash changed since approval; deactivated until re-approved"
                    );
                }
                Some(_) => skill.active = true,
                None => {
                    skill.active = self.config.auto_approve_new;
                    if !skill.active {
                        tracing::warn!(skill = %skill.name, "new skill pending approval");
                    }
                }
            }
        }

        // Every active skill gets a lockfile entry at its current hash;
        // approved_at is preserved for entries that already match.
        for skill in merged.values().filter(|s| s.active) {
            if lockfile.get(&skill.name).is_none() {
                lockfile.approve(&skill.name, &skill.sha256);
            }
        }
        lockfile.save(&self.config.lockfile_path)?;

        let trigger_index = build_trigger_index(&merged);

        self.skills = merged;
        self.trigger_index = trigger_index;
        self.lockfile = lockfile;
        Ok(())
    }

    /// Match a free-text message against indexed trigger keywords.
    ///
    /// Candidates are ranked by skill priority descending, then trigger
    /// length descending, so "weekly shopping list" beats "list" regardless
    /// of load order. Only active skills are indexed.
    #[must_use]
    pub fn match_triggers(&self, message: &str) -> Option<&Skill> {
        let message = message.to_lowercase();
        let message = message.trim();
        self.trigger_index
            .iter()
            .find(|entry| message.contains(entry.trigger.as_str()))
            .and_then(|entry| self.skills.get(&entry.skill))
    }

    /// Format all active skills for LLM context injection, highest priority
    /// first. Empty string when no skill is active.
    #[must_use]
    pub fn get_llm_context(&self) -> String {
        let mut active: Vec<&Skill> = self.skills.values().filter(|s| s.active).collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        format_skills_context(&active)
    }

    /// Activate a skill at its current content hash and persist the approval.
    ///
    /// Returns `Ok(false)` if no skill with that name is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the lockfile cannot be written.
    pub fn approve_skill(&mut self, name: &str) -> Result<bool, SkillError> {
        let Some(skill) = self.skills.get_mut(name) else {
            return Ok(false);
        };
        skill.active = true;
        let sha256 = skill.sha256.clone();

        self.lockfile.approve(name, &sha256);
        self.lockfile.save(&self.config.lockfile_path)?;
        self.trigger_index = build_trigger_index(&self.skills);
        tracing::info!(skill = %name, "skill approved");
        Ok(true)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    #[must_use]
    pub fn summary(&self) -> RegistrySummary {
        let active = self.skills.values().filter(|s| s.active).count();
        RegistrySummary {
            total: self.skills.len(),
            active,
            inactive: self.skills.len() - active,
        }
    }
}

fn build_trigger_index(skills: &HashMap<String, Skill>) -> Vec<TriggerEntry> {
    let mut index = Vec::new();
    for skill in skills.values().filter(|s| s.active) {
        for trigger in &skill.triggers {
            index.push(TriggerEntry {
                trigger: trigger.clone(),
                skill: skill.name.clone(),
                priority: skill.priority,
            });
        }
    }

    index.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.trigger.len().cmp(&a.trigger.len()))
            .then_with(|| a.skill.cmp(&b.skill))
    });

    let mut seen = HashSet::new();
    for entry in &index {
        if !seen.insert(entry.trigger.as_str()) {
            tracing::debug!(
                trigger = %entry.trigger,
                skill = %entry.skill,
                "duplicate trigger keyword; higher-ranked skill wins"
            );
        }
    }

    index
}
