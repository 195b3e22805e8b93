use std::fmt::Write;

use crate::loader::{Skill, SkillSource};

// Structural tags (lowercase) that would break the prompt if a skill body
// emitted them verbatim. Matching is case-insensitive.
const SANITIZE_PATTERNS: &[(&str, &str)] = &[
    ("</skill>", "&lt;/skill&gt;"),
    ("<skill", "&lt;skill"),
    ("</instructions>", "&lt;/instructions&gt;"),
    ("<instructions", "&lt;instructions"),
    ("</available_skills>", "&lt;/available_skills&gt;"),
    ("<available_skills", "&lt;available_skills"),
];

/// Case-insensitive replacement of `pattern` (given in lowercase) in `src`.
fn replace_case_insensitive(src: &str, pattern: &str, replacement: &str) -> String {
    let lower = src.to_ascii_lowercase();
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;
    while pos < src.len() {
        if lower[pos..].starts_with(pattern) {
            out.push_str(replacement);
            pos += pattern.len();
        } else {
            // pos stays on a char boundary: to_ascii_lowercase preserves them
            let ch = src[pos..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            pos += ch.len_utf8();
        }
    }
    out
}

/// Escape prompt-structural tags in an instruction body.
///
/// Applied to module and user skills before context injection; core skills
/// are injected verbatim.
#[must_use]
pub fn sanitize_instructions(body: &str) -> String {
    let mut out = body.to_string();
    for (pattern, replacement) in SANITIZE_PATTERNS {
        out = replace_case_insensitive(&out, pattern, replacement);
    }
    out
}

/// Format skill blocks for LLM context injection.
///
/// The caller supplies skills already ordered (descending priority); returns
/// an empty string when there are none.
#[must_use]
pub fn format_skills_context(skills: &[&Skill]) -> String {
    if skills.is_empty() {
        return String::new();
    }

    let mut out = String::from("<available_skills>\n");

    for skill in skills {
        let body = if skill.source == SkillSource::Core {
            skill.instructions.clone()
        } else {
            sanitize_instructions(&skill.instructions)
        };

        let _ = write!(
            out,
            "  <skill name=\"{}\" priority=\"{}\">\n    <description>{}</description>\n",
            skill.name, skill.priority, skill.description,
        );
        if !skill.triggers.is_empty() {
            let _ = writeln!(out, "    <triggers>{}</triggers>", skill.triggers.join(", "));
        }
        if !skill.allowed_endpoints.is_empty() {
            let _ = writeln!(
                out,
                "    <endpoints>{}</endpoints>",
                skill.allowed_endpoints.join(", ")
            );
        }
        let _ = write!(out, "    <instructions>\n{body}\n    </instructions>\n  </skill>\n");
    }

    out.push_str("</available_skills>");
    out
}
