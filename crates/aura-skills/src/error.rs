#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid skill: {0}")]
    Invalid(String),

    #[error("skill '{0}' declares api_only: false; only API-only skills are loadable")]
    NotApiOnly(String),

    #[error("skill not found: {0}")]
    NotFound(String),
}
