use thiserror::Error;

/// Errors raised while loading environment configuration or the team file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read team file {path}: {source}")]
    TeamsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse team file: {0}")]
    TeamsFileParse(#[from] serde_json::Error),

    #[error("team configuration invalid: {0}")]
    Validation(String),
}
