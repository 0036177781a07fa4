use thiserror::Error;

/// Errors that abort a scenario run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("step {step}: invalid hex: {source}")]
    Hex {
        step: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("step {step}: unknown data type '{name}'")]
    UnknownDataType { step: usize, name: String },
}
