//! Structured error types for every boundary of the engine.
//!
//! Component exceptions never surface as `Err` from the engine (spec §7);
//! these types are for configuration, validation, injection and resource
//! loading failures, which *may* surface as real errors at construction or
//! load time.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("workflow '{0}' has no root step configured")]
    MissingRoot(String),

    #[error("malformed workflow '{workflow}': {message}")]
    Malformed { workflow: String, message: String },
}

#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("required field '{field}' of type '{declaring_type}' missing key '{key}'")]
    RequiredMissing {
        key: String,
        field: String,
        declaring_type: String,
    },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported resource scheme '{scheme}' for path '{path}' (external collaborator, not implemented by this crate)")]
    UnsupportedScheme { scheme: String, path: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("construction failed: {0}")]
    Construction(String),

    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("step execution failed: interrupted")]
    Interrupted,
}
