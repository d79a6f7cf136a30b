#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("Config store corrupt: {0}")]
    StoreCorrupt(String),

    #[error("Malformed address in {field}: {value}")]
    MalformedAddress { field: String, value: String },

    #[error("Malformed value in {field}: {value} ({reason})")]
    MalformedValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create directory: {0}")]
    DirectoryUnavailable(String),

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Serialization error: {0}")]
    SerializeError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfiguratorError {
    #[error("Config store error: {0}")]
    Store(#[from] ConfigStoreError),

    #[error("Failed to parse environment variables: {0}")]
    MalformedValue(String),

    #[error("Runtime config update task failed: {0}")]
    UpdateTaskError(String),
}
