/// Errors that can occur in the host-integration layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Settings store error: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("Settings encoding error: {0}")]
    SettingsEncoding(#[from] serde_json::Error),

    #[error("Position provider error: {0}")]
    Position(String),

    #[error("Feature source error: {0}")]
    FeatureSource(String),
}
