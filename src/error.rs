use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubemuxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Metadata fetch error: {0}")]
    MetadataFetch(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required tool not available: {0}")]
    DependencyMissing(String),
}

impl TubemuxError {
    /// Raw underlying message, without the category prefix.
    pub fn details(&self) -> String {
        match self {
            TubemuxError::Io(e) => e.to_string(),
            TubemuxError::Toml(e) => e.to_string(),
            TubemuxError::Validation(msg)
            | TubemuxError::MetadataFetch(msg)
            | TubemuxError::Stream(msg)
            | TubemuxError::Transcode(msg)
            | TubemuxError::Config(msg)
            | TubemuxError::DependencyMissing(msg) => msg.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TubemuxError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, TubemuxError>;
