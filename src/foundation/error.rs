pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown preset '{id}'")]
    UnknownPreset { id: String },

    #[error("source decode error: {0}")]
    SourceDecode(String),

    #[error("lut load error: {0}")]
    LutLoad(String),

    #[error("context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn unknown_preset(id: impl Into<String>) -> Self {
        Self::UnknownPreset { id: id.into() }
    }

    pub fn source_decode(msg: impl Into<String>) -> Self {
        Self::SourceDecode(msg.into())
    }

    pub fn lut_load(msg: impl Into<String>) -> Self {
        Self::LutLoad(msg.into())
    }

    pub fn context_unavailable(msg: impl Into<String>) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
