pub type StripResult<T> = Result<T, StripError>;

#[derive(thiserror::Error, Debug)]
pub enum StripError {
    #[error("missing asset: '{key}'")]
    MissingAsset { key: String },

    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    pub fn missing_asset(key: impl Into<String>) -> Self {
        Self::MissingAsset { key: key.into() }
    }

    pub fn font_unavailable(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
