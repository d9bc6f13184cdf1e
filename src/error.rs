pub type HeatmarkResult<T> = Result<T, HeatmarkError>;

#[derive(thiserror::Error, Debug)]
pub enum HeatmarkError {
    #[error("input error: {0}")]
    Input(String),

    #[error("input error: unsupported glyph {0:?}")]
    UnsupportedGlyph(char),

    #[error("input error: image must be exactly 7 pixels tall, got {height}")]
    InvalidImageShape { height: u32 },

    #[error(
        "history conflict: commits dated after {since} already exist; remove them (for example \
         with `git reset` or by starting from an empty repository) and run again"
    )]
    HistoryConflict { since: String },

    #[error("contribution source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("commit sink error: {0}")]
    Sink(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HeatmarkError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// True for the errors raised before any scheduling happens.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::UnsupportedGlyph(_) | Self::InvalidImageShape { .. }
        )
    }
}
