use std::path::PathBuf;

use crate::{
    canvas::MAX_LETTER_SPACING,
    contributions::DEFAULT_CONTRIBUTIONS_URL,
    dates::validate_year,
    error::{HeatmarkError, HeatmarkResult},
    schedule::CommitCounts,
};

pub const DEFAULT_LETTER_SPACING: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    Image(PathBuf),
}

impl InputSource {
    /// Exactly one of `text` and `image` must be given. Empty strings count as absent.
    pub fn from_options(text: Option<String>, image: Option<PathBuf>) -> HeatmarkResult<Self> {
        let text = text.filter(|t| !t.is_empty());
        let image = image.filter(|p| !p.as_os_str().is_empty());
        match (text, image) {
            (Some(text), None) => Ok(Self::Text(text)),
            (None, Some(path)) => Ok(Self::Image(path)),
            (None, None) => Err(HeatmarkError::input(
                "either a text or an image path is required",
            )),
            (Some(_), Some(_)) => Err(HeatmarkError::input(
                "text and image path are mutually exclusive",
            )),
        }
    }
}

/// Everything one run needs. Built once at the edge and handed to [`crate::pipeline::run`].
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: InputSource,
    pub counts: CommitCounts,
    pub spacing: usize,
    /// `None` paints the rolling window ending today.
    pub year: Option<i32>,
    /// Account whose existing contributions are subtracted from the targets.
    pub user: Option<String>,
    pub dry_run: bool,
    pub repo: PathBuf,
    pub contributions_url: String,
}

impl RunConfig {
    pub fn new(input: InputSource) -> Self {
        Self {
            input,
            counts: CommitCounts::default(),
            spacing: DEFAULT_LETTER_SPACING,
            year: None,
            user: None,
            dry_run: false,
            repo: PathBuf::from("."),
            contributions_url: DEFAULT_CONTRIBUTIONS_URL.to_string(),
        }
    }

    pub fn validate(&self) -> HeatmarkResult<()> {
        if self.spacing > MAX_LETTER_SPACING {
            return Err(HeatmarkError::input(format!(
                "space between letters must be within 0..={MAX_LETTER_SPACING}, got {}",
                self.spacing
            )));
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(user) = &self.user
            && (user.is_empty() || user.contains(['/', '?', '#', ' ']))
        {
            return Err(HeatmarkError::input(format!("invalid user name {user:?}")));
        }
        if self.counts.min > self.counts.max {
            tracing::warn!(
                min = self.counts.min,
                max = self.counts.max,
                "min commits exceed max commits; filled cells will be lighter than empty ones"
            );
        }
        Ok(())
    }
}
