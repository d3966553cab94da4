use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("failed to load questions: {0}")]
    TransientFetch(String),

    #[error("update rejected: {0}")]
    WriteRejected(String),

    #[error("remote operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("invalid difficulty '{0}'")]
    InvalidDifficulty(String),

    #[error("invalid sort field '{0}'")]
    InvalidSortField(String),

    #[error("invalid sort order '{0}'")]
    InvalidSortOrder(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("invalid view key '{0}': expected company/bucket")]
    InvalidViewKey(String),

    #[error("nothing to update: pass --solved, --unsolved or --difficulty")]
    NothingToUpdate,

    #[error("questions not on page {page}: {ids}")]
    NotOnPage { page: u32, ids: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl TrackerError {
    pub fn invalid_difficulty(s: String) -> Self {
        TrackerError::InvalidDifficulty(s)
    }

    pub fn invalid_sort_field(s: String) -> Self {
        TrackerError::InvalidSortField(s)
    }

    pub fn invalid_sort_order(s: String) -> Self {
        TrackerError::InvalidSortOrder(s)
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
