use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid thread url: {0}")]
    InvalidUrl(String),
    #[error("unsupported site: {host}")]
    UnsupportedSite { host: String },
    #[error("thread url is missing its {segment} path segment")]
    MissingPathSegment { segment: &'static str },
}
