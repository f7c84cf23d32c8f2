use crate::ingest::RowProblem;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unparseable date: {0}")]
    InvalidDate(String),
    #[error("date range start {start} is after end {end}")]
    InvertedRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("identity token is not a three-part JWT")]
    MalformedToken,
    #[error("failed to decode identity token payload: {0}")]
    TokenPayloadDecode(base64::DecodeError),
    #[error("failed to parse identity token claims: {0}")]
    TokenClaims(serde_json::Error),

    #[error("batch is not a JSON array of objects: {0}")]
    BatchNotArray(serde_json::Error),
    #[error("batch is empty")]
    EmptyBatch,
    #[error("batch rejected: {} of {total} rows failed checks", problems.len())]
    BatchRejected {
        total: usize,
        problems: Vec<RowProblem>,
    },

    #[error("text error: {0}")]
    Text(#[from] healthtrends_types::TextError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
