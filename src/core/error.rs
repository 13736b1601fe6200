use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RowfileError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Corrupt table data: {0}")]
    CorruptData(String),
    #[error("Constraint violation: {0}")]
    ConstraintError(String),
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

impl From<std::io::Error> for RowfileError {
    fn from(err: std::io::Error) -> Self {
        RowfileError::IoError(err.to_string())
    }
}
