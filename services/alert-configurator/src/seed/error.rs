use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV row {line} has an empty {column}")]
    EmptyField { line: usize, column: &'static str },
    #[error("duplicate app code {0:?} in CSV")]
    DuplicateAppCode(String),
}
