use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Failed to write csv export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush csv export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exported csv was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
