use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to parse data source row: {0}")]
    Malformed(#[from] csv::Error),
}
