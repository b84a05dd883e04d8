use thiserror::Error;

#[derive(Error, Debug)]
pub enum GainsError {
    #[error("Invalid report payload: {0}")]
    InvalidReport(String),

    #[error("Invalid price data: {0}")]
    InvalidPrice(String),
}
