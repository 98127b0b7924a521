use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
    #[error("Platform rejected the request with status {0}")]
    Rejected(u16),
}

pub type Result<T> = core::result::Result<T, TransportError>;
