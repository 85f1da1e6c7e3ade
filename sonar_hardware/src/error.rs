use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("echo timeout")]
    EchoTimeout,
    #[error("echo trace is empty")]
    EmptyTrace,
}

pub type Result<T> = std::result::Result<T, HwError>;
