use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Tag identity errors
    #[error("Invalid tag identifier: {0}")]
    InvalidTagId(String),

    #[error("Invalid EPC text: {0}")]
    InvalidEpc(String),
}

pub type Result<T> = std::result::Result<T, Error>;
