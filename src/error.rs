use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("key not found in cache")]
    KeyNotFound,

    #[error("fingerprints are not comparable ({left} bits vs {right} bits)")]
    IncomparableFingerprints { left: u32, right: u32 },
}
