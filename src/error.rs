use std::io;

#[derive(thiserror::Error, Debug)]
pub enum LockError {
    #[error("ttl must be a positive duration within the timestamp range")]
    InvalidTtl,

    #[error("extend delta must be a positive duration")]
    InvalidDelta,

    #[error("extended expiry overflows the timestamp range")]
    ExpiryOverflow,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("{0}")]
    ReaperSpawn(#[from] io::Error),
}

impl PartialEq for LockError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTtl, Self::InvalidTtl)
            | (Self::InvalidDelta, Self::InvalidDelta)
            | (Self::ExpiryOverflow, Self::ExpiryOverflow)
            | (Self::ReaperSpawn(_), Self::ReaperSpawn(_)) => true,
            (Self::InvalidOptions(s1), Self::InvalidOptions(s2)) => s1.eq(s2),
            _ => false,
        }
    }
}
