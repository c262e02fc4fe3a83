use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SneakpeekError {
    ParseError(String),
    InvalidConfig(String),
}

impl Error for SneakpeekError {}

impl fmt::Display for SneakpeekError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SneakpeekError::ParseError(msg) => write!(fmt, "{}", msg),
            SneakpeekError::InvalidConfig(msg) => write!(fmt, "invalid configuration: {}", msg),
        }
    }
}
