use thiserror::Error;

pub mod actor;
pub mod ticket;

/// Error returned when parsing a domain enum from text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {expected}: `{got}`")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}
