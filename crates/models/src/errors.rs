use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A required field is absent or empty.
    #[error("Missing required fields")]
    MissingFields,
    #[error("Required stamps must be between {min} and {max}")]
    StampsOutOfRange { min: i64, max: i64 },
}
