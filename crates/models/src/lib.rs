pub mod errors;
pub mod prize;

pub use prize::{Prize, PrizeInput, PrizeUpdate, StatusFilter, PLACEHOLDER_IMAGE};
