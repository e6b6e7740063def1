use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found")]
    NotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Insufficient stock or a reservation race lost to a concurrent buyer.
    #[error("{0}")]
    Conflict(String),
    #[error("no items could be booked")]
    NothingBooked,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// The 409 message for the reservation endpoint, naming available vs
    /// requested stock.
    pub fn insufficient_stock(available: i32, requested: i32) -> Self {
        DomainError::Conflict(format!(
            "Insufficient quantity. Available: {}, Requested: {}",
            available, requested
        ))
    }
}
