use thiserror::Error;

/// Failures raised by `OrderBook` operations. These never indicate
/// "nothing happened" — absence (unknown order id on cancel, empty book
/// on best_bid) is expressed with `bool`/`Option`, not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("order {0} already rests on this book")]
    DuplicateOrderId(u64),
    #[error("invalid order: {0}")]
    InvalidOrder(&'static str),
    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}

/// Failures raised by the engine-wide dispatch layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Book(#[from] BookError),
    #[error("engine has been shut down")]
    Shutdown,
}
