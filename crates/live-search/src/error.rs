use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiveSearchError {
    #[error("The search worker has shut down.")]
    Closed,
    #[error("Search generation {generation} was cancelled before it ran.")]
    Cancelled { generation: u64 },
}
