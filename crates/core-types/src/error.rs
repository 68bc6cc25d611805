use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Duplicate record id '{id}' in dataset '{dataset}'")]
    DuplicateId { dataset: String, id: String },
}
