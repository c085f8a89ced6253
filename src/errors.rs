use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Buffer holds {available} bytes, but {needed} bytes are required.")]
    BufferTooShort { needed: usize, available: usize },
    #[error("Candidate declares {declared} categorical thresholds, but holds {actual}.")]
    CategoricalCountMismatch { declared: usize, actual: usize },
    #[error("Candidate has {count} categorical thresholds, the maximum is {max}.")]
    TooManyCategories { count: usize, max: usize },
    #[error("Encoding {categories} categorical thresholds overflows the addressable buffer size.")]
    SizeOverflow { categories: usize },
    #[error("Expected {expected} slots, found {found}.")]
    SlotCountMismatch { expected: usize, found: usize },
    #[error("Unable to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}
