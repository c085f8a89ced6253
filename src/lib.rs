pub mod candidate;
pub mod codec;
pub mod config;
pub mod data;
pub mod errors;
pub mod order;
pub mod reduced;
pub mod sync;

pub use candidate::SplitCandidate;
pub use config::SyncConfig;
pub use errors::SplitError;
pub use reduced::ReducedSplitCandidate;
pub use sync::SplitSync;
