pub mod batch;
pub mod extract;
pub mod scoring;
pub mod settings;
pub mod utils;

pub use batch::{
    evaluate_batch, rank_candidates, Batch, BatchError, BatchOptions, JobContext, SourceDocument,
};
pub use extract::{PlainTextExtractor, TextExtractor};
