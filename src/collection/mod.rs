//! Collection stage: fan out over every post source and merge the results.

mod orchestrator;

pub use orchestrator::{
    CollectionBatch, CollectionOrchestrator, CollectorStats, SourceOutcome, SourceReport,
    SourceTally,
};
