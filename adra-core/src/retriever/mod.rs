//! Evidence retrieval: budgeted search over a document corpus.
//!
//! Three primitives share one per-subtask [`ToolBudget`]:
//! 1. **Keyword search**: term-overlap ranking admitted under a token budget
//! 2. **Semantic search**: same ranking, tagged `semantic`
//! 3. **Chunk read**: whole-document or section access by id
//!
//! `retrieve_for_subtask` combines them per [`RetrievalStrategy`], optionally refining the
//! query for a [`Domain`].

pub mod budget;
pub mod domain;
pub mod engine;
pub mod search;

pub use budget::ToolBudget;
pub use domain::{BiasMitigation, Domain};
pub use engine::{RetrievalStats, Retriever, SubtaskRetrieval};
pub use search::{RetrievalStrategy, SearchMethod};
