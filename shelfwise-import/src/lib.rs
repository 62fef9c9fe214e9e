//! Import reconciliation and batch persistence for the book catalog.
//!
//! This crate owns the import pipeline: normalizing and comparing titles,
//! classifying candidates against the catalog, writing confirmed decisions in
//! chunks with per-operation error accounting, and the direct bulk-add path.

pub mod batch;
pub mod bulk_add;
pub mod confirm;
pub mod error;
pub mod matching;
pub mod progress;
pub mod reconcile;
pub mod similarity;
pub mod suggest;

pub use batch::{
    BatchError, BatchOperationResult, BatchOptions, ChunkExecutor, ConfirmRequest,
    ConflictDecision, CreateDecision, DEFAULT_CHUNK_SIZE, LinkDecision, OpKind, PlannedOp,
    ReconciliationDecision, execute_decisions, plan_decisions,
};
pub use bulk_add::{BulkAddResult, bulk_add};
pub use confirm::{confirm_import, default_decisions, log_import, validate_request};
pub use error::ImportError;
pub use matching::{
    DEFAULT_FUZZY_THRESHOLD, TitleAuthor, find_duplicate, is_duplicate, is_exact_match,
    is_fuzzy_match,
};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use reconcile::{
    CatalogIndex, ConflictDetails, ImportPreview, MatchCategory, PreviewEntry, PreviewSummary,
    ReconcileOptions, classify_candidate, preview_import, reconcile, validate_candidates,
};
pub use similarity::{normalize, similarity, title_relevance};
pub use suggest::{AuthorSuggestion, MIN_SUGGESTION_SCORE, suggest_authors};
