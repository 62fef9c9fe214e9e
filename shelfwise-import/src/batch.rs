//! Chunked persistence of confirmed reconciliation decisions.
//!
//! Decisions are first planned into atomic [`WriteOp`]s, then executed in
//! fixed-size chunks. Each chunk is one transaction; a failing statement is
//! reported on its own, and a chunk that fails as a whole marks all of its
//! statements failed. Chunks that already committed stay committed.

use serde::{Deserialize, Serialize};
use shelfwise_catalog::types::NewBook;
use shelfwise_db::{Connection, OperationError, WriteOp};

use crate::progress::ImportProgress;

/// Default number of write operations per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Options controlling batch execution.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub chunk_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

// ── Decisions ───────────────────────────────────────────────────────────────

/// Link an existing catalog book to the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDecision {
    pub existing_book_id: String,
}

/// Create a new catalog book and link it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDecision {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub reading_level: Option<String>,
}

/// Resolve a reading-level conflict, optionally overwriting the stored level,
/// then link the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDecision {
    pub existing_book_id: String,
    #[serde(default)]
    pub update_reading_level: bool,
    #[serde(default)]
    pub new_reading_level: Option<String>,
}

/// A user-confirmed outcome for one import candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationDecision {
    Link(LinkDecision),
    Create(CreateDecision),
    ResolveConflict(ConflictDecision),
}

/// The confirm payload: one list per decision kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(default)]
    pub matched: Vec<LinkDecision>,
    #[serde(default)]
    pub new_books: Vec<CreateDecision>,
    #[serde(default)]
    pub conflicts: Vec<ConflictDecision>,
}

impl ConfirmRequest {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.new_books.is_empty() && self.conflicts.is_empty()
    }

    /// Flatten into decisions: links, then creations, then conflicts.
    pub fn decisions(&self) -> Vec<ReconciliationDecision> {
        let links = self.matched.iter().cloned().map(ReconciliationDecision::Link);
        let creates = self.new_books.iter().cloned().map(ReconciliationDecision::Create);
        let conflicts = self
            .conflicts
            .iter()
            .cloned()
            .map(ReconciliationDecision::ResolveConflict);
        links.chain(creates).chain(conflicts).collect()
    }
}

// ── Planning ────────────────────────────────────────────────────────────────

/// What a planned write counts toward when it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OpKind {
    /// Link an existing book (counts as linked).
    Link,
    /// Insert a new catalog book (counts as created).
    Create,
    /// Overwrite a reading level (counts as updated).
    Update,
    /// Link a book created in the same batch (not counted separately).
    LinkNew,
}

/// A write operation with its accounting metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOp {
    pub op: WriteOp,
    pub kind: OpKind,
    /// Identifies the decision in error reports: a book id or a title.
    pub key: String,
}

/// Translate decisions into atomic writes, in decision order.
///
/// New books get a fresh UUID here so the insert and its selection can be
/// planned together and land in different chunks if need be.
pub fn plan_decisions(organization_id: &str, decisions: &[ReconciliationDecision]) -> Vec<PlannedOp> {
    let mut plan = Vec::with_capacity(decisions.len() * 2);
    for decision in decisions {
        match decision {
            ReconciliationDecision::Link(link) => {
                plan.push(link_op(organization_id, &link.existing_book_id, OpKind::Link));
            }
            ReconciliationDecision::Create(create) => {
                let new_book = NewBook {
                    title: create.title.trim().to_string(),
                    author: clean(create.author.as_deref()),
                    reading_level: clean(create.reading_level.as_deref()),
                    ..Default::default()
                };
                plan.extend(create_ops(organization_id, new_book));
            }
            ReconciliationDecision::ResolveConflict(conflict) => {
                if conflict.update_reading_level {
                    plan.push(PlannedOp {
                        op: WriteOp::UpdateReadingLevel {
                            book_id: conflict.existing_book_id.clone(),
                            reading_level: clean(conflict.new_reading_level.as_deref()),
                        },
                        kind: OpKind::Update,
                        key: conflict.existing_book_id.clone(),
                    });
                }
                plan.push(link_op(organization_id, &conflict.existing_book_id, OpKind::Link));
            }
        }
    }
    plan
}

/// Insert a new book under a fresh id, then link it.
pub(crate) fn create_ops(organization_id: &str, new_book: NewBook) -> [PlannedOp; 2] {
    let id = uuid::Uuid::new_v4().to_string();
    let key = new_book.title.clone();
    let book = new_book.into_catalog_book(id.clone());
    [
        PlannedOp {
            op: WriteOp::InsertBook(book),
            kind: OpKind::Create,
            key: key.clone(),
        },
        PlannedOp {
            op: WriteOp::InsertSelection {
                organization_id: organization_id.to_string(),
                book_id: id,
            },
            kind: OpKind::LinkNew,
            key,
        },
    ]
}

fn link_op(organization_id: &str, book_id: &str, kind: OpKind) -> PlannedOp {
    PlannedOp {
        op: WriteOp::UpsertSelection {
            organization_id: organization_id.to_string(),
            book_id: book_id.to_string(),
        },
        kind,
        key: book_id.to_string(),
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ── Execution ───────────────────────────────────────────────────────────────

/// Something that can run a chunk of writes as one atomic group.
///
/// `Ok` carries one outcome per op, in order. `Err` means the whole chunk
/// failed and nothing in it persisted.
pub trait ChunkExecutor {
    fn execute_chunk(&self, ops: &[WriteOp]) -> Result<Vec<Result<(), OperationError>>, OperationError>;
}

impl ChunkExecutor for Connection {
    fn execute_chunk(&self, ops: &[WriteOp]) -> Result<Vec<Result<(), OperationError>>, OperationError> {
        shelfwise_db::execute_chunk(self, ops)
    }
}

/// One failed write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchError {
    #[serde(rename = "type")]
    pub kind: OpKind,
    pub key: String,
    pub error: String,
}

/// Outcome of a batch: success counters plus per-operation failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOperationResult {
    pub linked: usize,
    pub created: usize,
    pub updated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchError>,
    pub success: bool,
}

impl BatchOperationResult {
    fn record_success(&mut self, kind: OpKind) {
        match kind {
            OpKind::Link => self.linked += 1,
            OpKind::Create => self.created += 1,
            OpKind::Update => self.updated += 1,
            OpKind::LinkNew => {}
        }
    }

    fn record_failure(&mut self, planned: &PlannedOp, error: String) {
        log::warn!("{:?} '{}' failed: {}", planned.kind, planned.key, error);
        self.errors.push(BatchError {
            kind: planned.kind,
            key: planned.key.clone(),
            error,
        });
    }
}

/// Execute planned writes chunk by chunk.
///
/// Returns the aggregate result and one success flag per planned op.
pub(crate) fn run_plan(
    executor: &impl ChunkExecutor,
    plan: &[PlannedOp],
    options: &BatchOptions,
    progress: &dyn ImportProgress,
) -> (BatchOperationResult, Vec<bool>) {
    let chunk_size = options.chunk_size.max(1);
    let total_chunks = plan.len().div_ceil(chunk_size);
    let mut result = BatchOperationResult::default();
    let mut succeeded = Vec::with_capacity(plan.len());

    progress.on_phase(&format!(
        "Writing {} operations in {} chunks",
        plan.len(),
        total_chunks
    ));

    for (chunk_index, chunk) in plan.chunks(chunk_size).enumerate() {
        let ops: Vec<WriteOp> = chunk.iter().map(|p| p.op.clone()).collect();
        match executor.execute_chunk(&ops) {
            Ok(outcomes) => {
                let mut outcomes = outcomes.into_iter();
                for planned in chunk {
                    match outcomes.next() {
                        Some(Ok(())) => {
                            result.record_success(planned.kind);
                            succeeded.push(true);
                        }
                        Some(Err(e)) => {
                            result.record_failure(planned, e.to_string());
                            succeeded.push(false);
                        }
                        None => {
                            result.record_failure(planned, "no result reported for operation".into());
                            succeeded.push(false);
                        }
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                for planned in chunk {
                    result.record_failure(planned, message.clone());
                    succeeded.push(false);
                }
            }
        }
        progress.on_chunk(chunk_index + 1, total_chunks);
    }

    result.success = result.errors.is_empty();
    progress.on_complete(&format!(
        "Linked {}, created {}, updated {} ({} errors)",
        result.linked,
        result.created,
        result.updated,
        result.errors.len()
    ));
    (result, succeeded)
}

/// Plan and execute decisions for an organization.
pub fn execute_decisions(
    executor: &impl ChunkExecutor,
    organization_id: &str,
    decisions: &[ReconciliationDecision],
    options: &BatchOptions,
    progress: &dyn ImportProgress,
) -> BatchOperationResult {
    let plan = plan_decisions(organization_id, decisions);
    run_plan(executor, &plan, options, progress).0
}
