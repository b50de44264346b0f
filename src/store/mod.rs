//! Store abstraction layer.
//!
//! The persistence engine is an external collaborator: this module names the
//! query/RPC contracts the core depends on, and keeps them dyn-compatible so
//! the services can run against Postgres in production and an in-memory
//! implementation in tests.
//!
//! The one contract with teeth is [`SubmissionStore::write_status`]: it is a
//! compare-and-set on the submission status. Two concurrent approvers racing
//! on the same submission get exactly one `Applied`; the loser sees
//! [`StatusWrite::Conflict`] and must not overwrite.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use formline_models::categories::{Category, Column};
use formline_models::hierarchy::{Ancestors, Region, School, Sector};
use formline_models::ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId, UserId};
use formline_models::roles::Principal;
use formline_models::submissions::{Submission, SubmissionKey, SubmissionStatus};

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use postgres::PgStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

/// Boxed future alias used by all store traits to stay object-safe.
pub type StoreFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Infrastructure failure inside a store backend.
///
/// Deliberately distinct from "not found" (lookups return `Option`) and from
/// access denial (never represented at this layer), so callers can tell
/// "could not determine" apart from "not allowed".
#[derive(Debug)]
pub struct StoreError(pub anyhow::Error);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

// Not a std::error::Error: the explicit conversions below carry it into the
// workflow and HTTP error types without tripping the blanket anyhow route.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.into())
    }
}

impl From<StoreError> for formline_core::WorkflowError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.0)
    }
}

impl From<StoreError> for formline_core::AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err.0)
    }
}

/// Outcome of a compare-and-set status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    /// The stored status matched `from` and was replaced by `to`.
    Applied,
    /// The stored status no longer matched `from`; nothing was written.
    Conflict,
}

/// Scope restriction applied to submission listings, derived from the
/// caller's role before the query runs so invisible rows never leave the
/// store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    All,
    Region(RegionId),
    Sector(SectorId),
    School(SchoolId),
}

/// Caller-requested filters on top of the scope restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueFilter {
    pub status: Option<SubmissionStatus>,
    pub category_id: Option<CategoryId>,
    pub school_id: Option<SchoolId>,
}

/// One row of a queue listing, with the counts needed to derive the
/// completion percentage without fetching every value.
#[derive(Debug, Clone)]
pub struct QueueRow {
    pub school_id: SchoolId,
    pub category_id: CategoryId,
    pub school_name: String,
    pub category_name: String,
    pub status: SubmissionStatus,
    pub required_total: i64,
    pub required_filled: i64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl QueueRow {
    pub fn key(&self) -> SubmissionKey {
        SubmissionKey::new(self.school_id, self.category_id)
    }
}

/// Read-only hierarchy lookups.
pub trait HierarchyStore: Send + Sync {
    fn region<'a>(&'a self, id: RegionId) -> StoreFuture<'a, Option<Region>>;

    fn regions<'a>(&'a self) -> StoreFuture<'a, Vec<Region>>;

    fn sector<'a>(&'a self, id: SectorId) -> StoreFuture<'a, Option<Sector>>;

    fn sectors<'a>(&'a self, region_id: Option<RegionId>) -> StoreFuture<'a, Vec<Sector>>;

    fn school<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<School>>;

    fn schools<'a>(&'a self, sector_id: Option<SectorId>) -> StoreFuture<'a, Vec<School>>;

    /// Resolve the sector and region above a school. `None` when the school
    /// or any ancestor link is missing.
    fn school_ancestors<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<Ancestors>>;
}

/// Category and column schema lookups and management writes.
pub trait CategoryStore: Send + Sync {
    fn categories<'a>(&'a self) -> StoreFuture<'a, Vec<Category>>;

    fn category<'a>(&'a self, id: CategoryId) -> StoreFuture<'a, Option<Category>>;

    fn column<'a>(&'a self, id: ColumnId) -> StoreFuture<'a, Option<Column>>;

    fn columns<'a>(&'a self, category_id: CategoryId) -> StoreFuture<'a, Vec<Column>>;

    fn insert_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category>;

    fn update_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category>;

    fn insert_column<'a>(&'a self, column: Column) -> StoreFuture<'a, Column>;
}

/// Submission reads and the two write paths the state machine owns.
pub trait SubmissionStore: Send + Sync {
    fn submission<'a>(&'a self, key: SubmissionKey) -> StoreFuture<'a, Option<Submission>>;

    /// Write one column value, creating the submission in `Draft` on the
    /// first write. Guards (status editability, authorization) belong to the
    /// state machine, not the store.
    fn upsert_value<'a>(
        &'a self,
        key: SubmissionKey,
        column_id: ColumnId,
        value: String,
    ) -> StoreFuture<'a, Submission>;

    /// Compare-and-set the status: applied only if the stored status still
    /// equals `from`. `reason` replaces the stored rejection reason (pass
    /// `None` to clear it). `submitted_at` is stamped when `to` is Pending.
    fn write_status<'a>(
        &'a self,
        key: SubmissionKey,
        from: SubmissionStatus,
        to: SubmissionStatus,
        reason: Option<String>,
    ) -> StoreFuture<'a, StatusWrite>;

    /// List submissions inside `scope`, narrowed by `filter`, ordered by
    /// submission timestamp ascending (creation time for drafts).
    fn list<'a>(
        &'a self,
        scope: ScopeFilter,
        filter: QueueFilter,
    ) -> StoreFuture<'a, Vec<QueueRow>>;
}

/// Principal profile lookups for the session layer.
pub trait PrincipalStore: Send + Sync {
    fn principal<'a>(&'a self, id: UserId) -> StoreFuture<'a, Option<Principal>>;
}
