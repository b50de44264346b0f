//! In-memory store used by tests.
//!
//! One `RwLock` guards all tables, which makes the status compare-and-set a
//! single critical section. `principal_lookups` counts profile fetches so the
//! session layer's single-flight behaviour can be asserted, and
//! `principal_delay` widens the race window for concurrency tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;

use formline_models::categories::{Category, CategoryAssignment, Column, ColumnType};
use formline_models::hierarchy::{Ancestors, EntityStatus, Region, School, Sector};
use formline_models::ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId, UserId};
use formline_models::roles::{Principal, Role};
use formline_models::submissions::{Submission, SubmissionKey, SubmissionStatus};

use super::{
    CategoryStore, HierarchyStore, PrincipalStore, QueueFilter, QueueRow, ScopeFilter,
    StatusWrite, StoreError, StoreFuture, SubmissionStore,
};

#[derive(Default)]
struct Tables {
    regions: HashMap<RegionId, Region>,
    sectors: HashMap<SectorId, Sector>,
    schools: HashMap<SchoolId, School>,
    categories: HashMap<CategoryId, Category>,
    columns: HashMap<ColumnId, Column>,
    principals: HashMap<UserId, Principal>,
    submissions: HashMap<SubmissionKey, Submission>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    principal_lookups: AtomicUsize,
    principal_delay: RwLock<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&self, name: &str) -> Region {
        let now = Utc::now();
        let region = Region {
            id: RegionId::new(),
            name: name.to_string(),
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .regions
            .insert(region.id, region.clone());
        region
    }

    pub fn add_sector(&self, name: &str, region_id: RegionId) -> Sector {
        let now = Utc::now();
        let sector = Sector {
            id: SectorId::new(),
            name: name.to_string(),
            region_id,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .sectors
            .insert(sector.id, sector.clone());
        sector
    }

    pub fn add_school(&self, name: &str, sector_id: SectorId) -> School {
        let now = Utc::now();
        let school = School {
            id: SchoolId::new(),
            name: name.to_string(),
            sector_id,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .schools
            .insert(school.id, school.clone());
        school
    }

    pub fn add_category(&self, name: &str, assignment: CategoryAssignment) -> Category {
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(),
            name: name.to_string(),
            description: None,
            assignment,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .categories
            .insert(category.id, category.clone());
        category
    }

    pub fn add_column(
        &self,
        category_id: CategoryId,
        name: &str,
        column_type: ColumnType,
        required: bool,
    ) -> Column {
        let now = Utc::now();
        let column = Column {
            id: ColumnId::new(),
            category_id,
            name: name.to_string(),
            column_type,
            required,
            max_length: None,
            min_value: None,
            max_value: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .columns
            .insert(column.id, column.clone());
        column
    }

    pub fn add_principal(&self, email: &str, role: Role) -> Principal {
        let principal = Principal::new(UserId::new(), email, role);
        self.tables
            .write()
            .unwrap()
            .principals
            .insert(principal.id, principal.clone());
        principal
    }

    /// Seed a submission directly in a given status, bypassing the state
    /// machine. Test setup only.
    pub fn seed_submission(
        &self,
        key: SubmissionKey,
        status: SubmissionStatus,
        values: Vec<(ColumnId, &str)>,
    ) -> Submission {
        let now = Utc::now();
        let submission = Submission {
            key,
            status,
            values: values
                .into_iter()
                .map(|(id, v)| (id, v.to_string()))
                .collect(),
            rejection_reason: None,
            submitted_at: match status {
                SubmissionStatus::Draft => None,
                _ => Some(now),
            },
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .unwrap()
            .submissions
            .insert(key, submission.clone());
        submission
    }

    /// Number of `principal()` lookups that reached the store.
    pub fn principal_lookup_count(&self) -> usize {
        self.principal_lookups.load(Ordering::SeqCst)
    }

    /// Make `principal()` sleep before answering, to widen race windows.
    pub fn set_principal_delay(&self, delay: Duration) {
        *self.principal_delay.write().unwrap() = Some(delay);
    }

    fn ancestors_of(tables: &Tables, school_id: SchoolId) -> Option<Ancestors> {
        let school = tables.schools.get(&school_id)?;
        let sector = tables.sectors.get(&school.sector_id)?;
        tables.regions.get(&sector.region_id)?;
        Some(Ancestors {
            sector_id: sector.id,
            region_id: sector.region_id,
        })
    }
}

impl HierarchyStore for MemoryStore {
    fn region<'a>(&'a self, id: RegionId) -> StoreFuture<'a, Option<Region>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().regions.get(&id).cloned()) })
    }

    fn regions<'a>(&'a self) -> StoreFuture<'a, Vec<Region>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut regions: Vec<_> = tables.regions.values().cloned().collect();
            regions.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(regions)
        })
    }

    fn sector<'a>(&'a self, id: SectorId) -> StoreFuture<'a, Option<Sector>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().sectors.get(&id).cloned()) })
    }

    fn sectors<'a>(&'a self, region_id: Option<RegionId>) -> StoreFuture<'a, Vec<Sector>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut sectors: Vec<_> = tables
                .sectors
                .values()
                .filter(|s| region_id.is_none_or(|r| s.region_id == r))
                .cloned()
                .collect();
            sectors.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(sectors)
        })
    }

    fn school<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<School>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().schools.get(&id).cloned()) })
    }

    fn schools<'a>(&'a self, sector_id: Option<SectorId>) -> StoreFuture<'a, Vec<School>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut schools: Vec<_> = tables
                .schools
                .values()
                .filter(|s| sector_id.is_none_or(|sec| s.sector_id == sec))
                .cloned()
                .collect();
            schools.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(schools)
        })
    }

    fn school_ancestors<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<Ancestors>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            Ok(Self::ancestors_of(&tables, id))
        })
    }
}

impl CategoryStore for MemoryStore {
    fn categories<'a>(&'a self) -> StoreFuture<'a, Vec<Category>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut categories: Vec<_> = tables.categories.values().cloned().collect();
            categories.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(categories)
        })
    }

    fn category<'a>(&'a self, id: CategoryId) -> StoreFuture<'a, Option<Category>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().categories.get(&id).cloned()) })
    }

    fn column<'a>(&'a self, id: ColumnId) -> StoreFuture<'a, Option<Column>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().columns.get(&id).cloned()) })
    }

    fn columns<'a>(&'a self, category_id: CategoryId) -> StoreFuture<'a, Vec<Column>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut columns: Vec<_> = tables
                .columns
                .values()
                .filter(|c| c.category_id == category_id)
                .cloned()
                .collect();
            columns.sort_by_key(|c| c.created_at);
            Ok(columns)
        })
    }

    fn insert_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .categories
                .insert(category.id, category.clone());
            Ok(category)
        })
    }

    fn update_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            match tables.categories.get_mut(&category.id) {
                Some(existing) => {
                    existing.name = category.name.clone();
                    existing.description = category.description.clone();
                    existing.assignment = category.assignment;
                    existing.status = category.status;
                    existing.updated_at = Utc::now();
                    Ok(existing.clone())
                }
                None => Err(StoreError(anyhow::anyhow!(
                    "category {} does not exist",
                    category.id
                ))),
            }
        })
    }

    fn insert_column<'a>(&'a self, column: Column) -> StoreFuture<'a, Column> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .columns
                .insert(column.id, column.clone());
            Ok(column)
        })
    }
}

impl SubmissionStore for MemoryStore {
    fn submission<'a>(&'a self, key: SubmissionKey) -> StoreFuture<'a, Option<Submission>> {
        Box::pin(async move { Ok(self.tables.read().unwrap().submissions.get(&key).cloned()) })
    }

    fn upsert_value<'a>(
        &'a self,
        key: SubmissionKey,
        column_id: ColumnId,
        value: String,
    ) -> StoreFuture<'a, Submission> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let now = Utc::now();
            let submission = tables.submissions.entry(key).or_insert_with(|| Submission {
                key,
                status: SubmissionStatus::Draft,
                values: HashMap::new(),
                rejection_reason: None,
                submitted_at: None,
                created_at: now,
                updated_at: now,
            });
            submission.values.insert(column_id, value);
            submission.updated_at = now;
            Ok(submission.clone())
        })
    }

    fn write_status<'a>(
        &'a self,
        key: SubmissionKey,
        from: SubmissionStatus,
        to: SubmissionStatus,
        reason: Option<String>,
    ) -> StoreFuture<'a, StatusWrite> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            match tables.submissions.get_mut(&key) {
                Some(submission) if submission.status == from => {
                    submission.status = to;
                    submission.rejection_reason = reason;
                    if to == SubmissionStatus::Pending {
                        submission.submitted_at = Some(Utc::now());
                    }
                    submission.updated_at = Utc::now();
                    Ok(StatusWrite::Applied)
                }
                Some(_) => Ok(StatusWrite::Conflict),
                None => Ok(StatusWrite::Conflict),
            }
        })
    }

    fn list<'a>(
        &'a self,
        scope: ScopeFilter,
        filter: QueueFilter,
    ) -> StoreFuture<'a, Vec<QueueRow>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut rows = Vec::new();

            for submission in tables.submissions.values() {
                let key = submission.key;
                let Some(school) = tables.schools.get(&key.school_id) else {
                    continue;
                };
                let Some(category) = tables.categories.get(&key.category_id) else {
                    continue;
                };

                let in_scope = match scope {
                    ScopeFilter::All => true,
                    ScopeFilter::Region(region_id) => {
                        Self::ancestors_of(&tables, key.school_id)
                            .is_some_and(|a| a.region_id == region_id)
                    }
                    ScopeFilter::Sector(sector_id) => school.sector_id == sector_id,
                    ScopeFilter::School(school_id) => key.school_id == school_id,
                };
                if !in_scope {
                    continue;
                }

                if filter.status.is_some_and(|s| s != submission.status) {
                    continue;
                }
                if filter.category_id.is_some_and(|c| c != key.category_id) {
                    continue;
                }
                if filter.school_id.is_some_and(|s| s != key.school_id) {
                    continue;
                }

                let required: Vec<_> = tables
                    .columns
                    .values()
                    .filter(|c| c.category_id == key.category_id && c.required)
                    .collect();
                let filled = required
                    .iter()
                    .filter(|c| {
                        submission
                            .values
                            .get(&c.id)
                            .is_some_and(|v| !v.trim().is_empty())
                    })
                    .count();

                rows.push((
                    submission.submitted_at.unwrap_or(submission.created_at),
                    QueueRow {
                        school_id: key.school_id,
                        category_id: key.category_id,
                        school_name: school.name.clone(),
                        category_name: category.name.clone(),
                        status: submission.status,
                        required_total: required.len() as i64,
                        required_filled: filled as i64,
                        submitted_at: submission.submitted_at,
                        updated_at: submission.updated_at,
                    },
                ));
            }

            rows.sort_by_key(|(ts, _)| *ts);
            Ok(rows.into_iter().map(|(_, row)| row).collect())
        })
    }
}

impl PrincipalStore for MemoryStore {
    fn principal<'a>(&'a self, id: UserId) -> StoreFuture<'a, Option<Principal>> {
        Box::pin(async move {
            let delay = *self.principal_delay.read().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.principal_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.tables.read().unwrap().principals.get(&id).cloned())
        })
    }
}
