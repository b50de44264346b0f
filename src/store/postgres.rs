//! Postgres implementation of the store contracts.
//!
//! Plain `query`/`query_as` strings throughout; the status compare-and-set
//! rides on `rows_affected` of a conditional UPDATE.

use std::collections::HashMap;

use sqlx::{PgPool, Row};
use tracing::error;
use uuid::Uuid;

use formline_models::categories::{Category, Column};
use formline_models::hierarchy::{Ancestors, Region, School, Sector};
use formline_models::ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId, UserId};
use formline_models::roles::{Principal, Role};
use formline_models::submissions::{Submission, SubmissionKey, SubmissionStatus};

use super::{
    CategoryStore, HierarchyStore, PrincipalStore, QueueFilter, QueueRow, ScopeFilter,
    StatusWrite, StoreError, StoreFuture, SubmissionStore,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn values_for(
        &self,
        key: SubmissionKey,
    ) -> Result<HashMap<ColumnId, String>, StoreError> {
        let rows = sqlx::query(
            "SELECT column_id, value FROM submission_values
             WHERE school_id = $1 AND category_id = $2",
        )
        .bind(key.school_id)
        .bind(key.category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(submission = %key, error = %e, "Database error fetching submission values");
            StoreError::from(e)
        })?;

        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            let column_id: ColumnId = row.try_get("column_id").map_err(StoreError::from)?;
            let value: String = row.try_get("value").map_err(StoreError::from)?;
            values.insert(column_id, value);
        }
        Ok(values)
    }

    async fn submission_row(
        &self,
        key: SubmissionKey,
    ) -> Result<Option<Submission>, StoreError> {
        let row = sqlx::query(
            "SELECT status, rejection_reason, submitted_at, created_at, updated_at
             FROM submissions WHERE school_id = $1 AND category_id = $2",
        )
        .bind(key.school_id)
        .bind(key.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(submission = %key, error = %e, "Database error fetching submission");
            StoreError::from(e)
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let values = self.values_for(key).await?;

        Ok(Some(Submission {
            key,
            status: row.try_get("status").map_err(StoreError::from)?,
            values,
            rejection_reason: row
                .try_get("rejection_reason")
                .map_err(StoreError::from)?,
            submitted_at: row.try_get("submitted_at").map_err(StoreError::from)?,
            created_at: row.try_get("created_at").map_err(StoreError::from)?,
            updated_at: row.try_get("updated_at").map_err(StoreError::from)?,
        }))
    }
}

impl HierarchyStore for PgStore {
    fn region<'a>(&'a self, id: RegionId) -> StoreFuture<'a, Option<Region>> {
        Box::pin(async move {
            sqlx::query_as::<_, Region>(
                "SELECT id, name, status, created_at, updated_at FROM regions WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(region.id = %id, error = %e, "Database error fetching region");
                StoreError::from(e)
            })
        })
    }

    fn regions<'a>(&'a self) -> StoreFuture<'a, Vec<Region>> {
        Box::pin(async move {
            sqlx::query_as::<_, Region>(
                "SELECT id, name, status, created_at, updated_at FROM regions ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching regions");
                StoreError::from(e)
            })
        })
    }

    fn sector<'a>(&'a self, id: SectorId) -> StoreFuture<'a, Option<Sector>> {
        Box::pin(async move {
            sqlx::query_as::<_, Sector>(
                "SELECT id, name, region_id, status, created_at, updated_at
                 FROM sectors WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(sector.id = %id, error = %e, "Database error fetching sector");
                StoreError::from(e)
            })
        })
    }

    fn sectors<'a>(&'a self, region_id: Option<RegionId>) -> StoreFuture<'a, Vec<Sector>> {
        Box::pin(async move {
            let mut query = String::from(
                "SELECT id, name, region_id, status, created_at, updated_at FROM sectors",
            );
            if region_id.is_some() {
                query.push_str(" WHERE region_id = $1");
            }
            query.push_str(" ORDER BY name");

            let mut sql = sqlx::query_as::<_, Sector>(&query);
            if let Some(region_id) = region_id {
                sql = sql.bind(region_id);
            }
            sql.fetch_all(&self.pool).await.map_err(|e| {
                error!(error = %e, "Database error fetching sectors");
                StoreError::from(e)
            })
        })
    }

    fn school<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<School>> {
        Box::pin(async move {
            sqlx::query_as::<_, School>(
                "SELECT id, name, sector_id, status, created_at, updated_at
                 FROM schools WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(school.id = %id, error = %e, "Database error fetching school");
                StoreError::from(e)
            })
        })
    }

    fn schools<'a>(&'a self, sector_id: Option<SectorId>) -> StoreFuture<'a, Vec<School>> {
        Box::pin(async move {
            let mut query = String::from(
                "SELECT id, name, sector_id, status, created_at, updated_at FROM schools",
            );
            if sector_id.is_some() {
                query.push_str(" WHERE sector_id = $1");
            }
            query.push_str(" ORDER BY name");

            let mut sql = sqlx::query_as::<_, School>(&query);
            if let Some(sector_id) = sector_id {
                sql = sql.bind(sector_id);
            }
            sql.fetch_all(&self.pool).await.map_err(|e| {
                error!(error = %e, "Database error fetching schools");
                StoreError::from(e)
            })
        })
    }

    fn school_ancestors<'a>(&'a self, id: SchoolId) -> StoreFuture<'a, Option<Ancestors>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT sec.id AS sector_id, sec.region_id
                 FROM schools sch
                 INNER JOIN sectors sec ON sec.id = sch.sector_id
                 INNER JOIN regions reg ON reg.id = sec.region_id
                 WHERE sch.id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(school.id = %id, error = %e, "Database error resolving ancestors");
                StoreError::from(e)
            })?;

            match row {
                Some(row) => Ok(Some(Ancestors {
                    sector_id: row.try_get("sector_id").map_err(StoreError::from)?,
                    region_id: row.try_get("region_id").map_err(StoreError::from)?,
                })),
                None => Ok(None),
            }
        })
    }
}

impl CategoryStore for PgStore {
    fn categories<'a>(&'a self) -> StoreFuture<'a, Vec<Category>> {
        Box::pin(async move {
            sqlx::query_as::<_, Category>(
                "SELECT id, name, description, assignment, status, created_at, updated_at
                 FROM categories ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching categories");
                StoreError::from(e)
            })
        })
    }

    fn category<'a>(&'a self, id: CategoryId) -> StoreFuture<'a, Option<Category>> {
        Box::pin(async move {
            sqlx::query_as::<_, Category>(
                "SELECT id, name, description, assignment, status, created_at, updated_at
                 FROM categories WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(category.id = %id, error = %e, "Database error fetching category");
                StoreError::from(e)
            })
        })
    }

    fn column<'a>(&'a self, id: ColumnId) -> StoreFuture<'a, Option<Column>> {
        Box::pin(async move {
            sqlx::query_as::<_, Column>(
                "SELECT id, category_id, name, column_type, required, max_length,
                        min_value, max_value, created_at, updated_at
                 FROM columns WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(column.id = %id, error = %e, "Database error fetching column");
                StoreError::from(e)
            })
        })
    }

    fn columns<'a>(&'a self, category_id: CategoryId) -> StoreFuture<'a, Vec<Column>> {
        Box::pin(async move {
            sqlx::query_as::<_, Column>(
                "SELECT id, category_id, name, column_type, required, max_length,
                        min_value, max_value, created_at, updated_at
                 FROM columns WHERE category_id = $1 ORDER BY created_at",
            )
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(category.id = %category_id, error = %e, "Database error fetching columns");
                StoreError::from(e)
            })
        })
    }

    fn insert_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category> {
        Box::pin(async move {
            sqlx::query_as::<_, Category>(
                "INSERT INTO categories (id, name, description, assignment, status, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id, name, description, assignment, status, created_at, updated_at",
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.assignment)
            .bind(category.status)
            .bind(category.created_at)
            .bind(category.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(category.name = %category.name, error = %e, "Database error creating category");
                StoreError::from(e)
            })
        })
    }

    fn update_category<'a>(&'a self, category: Category) -> StoreFuture<'a, Category> {
        Box::pin(async move {
            sqlx::query_as::<_, Category>(
                "UPDATE categories
                 SET name = $2, description = $3, assignment = $4, status = $5, updated_at = NOW()
                 WHERE id = $1
                 RETURNING id, name, description, assignment, status, created_at, updated_at",
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.assignment)
            .bind(category.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(category.id = %category.id, error = %e, "Database error updating category");
                StoreError::from(e)
            })
        })
    }

    fn insert_column<'a>(&'a self, column: Column) -> StoreFuture<'a, Column> {
        Box::pin(async move {
            sqlx::query_as::<_, Column>(
                "INSERT INTO columns (id, category_id, name, column_type, required,
                                      max_length, min_value, max_value, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 RETURNING id, category_id, name, column_type, required, max_length,
                           min_value, max_value, created_at, updated_at",
            )
            .bind(column.id)
            .bind(column.category_id)
            .bind(&column.name)
            .bind(column.column_type)
            .bind(column.required)
            .bind(column.max_length)
            .bind(column.min_value)
            .bind(column.max_value)
            .bind(column.created_at)
            .bind(column.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(column.name = %column.name, error = %e, "Database error creating column");
                StoreError::from(e)
            })
        })
    }
}

impl SubmissionStore for PgStore {
    fn submission<'a>(&'a self, key: SubmissionKey) -> StoreFuture<'a, Option<Submission>> {
        Box::pin(async move { self.submission_row(key).await })
    }

    fn upsert_value<'a>(
        &'a self,
        key: SubmissionKey,
        column_id: ColumnId,
        value: String,
    ) -> StoreFuture<'a, Submission> {
        Box::pin(async move {
            // First value write creates the submission in Draft.
            sqlx::query(
                "INSERT INTO submissions (school_id, category_id, status, created_at, updated_at)
                 VALUES ($1, $2, 'draft', NOW(), NOW())
                 ON CONFLICT (school_id, category_id) DO NOTHING",
            )
            .bind(key.school_id)
            .bind(key.category_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(submission = %key, error = %e, "Database error creating submission");
                StoreError::from(e)
            })?;

            sqlx::query(
                "INSERT INTO submission_values (school_id, category_id, column_id, value)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (school_id, category_id, column_id)
                 DO UPDATE SET value = EXCLUDED.value",
            )
            .bind(key.school_id)
            .bind(key.category_id)
            .bind(column_id)
            .bind(&value)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(submission = %key, error = %e, "Database error writing value");
                StoreError::from(e)
            })?;

            sqlx::query(
                "UPDATE submissions SET updated_at = NOW()
                 WHERE school_id = $1 AND category_id = $2",
            )
            .bind(key.school_id)
            .bind(key.category_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

            self.submission_row(key)
                .await?
                .ok_or_else(|| StoreError(anyhow::anyhow!("submission vanished after write")))
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
            let result = sqlx::query(
                "UPDATE submissions
                 SET status = $3,
                     rejection_reason = $4,
                     submitted_at = CASE WHEN $3 = 'pending'::submission_status
                                         THEN NOW() ELSE submitted_at END,
                     updated_at = NOW()
                 WHERE school_id = $1 AND category_id = $2 AND status = $5",
            )
            .bind(key.school_id)
            .bind(key.category_id)
            .bind(to)
            .bind(&reason)
            .bind(from)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(submission = %key, error = %e, "Database error writing status");
                StoreError::from(e)
            })?;

            if result.rows_affected() == 0 {
                Ok(StatusWrite::Conflict)
            } else {
                Ok(StatusWrite::Applied)
            }
        })
    }

    fn list<'a>(
        &'a self,
        scope: ScopeFilter,
        filter: QueueFilter,
    ) -> StoreFuture<'a, Vec<QueueRow>> {
        Box::pin(async move {
            let mut query = String::from(
                "SELECT s.school_id, s.category_id, s.status, s.submitted_at, s.updated_at,
                        sch.name AS school_name, c.name AS category_name,
                        (SELECT COUNT(*) FROM columns col
                          WHERE col.category_id = s.category_id AND col.required) AS required_total,
                        (SELECT COUNT(*) FROM submission_values v
                          INNER JOIN columns col ON col.id = v.column_id
                          WHERE v.school_id = s.school_id AND v.category_id = s.category_id
                            AND col.required AND length(trim(v.value)) > 0) AS required_filled
                 FROM submissions s
                 INNER JOIN schools sch ON sch.id = s.school_id
                 INNER JOIN categories c ON c.id = s.category_id
                 WHERE 1=1",
            );

            let mut binds: Vec<Uuid> = Vec::new();

            match scope {
                ScopeFilter::All => {}
                ScopeFilter::Region(region_id) => {
                    binds.push(region_id.into_inner());
                    query.push_str(&format!(
                        " AND sch.sector_id IN (SELECT id FROM sectors WHERE region_id = ${})",
                        binds.len()
                    ));
                }
                ScopeFilter::Sector(sector_id) => {
                    binds.push(sector_id.into_inner());
                    query.push_str(&format!(" AND sch.sector_id = ${}", binds.len()));
                }
                ScopeFilter::School(school_id) => {
                    binds.push(school_id.into_inner());
                    query.push_str(&format!(" AND s.school_id = ${}", binds.len()));
                }
            }

            if let Some(school_id) = filter.school_id {
                binds.push(school_id.into_inner());
                query.push_str(&format!(" AND s.school_id = ${}", binds.len()));
            }

            if let Some(category_id) = filter.category_id {
                binds.push(category_id.into_inner());
                query.push_str(&format!(" AND s.category_id = ${}", binds.len()));
            }

            // Status binds as text alongside the uuid params, so it is
            // appended after them with its own placeholder.
            let status_placeholder = filter.status.map(|_| binds.len() + 1);
            if let Some(n) = status_placeholder {
                query.push_str(&format!(" AND s.status = ${}::submission_status", n));
            }

            query.push_str(" ORDER BY COALESCE(s.submitted_at, s.created_at) ASC");

            let mut sql = sqlx::query(&query);
            for bind in &binds {
                sql = sql.bind(bind);
            }
            if let Some(status) = filter.status {
                sql = sql.bind(status.as_str());
            }

            let rows = sql.fetch_all(&self.pool).await.map_err(|e| {
                error!(error = %e, "Database error listing submissions");
                StoreError::from(e)
            })?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                out.push(QueueRow {
                    school_id: row.try_get("school_id").map_err(StoreError::from)?,
                    category_id: row.try_get("category_id").map_err(StoreError::from)?,
                    school_name: row.try_get("school_name").map_err(StoreError::from)?,
                    category_name: row.try_get("category_name").map_err(StoreError::from)?,
                    status: row.try_get("status").map_err(StoreError::from)?,
                    required_total: row.try_get("required_total").map_err(StoreError::from)?,
                    required_filled: row.try_get("required_filled").map_err(StoreError::from)?,
                    submitted_at: row.try_get("submitted_at").map_err(StoreError::from)?,
                    updated_at: row.try_get("updated_at").map_err(StoreError::from)?,
                });
            }
            Ok(out)
        })
    }
}

impl PrincipalStore for PgStore {
    fn principal<'a>(&'a self, id: UserId) -> StoreFuture<'a, Option<Principal>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT id, email, role, region_id, sector_id, school_id
                 FROM users WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(user.id = %id, error = %e, "Database error fetching user");
                StoreError::from(e)
            })?;

            let Some(row) = row else {
                return Ok(None);
            };

            let tag: String = row.try_get("role").map_err(StoreError::from)?;
            let role = Role::from_parts(
                &tag,
                row.try_get("region_id").map_err(StoreError::from)?,
                row.try_get("sector_id").map_err(StoreError::from)?,
                row.try_get("school_id").map_err(StoreError::from)?,
            )
            .map_err(|e| {
                error!(user.id = %id, error = %e, "User row has inconsistent role scope");
                StoreError(anyhow::anyhow!("inconsistent role scope for user {}: {}", id, e))
            })?;

            let user_id: UserId = row.try_get("id").map_err(StoreError::from)?;

            Ok(Some(Principal::new(
                user_id,
                row.try_get::<String, _>("email").map_err(StoreError::from)?,
                role,
            )))
        })
    }
}
