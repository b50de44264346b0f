//! Demo data seeder.
//!
//! Populates a small, deterministic hierarchy with one admin user per scope
//! and a starter category, so a fresh database is immediately usable for
//! manual testing. Emails are derived from entity names, so reseeding is
//! idempotent via ON CONFLICT DO NOTHING.

use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use formline_models::ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId, UserId};
use formline_models::roles::{Principal, Role};

pub struct SeedShape {
    pub regions: usize,
    pub sectors_per_region: usize,
    pub schools_per_sector: usize,
}

impl Default for SeedShape {
    fn default() -> Self {
        Self {
            regions: 2,
            sectors_per_region: 2,
            schools_per_sector: 3,
        }
    }
}

/// Seeded administrator accounts, returned so the CLI can mint tokens.
pub struct SeedOutcome {
    pub principals: Vec<Principal>,
    pub regions: usize,
    pub sectors: usize,
    pub schools: usize,
}

pub async fn seed_database(
    db: &PgPool,
    shape: SeedShape,
) -> Result<SeedOutcome, Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    println!("🌱 Seeding demo hierarchy...");
    println!("   - Regions: {}", shape.regions);
    println!("   - Sectors per region: {}", shape.sectors_per_region);
    println!("   - Schools per sector: {}", shape.schools_per_sector);

    let mut tx: Transaction<'_, Postgres> = db.begin().await?;
    let mut principals = Vec::new();
    let mut sectors_total = 0;
    let mut schools_total = 0;

    let superadmin = Principal {
        id: UserId::new(),
        email: "root@formline.test".to_string(),
        role: Role::SuperAdmin,
    };
    insert_user(&mut tx, &superadmin).await?;
    principals.push(superadmin);

    for r in 1..=shape.regions {
        let region_id = RegionId::new();
        let region_name = format!("Region {r:02}");
        sqlx::query(
            "INSERT INTO regions (id, name, status) VALUES ($1, $2, 'active')
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(region_id)
        .bind(&region_name)
        .execute(&mut *tx)
        .await?;

        let region_admin = Principal {
            id: UserId::new(),
            email: format!("region{r:02}@formline.test"),
            role: Role::RegionAdmin(region_id),
        };
        insert_user(&mut tx, &region_admin).await?;
        principals.push(region_admin);

        for s in 1..=shape.sectors_per_region {
            let sector_id = SectorId::new();
            let sector_name = format!("Sector {r:02}-{s:02}");
            sqlx::query(
                "INSERT INTO sectors (id, name, region_id, status) VALUES ($1, $2, $3, 'active')
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(sector_id)
            .bind(&sector_name)
            .bind(region_id)
            .execute(&mut *tx)
            .await?;
            sectors_total += 1;

            let sector_admin = Principal {
                id: UserId::new(),
                email: format!("sector{r:02}-{s:02}@formline.test"),
                role: Role::SectorAdmin(sector_id),
            };
            insert_user(&mut tx, &sector_admin).await?;
            principals.push(sector_admin);

            for c in 1..=shape.schools_per_sector {
                let school_id = SchoolId::new();
                let school_name = format!("School {r:02}-{s:02}-{c:02}");
                sqlx::query(
                    "INSERT INTO schools (id, name, sector_id, status)
                     VALUES ($1, $2, $3, 'active')
                     ON CONFLICT (name) DO NOTHING",
                )
                .bind(school_id)
                .bind(&school_name)
                .bind(sector_id)
                .execute(&mut *tx)
                .await?;
                schools_total += 1;

                let school_admin = Principal {
                    id: UserId::new(),
                    email: format!("school{r:02}-{s:02}-{c:02}@formline.test"),
                    role: Role::SchoolAdmin(school_id),
                };
                insert_user(&mut tx, &school_admin).await?;
                principals.push(school_admin);
            }
        }
    }

    seed_starter_category(&mut tx).await?;

    tx.commit().await?;

    println!(
        "✅ Seeded {} regions, {} sectors, {} schools, {} users in {:.2?}",
        shape.regions,
        sectors_total,
        schools_total,
        principals.len(),
        start_time.elapsed()
    );

    Ok(SeedOutcome {
        principals,
        regions: shape.regions,
        sectors: sectors_total,
        schools: schools_total,
    })
}

async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    principal: &Principal,
) -> Result<(), sqlx::Error> {
    let (region_id, sector_id, school_id) = principal.role.scope_parts();
    sqlx::query(
        "INSERT INTO users (id, email, role, region_id, sector_id, school_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(principal.id)
    .bind(&principal.email)
    .bind(principal.role.tag())
    .bind(region_id)
    .bind(sector_id)
    .bind(school_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn seed_starter_category(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    let category_id = CategoryId::new();
    let inserted = sqlx::query(
        "INSERT INTO categories (id, name, description, assignment, status)
         VALUES ($1, 'School profile', 'Core school statistics', 'all', 'active')
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(category_id)
    .execute(&mut **tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(());
    }

    let columns: [(&str, &str, bool); 3] = [
        ("Enrolment", "number", true),
        ("Head teacher email", "email", true),
        ("Founded", "date", false),
    ];
    for (name, column_type, required) in columns {
        sqlx::query(
            "INSERT INTO columns (id, category_id, name, column_type, required)
             VALUES ($1, $2, $3, $4::column_type, $5)",
        )
        .bind(ColumnId::new())
        .bind(category_id)
        .bind(name)
        .bind(column_type)
        .bind(required)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Removes all seeded rows. Submissions cascade from schools and categories.
pub async fn clear_seeded_data(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM submission_values").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM submissions").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM columns").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM schools").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM sectors").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM regions").execute(&mut *tx).await?;

    tx.commit().await?;
    println!("🧹 Cleared seeded data");
    Ok(())
}
