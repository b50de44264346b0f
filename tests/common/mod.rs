use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use formline::config::jwt::JwtConfig;
use formline::router::init_router;
use formline::state::test_app_state;
use formline::store::MemoryStore;
use formline::utils::jwt::create_access_token;
use formline_models::categories::{Category, CategoryAssignment, Column, ColumnType};
use formline_models::hierarchy::{Region, School, Sector};
use formline_models::roles::{Principal, Role};

/// A small two-branch hierarchy with one admin per scope and one category
/// with required columns, shared by the workflow and router tests.
#[allow(dead_code)]
pub struct World {
    pub store: Arc<MemoryStore>,
    pub region: Region,
    pub sector: Sector,
    pub school: School,
    pub other_region: Region,
    pub other_sector: Sector,
    pub other_school: School,
    pub superadmin: Principal,
    pub region_admin: Principal,
    pub sector_admin: Principal,
    pub school_admin: Principal,
    pub other_school_admin: Principal,
    pub category: Category,
    pub enrolment: Column,
    pub contact: Column,
    pub optional_note: Column,
}

#[allow(dead_code)]
pub fn world() -> World {
    let store = Arc::new(MemoryStore::new());

    let region = store.add_region("North");
    let sector = store.add_sector("North A", region.id);
    let school = store.add_school("North A-1", sector.id);

    let other_region = store.add_region("South");
    let other_sector = store.add_sector("South A", other_region.id);
    let other_school = store.add_school("South A-1", other_sector.id);

    let superadmin = store.add_principal("root@formline.test", Role::SuperAdmin);
    let region_admin = store.add_principal("north@formline.test", Role::RegionAdmin(region.id));
    let sector_admin = store.add_principal("north-a@formline.test", Role::SectorAdmin(sector.id));
    let school_admin =
        store.add_principal("north-a-1@formline.test", Role::SchoolAdmin(school.id));
    let other_school_admin = store.add_principal(
        "south-a-1@formline.test",
        Role::SchoolAdmin(other_school.id),
    );

    let category = store.add_category("School profile", CategoryAssignment::All);
    let enrolment = store.add_column(category.id, "Enrolment", ColumnType::Number, true);
    let contact = store.add_column(category.id, "Contact email", ColumnType::Email, true);
    let optional_note = store.add_column(category.id, "Note", ColumnType::Text, false);

    World {
        store,
        region,
        sector,
        school,
        other_region,
        other_sector,
        other_school,
        superadmin,
        region_admin,
        sector_admin,
        school_admin,
        other_school_admin,
        category,
        enrolment,
        contact,
        optional_note,
    }
}

#[allow(dead_code)]
pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

#[allow(dead_code)]
pub fn app(world: &World) -> Router {
    let store = Arc::clone(&world.store);
    let state = test_app_state(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        jwt_config(),
    );
    init_router(state)
}

#[allow(dead_code)]
pub fn token_for(principal: &Principal) -> String {
    create_access_token(principal, &jwt_config()).expect("token creation")
}

#[allow(dead_code)]
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    principal: Option<&Principal>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(principal) = principal {
        builder = builder.header(
            header::AUTHORIZATION,
            format!("Bearer {}", token_for(principal)),
        );
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response: Response<_> = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
