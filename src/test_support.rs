//! Fixtures shared by handler tests: an in-memory catalog and helpers to
//! seed it and drive the router.

use crate::{
    config::AppConfig, db, models::discussion::ThreadKind, routes::routes::routes,
    state::AppState,
};
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions, types::Json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SITE_URL: &str = "https://data.example";

pub struct TestCatalog {
    pub pool: SqlitePool,
    pub router: Router,
}

impl TestCatalog {
    /// A fresh in-memory catalog with the schema applied.
    pub async fn new() -> Self {
        // One connection that never expires: every new `:memory:` connection
        // is a different database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory sqlite");
        db::apply_schema(&pool).await.expect("apply schema");

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "sqlite::memory:".into(),
            site_url: SITE_URL.into(),
        };
        let router = routes(AppState::new(Arc::new(pool.clone()), config));
        Self { pool, router }
    }

    pub async fn get(&self, uri: &str, api_key: Option<&str>) -> (StatusCode, HeaderMap, Bytes) {
        let mut request = Request::builder().uri(uri);
        if let Some(key) = api_key {
            request = request.header("x-api-key", key);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    pub async fn get_json(&self, uri: &str, api_key: Option<&str>) -> (StatusCode, Value) {
        let (status, _, body) = self.get(uri, api_key).await;
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn org(&self, slug: &str, name: &str, deleted: bool, metrics: Value) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO organizations (id, name, slug, metrics, created_at, last_modified, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(Json(metrics))
        .bind(at(0))
        .bind(at(0))
        .bind(deleted.then(|| at(1)))
        .execute(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn user(&self, first: &str, last: &str, api_key: Option<&str>, sysadmin: bool) -> Uuid {
        let id = Uuid::new_v4();
        let slug = format!("{}-{}", first, last).to_lowercase();
        sqlx::query(
            "INSERT INTO users (id, slug, first_name, last_name, email, api_key, sysadmin)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&slug)
        .bind(first)
        .bind(last)
        .bind(format!("{}@example.org", slug))
        .bind(api_key)
        .bind(sysadmin)
        .execute(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn member(&self, org: Uuid, user: Uuid, role: &str) {
        sqlx::query("INSERT INTO members (organization_id, user_id, role, since) VALUES (?, ?, ?, ?)")
            .bind(org)
            .bind(user)
            .bind(role)
            .bind(at(0))
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// `minute` orders datasets by creation time.
    pub async fn dataset(
        &self,
        org: Uuid,
        slug: &str,
        private: bool,
        deleted: bool,
        minute: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO datasets (id, organization_id, title, slug, tags, private, created_at, last_modified, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(org)
        .bind(format!("Dataset {}", slug))
        .bind(slug)
        .bind(Json(json!(["open"])))
        .bind(private)
        .bind(at(minute))
        .bind(at(minute))
        .bind(deleted.then(|| at(minute + 1)))
        .execute(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn resource(&self, dataset: Uuid, title: &str, minute: i64) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO resources (id, dataset_id, title, url, format, created_at, last_modified)
             VALUES (?, ?, ?, ?, 'csv', ?, ?)",
        )
        .bind(id)
        .bind(dataset)
        .bind(title)
        .bind(format!("https://files.example/{}.csv", title))
        .bind(at(minute))
        .bind(at(minute))
        .execute(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn reuse(&self, org: Uuid, slug: &str, private: bool, deleted: bool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO reuses (id, organization_id, title, slug, url, private, created_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(org)
        .bind(format!("Reuse {}", slug))
        .bind(slug)
        .bind(format!("https://apps.example/{}", slug))
        .bind(private)
        .bind(at(0))
        .bind(deleted.then(|| at(1)))
        .execute(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn follow(&self, follower: Uuid, org: Uuid, active: bool) {
        sqlx::query(
            "INSERT INTO follows (id, follower_id, following_id, created_at, until)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(follower)
        .bind(org)
        .bind(at(0))
        .bind((!active).then(|| at(5)))
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn thread(
        &self,
        kind: ThreadKind,
        dataset: Uuid,
        author: Uuid,
        title: &str,
        minute: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO {} (id, subject_id, user_id, title, messages, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            kind.table()
        );
        let messages = json!([{
            "content": format!("About {}", title),
            "posted_by": author,
            "posted_on": at(minute),
        }]);
        sqlx::query(&sql)
            .bind(id)
            .bind(dataset)
            .bind(author)
            .bind(title)
            .bind(Json(messages))
            .bind(at(minute))
            .execute(&self.pool)
            .await
            .unwrap();
        id
    }
}

/// A fixed clock offset by `minute` minutes.
pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

/// Parse a CSV body into (header, records).
pub fn csv_records(body: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_reader(body);
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let records = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, records)
}
