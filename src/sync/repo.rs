use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};
use tokio::sync::RwLock;

use super::dto::PlannerDocument;

/// Row id of the one planner document.
const PLANNER_DOC_ID: i16 = 1;

/// Read/replace access to the single shared planner document.
#[async_trait]
pub trait PlannerRepo: Send + Sync {
    async fn find_one(&self) -> anyhow::Result<Option<PlannerDocument>>;
    /// Creates the document or overwrites it in full.
    async fn replace(&self, doc: PlannerDocument) -> anyhow::Result<()>;
}

#[derive(Debug, FromRow)]
struct PlannerRow {
    users: Json<Value>,
    availability: Json<Value>,
}

impl From<PlannerRow> for PlannerDocument {
    fn from(r: PlannerRow) -> Self {
        Self {
            users: r.users.0,
            availability: r.availability.0,
        }
    }
}

#[derive(Clone)]
pub struct PgPlannerRepo {
    db: PgPool,
}

impl PgPlannerRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlannerRepo for PgPlannerRepo {
    async fn find_one(&self) -> anyhow::Result<Option<PlannerDocument>> {
        let row = sqlx::query_as::<_, PlannerRow>(
            r#"
            SELECT users, availability
            FROM planner
            WHERE id = $1
            "#,
        )
        .bind(PLANNER_DOC_ID)
        .fetch_optional(&self.db)
        .await
        .context("select planner document")?;
        Ok(row.map(PlannerDocument::from))
    }

    async fn replace(&self, doc: PlannerDocument) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO planner (id, users, availability, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (id) DO UPDATE
               SET users = EXCLUDED.users,
                   availability = EXCLUDED.availability,
                   updated_at = now()
            "#,
        )
        .bind(PLANNER_DOC_ID)
        .bind(Json(doc.users))
        .bind(Json(doc.availability))
        .execute(&self.db)
        .await
        .context("upsert planner document")?;
        Ok(())
    }
}

/// Keeps the document in process memory. Used by tests and local runs
/// without a database.
#[derive(Default)]
pub struct MemoryPlannerRepo {
    doc: RwLock<Option<PlannerDocument>>,
}

impl MemoryPlannerRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlannerRepo for MemoryPlannerRepo {
    async fn find_one(&self) -> anyhow::Result<Option<PlannerDocument>> {
        Ok(self.doc.read().await.clone())
    }

    async fn replace(&self, doc: PlannerDocument) -> anyhow::Result<()> {
        *self.doc.write().await = Some(doc);
        Ok(())
    }
}
