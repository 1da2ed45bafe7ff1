mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields a caller supplies at creation. The owner comes from the
/// authenticated identity, never from here.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Partial update: `None` keeps the stored value. The owner and id cannot
/// be expressed here at all.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<User>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
}

/// Every read and write is filtered on `owner` in the same query that
/// matches the id. There is no fetch-by-id-alone: a record owned by someone
/// else and a record that does not exist are the same `None`/`false`.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn create_recipe(&self, owner: Uuid, new: NewRecipe) -> anyhow::Result<Recipe>;

    /// Recipes owned by `owner`, most recently created first (descending id).
    async fn list_for_owner(
        &self,
        owner: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>>;

    async fn get_owned(&self, owner: Uuid, id: i64) -> anyhow::Result<Option<Recipe>>;

    async fn update_owned(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> anyhow::Result<Option<Recipe>>;

    /// Returns whether a row was deleted.
    async fn delete_owned(&self, owner: Uuid, id: i64) -> anyhow::Result<bool>;

    async fn set_image_owned(
        &self,
        owner: Uuid,
        id: i64,
        image_key: Option<&str>,
    ) -> anyhow::Result<Option<Recipe>>;
}
