use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewRecipe, Recipe, RecipeChanges, RecipeStore, User, UserStore};

/// In-process store with the same contract as [`PgStore`](super::PgStore).
///
/// Ids are handed out sequentially so descending-id ordering matches
/// creation order, like the BIGSERIAL column does. Each instance is fully
/// isolated; tests construct one per case.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    recipes: RwLock<BTreeMap<i64, Recipe>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            anyhow::bail!("duplicate email: {email}");
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn create_recipe(&self, owner: Uuid, new: NewRecipe) -> anyhow::Result<Recipe> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let recipe = Recipe {
            id,
            user_id: owner,
            title: new.title,
            time_minutes: new.time_minutes,
            price: new.price,
            link: new.link,
            description: new.description,
            image_key: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.recipes.write().await.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn list_for_owner(
        &self,
        owner: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let recipes = self.recipes.read().await;
        Ok(recipes
            .values()
            .rev()
            .filter(|r| r.user_id == owner)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_owned(&self, owner: Uuid, id: i64) -> anyhow::Result<Option<Recipe>> {
        let recipes = self.recipes.read().await;
        Ok(recipes.get(&id).filter(|r| r.user_id == owner).cloned())
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> anyhow::Result<Option<Recipe>> {
        let mut recipes = self.recipes.write().await;
        let Some(recipe) = recipes.get_mut(&id).filter(|r| r.user_id == owner) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = changes.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = changes.price {
            recipe.price = price;
        }
        if let Some(link) = changes.link {
            recipe.link = Some(link);
        }
        if let Some(description) = changes.description {
            recipe.description = Some(description);
        }
        Ok(Some(recipe.clone()))
    }

    async fn delete_owned(&self, owner: Uuid, id: i64) -> anyhow::Result<bool> {
        let mut recipes = self.recipes.write().await;
        if recipes.get(&id).is_some_and(|r| r.user_id == owner) {
            recipes.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn set_image_owned(
        &self,
        owner: Uuid,
        id: i64,
        image_key: Option<&str>,
    ) -> anyhow::Result<Option<Recipe>> {
        let mut recipes = self.recipes.write().await;
        let Some(recipe) = recipes.get_mut(&id).filter(|r| r.user_id == owner) else {
            return Ok(None);
        };
        recipe.image_key = image_key.map(str::to_string);
        Ok(Some(recipe.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: Some("https://sample.com/recipe.pdf".to_string()),
            description: Some("Sample description".to_string()),
        }
    }

    #[tokio::test]
    async fn list_is_ordered_by_descending_id() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let first = store.create_recipe(owner, sample("first")).await.unwrap();
        let second = store.create_recipe(owner, sample("second")).await.unwrap();

        let listed = store.list_for_owner(owner, 50, 0).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn list_is_limited_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.create_recipe(other, sample("theirs")).await.unwrap();
        let mine = store.create_recipe(owner, sample("mine")).await.unwrap();

        let listed = store.list_for_owner(owner, 50, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
    }

    #[tokio::test]
    async fn get_treats_foreign_recipe_as_absent() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let recipe = store.create_recipe(owner, sample("mine")).await.unwrap();

        assert!(store
            .get_owned(Uuid::new_v4(), recipe.id)
            .await
            .unwrap()
            .is_none());
        assert!(store.get_owned(owner, recipe.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn partial_update_keeps_unset_fields_and_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let recipe = store.create_recipe(owner, sample("before")).await.unwrap();

        let updated = store
            .update_owned(
                owner,
                recipe.id,
                RecipeChanges {
                    title: Some("after".to_string()),
                    ..RecipeChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "after");
        assert_eq!(updated.link, recipe.link);
        assert_eq!(updated.price, recipe.price);
        assert_eq!(updated.user_id, owner);
    }

    #[tokio::test]
    async fn update_of_foreign_recipe_is_a_noop() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let recipe = store.create_recipe(owner, sample("mine")).await.unwrap();

        let result = store
            .update_owned(
                Uuid::new_v4(),
                recipe.id,
                RecipeChanges {
                    title: Some("hijacked".to_string()),
                    ..RecipeChanges::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());

        let stored = store.get_owned(owner, recipe.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "mine");
    }

    #[tokio::test]
    async fn delete_is_owner_scoped() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let recipe = store.create_recipe(owner, sample("mine")).await.unwrap();

        assert!(!store.delete_owned(Uuid::new_v4(), recipe.id).await.unwrap());
        assert!(store.get_owned(owner, recipe.id).await.unwrap().is_some());

        assert!(store.delete_owned(owner, recipe.id).await.unwrap());
        assert!(store.get_owned(owner, recipe.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user("user@example.com", "hash").await.unwrap();
        assert!(store
            .create_user("user@example.com", "hash")
            .await
            .is_err());
    }
}
