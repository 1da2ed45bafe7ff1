use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::{NewRecipe, Recipe, RecipeChanges};

/// Minimal field set returned in list views. `id` is the only read-only
/// field; everything else is writable on create/update.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

/// Full representation for a single recipe: the summary fields plus
/// `description` and `image`. Composed structurally so the summary set
/// stays a strict subset by construction.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Representation returned by the image upload endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImage {
    pub id: i64,
    pub image: String,
}

/// Create payload. Unknown fields (including any client-supplied `user`)
/// are ignored by deserialization; the owner always comes from the token.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Update payload, used by both PATCH and PUT: absent fields keep their
/// stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

impl From<Recipe> for RecipeSummary {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            time_minutes: r.time_minutes,
            price: r.price,
            link: r.link,
        }
    }
}

impl From<Recipe> for RecipeDetail {
    fn from(r: Recipe) -> Self {
        Self {
            description: r.description.clone(),
            image: r.image_key.clone(),
            summary: r.into(),
        }
    }
}

impl From<CreateRecipeRequest> for NewRecipe {
    fn from(req: CreateRecipeRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            description: req.description,
        }
    }
}

impl From<UpdateRecipeRequest> for RecipeChanges {
    fn from(req: UpdateRecipeRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            description: req.description,
        }
    }
}
