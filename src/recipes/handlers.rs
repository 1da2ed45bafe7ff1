use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    images::{object_key, ImageFormat},
    state::AppState,
    storage::StorageClient,
    store::RecipeStore,
};

use super::dto::{
    CreateRecipeRequest, Pagination, RecipeDetail, RecipeImage, RecipeSummary,
    UpdateRecipeRequest,
};

const PRESIGN_TTL_SECS: u64 = 30 * 60;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route(
            "/recipes/:id",
            axum::routing::put(update_recipe)
                .patch(update_recipe)
                .delete(delete_recipe),
        )
        .route(
            "/recipes/:id/image",
            post(upload_image).get(download_image),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

fn validate_title(title: &str) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title", "Title cannot be empty"));
    }
    Ok(())
}

fn validate_time_minutes(time_minutes: i32) -> ApiResult<()> {
    if time_minutes < 0 {
        return Err(ApiError::validation(
            "time_minutes",
            "time_minutes cannot be negative",
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> ApiResult<()> {
    if price < Decimal::ZERO {
        return Err(ApiError::validation("price", "price cannot be negative"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<RecipeSummary>>> {
    let recipes = state
        .recipes
        .list_for_owner(user_id, p.limit, p.offset)
        .await?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = state
        .recipes
        .get_owned(user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<RecipeDetail>)> {
    validate_title(&payload.title)?;
    validate_time_minutes(payload.time_minutes)?;
    validate_price(payload.price)?;

    let recipe = state.recipes.create_recipe(user_id, payload.into()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/recipes/{}", recipe.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    info!(user_id = %user_id, recipe_id = recipe.id, "recipe created");
    Ok((StatusCode::CREATED, headers, Json(recipe.into())))
}

/// Shared by PUT and PATCH: absent fields keep their stored values, and the
/// owner cannot be changed through either method.
#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeDetail>> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(time_minutes) = payload.time_minutes {
        validate_time_minutes(time_minutes)?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let recipe = state
        .recipes
        .update_owned(user_id, id, payload.into())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.recipes.delete_owned(user_id, id).await? {
        return Err(ApiError::NotFound("recipe"));
    }
    info!(user_id = %user_id, recipe_id = id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/{id}/image (multipart, field `image`).
///
/// The payload is sniffed, never trusted: a field that does not carry image
/// magic bytes is a validation error. A successful upload replaces the
/// stored key and deletes the previous blob.
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    mut mp: Multipart,
) -> ApiResult<Json<RecipeImage>> {
    let recipe = state
        .recipes
        .get_owned(user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let mut data = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("image") {
            data = Some(field.bytes().await.map_err(|e| {
                ApiError::validation("image", format!("unreadable image field: {e}"))
            })?);
            break;
        }
    }
    let Some(data) = data else {
        return Err(ApiError::validation("image", "image file is required"));
    };

    let Some(format) = ImageFormat::sniff(&data) else {
        warn!(user_id = %user_id, recipe_id = id, "rejected non-image upload");
        return Err(ApiError::validation("image", "payload is not a valid image"));
    };

    let key = object_key(user_id, id, format);
    state
        .storage
        .put_object(&key, data, format.content_type())
        .await?;

    let updated = state
        .recipes
        .set_image_owned(user_id, id, Some(&key))
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    if let Some(old_key) = recipe.image_key {
        if let Err(e) = state.storage.delete_object(&old_key).await {
            warn!(error = %e, key = %old_key, "failed to delete replaced image");
        }
    }

    info!(user_id = %user_id, recipe_id = id, key = %key, "image uploaded");
    Ok(Json(RecipeImage {
        id: updated.id,
        image: key,
    }))
}

/// GET /recipes/{id}/image: temporary redirect to a presigned URL.
#[instrument(skip(state))]
pub async fn download_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    let recipe = state
        .recipes
        .get_owned(user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    let key = recipe.image_key.ok_or(ApiError::NotFound("image"))?;

    let url = state.storage.presign_get(&key, PRESIGN_TTL_SECS).await?;
    Ok(Redirect::temporary(&url))
}
