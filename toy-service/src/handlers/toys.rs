//! Listing routes for the marketplace front end.
//!
//! Each handler turns request parameters into one store call and returns the
//! store's answer as JSON. Missing listings are not errors: a lookup yields
//! `null` and writes yield zero counts.

use crate::dtos::TrendingParams;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    changes_from_json, parse_listing_id, DeleteAck, InsertAck, Listing, ListingFilter, UpdateAck,
};
use crate::services::record_listing_write;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde_json::{Map, Value};
use service_core::error::AppError;

/// Cap on `GET /toys`.
pub const ALL_TOYS_LIMIT: i64 = 20;

pub async fn search_by_toy_name(
    State(state): State<AppState>,
    ApiPath(text): ApiPath<String>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .store
        .find_many(&ListingFilter::name_contains(text), None)
        .await?;
    Ok(Json(listings))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let filter = ListingFilter::from_query_pairs(params)?;
    Ok(Json(state.store.find_many(&filter, None).await?))
}

pub async fn list_trending(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let filter = ListingFilter::trending(TrendingParams::from_query_pairs(params).is_trending());
    Ok(Json(state.store.find_many(&filter, None).await?))
}

pub async fn list_toys(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .store
        .find_many(&ListingFilter::all(), Some(ALL_TOYS_LIMIT))
        .await?;
    Ok(Json(listings))
}

pub async fn get_toy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Option<Listing>>, AppError> {
    let id = parse_listing_id(&id)?;
    Ok(Json(state.store.find_one(id).await?))
}

/// Same mechanism as the category listing; the caller's own identifying
/// fields arrive as query parameters.
pub async fn list_my_toys(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let filter = ListingFilter::from_query_pairs(params)?;
    Ok(Json(state.store.find_many(&filter, None).await?))
}

pub async fn add_toy(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<InsertAck>, AppError> {
    let listing = Listing::from_json(body)?;
    let ack = state.store.insert_one(listing).await?;
    record_listing_write("insert");

    tracing::info!(listing_id = %ack.inserted_id, "Listing added");

    Ok(Json(ack))
}

pub async fn update_my_toy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<UpdateAck>, AppError> {
    let id = parse_listing_id(&id)?;
    let changes = changes_from_json(body)?;
    let ack = state.store.update_one(id, changes).await?;
    record_listing_write("update");

    tracing::info!(
        listing_id = %id,
        matched = ack.matched_count,
        modified = ack.modified_count,
        "Listing updated"
    );

    Ok(Json(ack))
}

pub async fn delete_my_toy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<DeleteAck>, AppError> {
    let id = parse_listing_id(&id)?;
    let ack = state.store.delete_one(id).await?;
    record_listing_write("delete");

    tracing::info!(listing_id = %id, deleted = ack.deleted_count, "Listing deleted");

    Ok(Json(ack))
}
