use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::{from_value, Value};
use sqlx::sqlite::SqlitePool;

use crate::db;
use crate::error::ApiError;
use crate::models::{
    Ack, ActionError, ActionRequest, AthleteInput, AthleteUpdate, BulkData, GetParams, ScoreInput,
};

// GET /?action=getAll - Read the full dataset
//
// Only `getAll` is recognized; any other (or missing) action value gets the
// soft unknown-action body with no side effects.
pub async fn handle_get(
    State(pool): State<SqlitePool>,
    Query(params): Query<GetParams>,
) -> Result<Response, ApiError> {
    db::init_tables(&pool).await?;

    match params.action.as_deref() {
        Some("getAll") => {
            let data = db::get_all_data(&pool).await?;
            Ok(Json(data).into_response())
        }
        _ => Ok(Json(ActionError::unknown()).into_response()),
    }
}

// POST / with a JSON body of {action, data} - Mutations
//
// Dispatches to one of the five write operations; every one of them
// acknowledges with {"success": true}.
pub async fn handle_post(
    State(pool): State<SqlitePool>,
    Json(body): Json<ActionRequest>,
) -> Result<Response, ApiError> {
    db::init_tables(&pool).await?;

    match body.action.as_str() {
        "addAthlete" => {
            let data: AthleteInput = from_value(body.data)?;
            db::add_athlete(&pool, &data).await?;
            Ok(Json(Ack::ok()).into_response())
        }
        "removeAthlete" => {
            let id = body.data.get("id").cloned().unwrap_or(Value::Null);
            db::remove_athlete(&pool, &id).await?;
            Ok(Json(Ack::ok()).into_response())
        }
        "updateAthlete" => {
            let data: AthleteUpdate = from_value(body.data)?;
            db::update_athlete(&pool, &data).await?;
            Ok(Json(Ack::ok()).into_response())
        }
        "saveScore" => {
            let data: ScoreInput = from_value(body.data)?;
            db::save_score(&pool, &data).await?;
            Ok(Json(Ack::ok()).into_response())
        }
        "saveAllData" => {
            let data: BulkData = from_value(body.data)?;
            db::save_all_data(&pool, &data).await?;
            Ok(Json(Ack::ok()).into_response())
        }
        _ => Ok(Json(ActionError::unknown()).into_response()),
    }
}
