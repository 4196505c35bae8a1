use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::AppError, utils::AccessClaims};

use super::model::{
    CreateShipRequest, Ship, UpdateShipRequest, validate_travel_requirements,
};

#[derive(Debug, Serialize)]
pub struct ListShipsResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Ship>,
}

#[derive(Debug, Serialize)]
pub struct CreateShipResponse {
    pub success: bool,
    pub message: String,
    pub ship: Ship,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipDetailResponse {
    pub success: bool,
    pub ship_data: Ship,
}

#[derive(Debug, Serialize)]
pub struct UpdateShipResponse {
    pub success: bool,
    pub message: String,
    pub data: Ship,
}

#[derive(Debug, Serialize)]
pub struct DeleteShipResponse {
    pub success: bool,
    pub message: String,
}

// A malformed id cannot reference any ship, so it reads as absence.
fn parse_ship_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound("Ship not found".into()))
}

#[axum::debug_handler]
pub async fn list_ships(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let ships = Ship::find_all(&state.pool).await?;

    Ok(Json(ListShipsResponse {
        success: true,
        count: ships.len(),
        data: ships,
    }))
}

#[axum::debug_handler]
pub async fn create_ship(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Json(req): Json<CreateShipRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    if Ship::uid_exists(&state.pool, req.ship_uid.trim()).await? {
        return Err(AppError::Conflict("Ship with this UID already exists".into()));
    }

    let ship = Ship::create(&state.pool, req).await?;
    tracing::info!("ship {} created by {}", ship.ship_uid, claims.username);

    Ok((
        StatusCode::CREATED,
        Json(CreateShipResponse {
            success: true,
            message: "Ship created".into(),
            ship,
        }),
    ))
}

#[axum::debug_handler]
pub async fn get_ship_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_ship_id(&id)?;

    let ship = Ship::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ship not found".into()))?;

    Ok(Json(ShipDetailResponse {
        success: true,
        ship_data: ship,
    }))
}

#[axum::debug_handler]
pub async fn update_ship(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateShipRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_ship_id(&id)?;
    req.validate()?;

    let mut ship = Ship::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ship not found".into()))?;

    ship.apply_update(req);
    validate_travel_requirements(
        ship.is_traveling,
        ship.source.as_deref(),
        ship.destination.as_deref(),
    )?;

    ship.save(&state.pool).await?;

    let updated = Ship::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ship not found".into()))?;

    Ok(Json(UpdateShipResponse {
        success: true,
        message: "Ship updated successfully".into(),
        data: updated,
    }))
}

#[axum::debug_handler]
pub async fn delete_ship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_ship_id(&id)?;

    let ship = Ship::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ship not found".into()))?;

    Ship::delete(&state.pool, ship.id).await?;
    tracing::info!("ship {} deleted", ship.ship_uid);

    Ok(Json(DeleteShipResponse {
        success: true,
        message: "Ship deleted".into(),
    }))
}
