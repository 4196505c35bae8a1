use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

use crate::{
    AppState,
    error::AppError,
    utils::{generate_access_token, generate_refresh_token, hash_password, verify_password},
};

use super::model::{LoginRequest, RegisterRequest, ROLE_EMPLOYEE, User};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let name = req.name.trim();
    let username = req.username.trim().to_lowercase();
    let email = req.email.trim().to_lowercase();
    let role = req.role.as_deref().unwrap_or(ROLE_EMPLOYEE);

    if User::exists_with_username_or_email(&state.pool, &username, &email).await? {
        tracing::info!("registration rejected, account already exists: {}", username);
        return Err(AppError::Conflict("Account already exists.".into()));
    }

    let password_hash = hash_password(&req.password).map_err(|err| {
        tracing::error!("password hashing failed: {err}");
        AppError::Internal("Problem while registering new user".into())
    })?;

    let created = User::create(&state.pool, name, &username, &email, &password_hash, role).await?;

    // Re-read what was persisted; the serialized shape excludes credentials.
    let user = User::find_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::Internal("Problem while registering new user".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User Added Successfully".into(),
            user,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = req.username.as_deref().map(str::trim).unwrap_or("");
    if username.is_empty() {
        return Err(AppError::NotFound("Username required to login!".into()));
    }

    // Usernames are stored lowercased at registration; lookup is exact.
    let user = User::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| AppError::Validation("Username not found!".into()))?;

    let password_matches = verify_password(&req.password, &user.password_hash).map_err(|err| {
        tracing::error!("password verification failed: {err}");
        AppError::Internal("Something went wrong while logging in".into())
    })?;

    if !password_matches {
        return Err(AppError::Unauthorized("Incorrect Password. Try again!".into()));
    }

    let access_token =
        generate_access_token(user.id, &user.email, &user.username, &user.name, &state.config)
            .map_err(|err| {
                tracing::error!("token generation failed: {err}");
                AppError::Internal("Something went wrong while generating tokens".into())
            })?;
    let refresh_token = generate_refresh_token(user.id, &state.config).map_err(|err| {
        tracing::error!("token generation failed: {err}");
        AppError::Internal("Something went wrong while generating tokens".into())
    })?;

    // Kept for session continuity; no route verifies it yet.
    User::store_refresh_token(&state.pool, user.id, &refresh_token).await?;

    let user = User::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::Internal("Something went wrong while logging in".into()))?;

    tracing::info!("user logged in: {}", user.username);

    let jar = jar
        .add(auth_cookie("accessToken", &access_token))
        .add(auth_cookie("refreshToken", &refresh_token));

    Ok((
        jar,
        Json(LoginResponse {
            user,
            access_token,
            refresh_token,
        }),
    ))
}

fn auth_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}
