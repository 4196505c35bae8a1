use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    extract::cookie::CookieJar,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError, utils::verify_access_token};

/// Guards mutating ship routes: resolves a bearer token from the
/// Authorization header or the `accessToken` cookie, verifies it, and
/// attaches the claims to the request. Invalid requests never reach a
/// handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
        .or_else(|| jar.get("accessToken").map(|cookie| cookie.value().to_string()));

    let Some(token) = token else {
        return Err(AppError::Unauthorized("Authentication token missing".into()));
    };

    let claims = verify_access_token(&token, &state.config)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
