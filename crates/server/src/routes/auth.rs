use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::warn;

use common::types::Ack;
use service::auth::domain::LoginInput;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> Result<Cookie<'static>, JsonApiError> {
    let mut raw = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        raw.push_str("; Secure");
    }
    Cookie::parse(raw).map_err(|e| {
        warn!(error = %e, "cannot build session cookie");
        JsonApiError::Internal(format!("session cookie: {e}"))
    })
}

#[utoipa::path(post, path = "/api/admin/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Session cookie set", body = crate::openapi::AckDoc), (status = 400, description = "Password missing"), (status = 401, description = "Invalid password")))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<Ack>), JsonApiError> {
    let session = state.auth.login(&input)?;
    let cookie = session_cookie(&session.token, session.max_age_secs, state.secure_cookie)?;
    Ok((jar.add(cookie), Json(Ack::ok("Authentication successful"))))
}

#[utoipa::path(post, path = "/api/admin/logout", tag = "auth", responses((status = 200, description = "Session cookie cleared", body = crate::openapi::AckDoc)))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Ack>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Json(Ack::ok("Logged out successfully")))
}
