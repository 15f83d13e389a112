//! Account API handlers.
//!
//! ```text
//! POST /api/v1/signup {"email":"ada@example.org","password":"...","confirmPassword":"..."}
//! POST /api/v1/login  {"email":"ada@example.org","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/home
//! GET  /api/v1/profile
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    CredentialValidationError, Error, LoginCredentials, SignupCredentials, User,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Signup request body for `POST /api/v1/signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl TryFrom<SignupRequest> for SignupCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password, &value.confirm_password)
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Account representation returned after signup and login.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().as_ref().to_owned(),
            created_at: user.created_at(),
        }
    }
}

/// Session status for the landing page.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Account info and stats for the profile page.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub favorite_count: u64,
    pub member_since: DateTime<Utc>,
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    let (field, code) = match &err {
        CredentialValidationError::InvalidEmail(_) => ("email", "invalid_email"),
        CredentialValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        CredentialValidationError::PasswordMismatch => ("confirmPassword", "password_mismatch"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        SignupCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let user = state.accounts.signup(&credentials).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// End the session, dropping the login and any cached results.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// Session status for the landing page.
///
/// Anonymous callers get `authenticated: false` rather than a 401 so the
/// client can decide between the landing and search views.
#[utoipa::path(
    get,
    path = "/api/v1/home",
    responses(
        (status = 200, description = "Session status", body = HomeResponse)
    ),
    tags = ["accounts"],
    operation_id = "home",
    security([])
)]
#[get("/home")]
pub async fn home(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<HomeResponse>> {
    let response = match session.user_id()? {
        Some(id) => match state.accounts.find(&id).await {
            Ok(user) => HomeResponse {
                authenticated: true,
                email: Some(user.email().as_ref().to_owned()),
            },
            Err(_) => HomeResponse {
                authenticated: false,
                email: None,
            },
        },
        None => HomeResponse {
            authenticated: false,
            email: None,
        },
    };
    Ok(web::Json(response))
}

/// Account info and stats.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["accounts"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.find(&user_id).await?;
    let favorite_count = state.favorites.count(&user_id).await?;
    Ok(web::Json(ProfileResponse {
        email: user.email().as_ref().to_owned(),
        favorite_count,
        member_since: user.created_at(),
    }))
}
