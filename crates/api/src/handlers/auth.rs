//! Handlers for the confirmation-code sign-up flow.
//!
//! A user signs up with a username and email, receives a one-time code by
//! mail, and trades it for a bearer token. Both endpoints are public.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use yamdb_core::confirmation::{generate_code, hash_code, verify_code};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::users::{validate_email, validate_username};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::ConfirmationMail;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::state::AppState;

const USERNAME_TAKEN: &str = "A user with this username already exists";
const EMAIL_TAKEN: &str = "A user with this email already exists";
const REQUIRED: &str = "This field is required";
const INVALID_CODE: &str = "Invalid confirmation code";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Response body for `POST /auth/signup`.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub confirmation_code: String,
}

/// Response body for `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a user (or re-request a code for an existing username/email
/// pair) and mail a fresh confirmation code.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    errors.check("username", validate_username(&input.username));
    errors.check("email", validate_email(&input.email));
    errors.into_result()?;

    let by_username = UserRepo::find_by_username(&state.pool, &input.username).await?;
    let email_taken = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some();

    let user = match by_username {
        Some(user) if user.email == input.email => user,
        Some(_) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            if email_taken {
                errors.add("email", EMAIL_TAKEN);
            }
            return Err(CoreError::InvalidFields(errors).into());
        }
        None if email_taken => return Err(CoreError::field("email", EMAIL_TAKEN).into()),
        None => {
            let created = UserRepo::create(
                &state.pool,
                &CreateUser {
                    username: input.username.clone(),
                    email: input.email.clone(),
                    ..Default::default()
                },
            )
            .await?;
            tracing::info!(user_id = created.id, username = %created.username, "User signed up");
            created
        }
    };

    send_confirmation_code(&state, &user).await?;

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access token. The code is consumed.
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TokenRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    if input.username.is_empty() {
        errors.add("username", REQUIRED);
    }
    if input.confirmation_code.is_empty() {
        errors.add("confirmation_code", REQUIRED);
    }
    errors.into_result()?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    if !verify_code(
        &input.confirmation_code,
        user.confirmation_code_hash.as_deref(),
    ) {
        tracing::warn!(user_id = user.id, "Rejected confirmation code");
        return Err(CoreError::field("confirmation_code", INVALID_CODE).into());
    }

    let consumed = UserRepo::consume_confirmation_code(
        &state.pool,
        user.id,
        &hash_code(&input.confirmation_code),
    )
    .await?;
    if !consumed {
        return Err(CoreError::field("confirmation_code", INVALID_CODE).into());
    }

    let token = generate_access_token(user.id, user.role().as_str(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

/// Generate a new code for `user`, store its digest and mail the plaintext.
/// Any previously issued code stops working.
async fn send_confirmation_code(state: &AppState, user: &User) -> AppResult<()> {
    let code = generate_code();
    UserRepo::set_confirmation_code_hash(&state.pool, user.id, &hash_code(&code)).await?;

    state
        .mailer
        .send_confirmation(&ConfirmationMail {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role().to_string(),
            code,
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send confirmation code: {e}")))?;

    tracing::info!(user_id = user.id, "Confirmation code sent");
    Ok(())
}
