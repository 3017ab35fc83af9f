//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use kernel::id::AccountId;
use kernel::response::ApiResponse;
use platform::client::extract_bearer_token;
use platform::mail::Mailer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    ManageAccountUseCase, PasswordResetUseCase, RefreshUseCase, SignInInput, SignInUseCase,
    SignOutUseCase, SignUpInput, SignUpUseCase, UpdateProfileInput,
};
use crate::domain::entity::account::AccountView;
use crate::domain::entity::credential::AuthenticatedAccount;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangeRoleRequest, ForgotPasswordRequest, RefreshResponse, ResetPasswordRequest,
    SessionResponse, SignInRequest, SignUpRequest, UpdateProfileRequest,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: the mailer itself need not be Clone
impl<R, M> Clone for AuthAppState<R, M>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

fn parse_account_id(raw: &str) -> AuthResult<AccountId> {
    raw.parse().map_err(|_| AuthError::AccountNotFound)
}

// ============================================================================
// Session Lifecycle
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(SessionResponse {
            account: output.account,
            credentials: output.credentials,
        }),
    ))
}

/// POST /api/auth/signin
pub async fn sign_in<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<ApiResponse<SessionResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(SessionResponse {
        account: output.account,
        credentials: output.credentials,
    }))
}

/// POST /api/auth/refresh (refresh credential as bearer)
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<ApiResponse<RefreshResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let token = extract_bearer_token(&headers)
        .ok_or(AuthError::Unauthorized("Refresh token is required"))?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.config.clone());
    let credentials = use_case.execute(token).await?;

    Ok(ApiResponse::ok(RefreshResponse { credentials }))
}

/// POST /api/auth/logout
pub async fn log_out<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthenticatedAccount,
) -> AuthResult<ApiResponse<()>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.repo.clone());
    use_case.execute(&caller.account_id).await?;

    Ok(ApiResponse::ok(()).with_message("Logged out successfully"))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case =
        PasswordResetUseCase::new(state.repo.clone(), state.mailer.clone(), state.config.clone());
    use_case.forgot(req.email).await?;

    Ok(ApiResponse::ok(()).with_message("Password reset email sent"))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case =
        PasswordResetUseCase::new(state.repo.clone(), state.mailer.clone(), state.config.clone());
    use_case.reset(&req.token, req.password).await?;

    Ok(ApiResponse::ok(()).with_message("Password has been reset"))
}

// ============================================================================
// Own Account
// ============================================================================

/// GET /api/accounts/me
pub async fn get_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthenticatedAccount,
) -> AuthResult<ApiResponse<AccountView>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    Ok(ApiResponse::ok(use_case.get(&caller.account_id).await?))
}

/// PATCH /api/accounts/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthenticatedAccount,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<ApiResponse<AccountView>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    let view = use_case
        .update_profile(
            &caller.account_id,
            UpdateProfileInput {
                name: req.name,
                email: req.email,
            },
        )
        .await?;

    Ok(ApiResponse::ok(view))
}

/// DELETE /api/accounts/me
pub async fn delete_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    caller: AuthenticatedAccount,
) -> AuthResult<ApiResponse<()>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    use_case.delete(&caller.account_id).await?;

    Ok(ApiResponse::ok(()).with_message("Account deleted successfully"))
}

// ============================================================================
// Account Directory (admin)
// ============================================================================

/// GET /api/accounts
pub async fn list_accounts<R, M>(
    State(state): State<AuthAppState<R, M>>,
) -> AuthResult<ApiResponse<Vec<AccountView>>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    Ok(ApiResponse::ok(use_case.list().await?))
}

/// GET /api/accounts/{id}
pub async fn get_account<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(id): Path<String>,
) -> AuthResult<ApiResponse<AccountView>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    Ok(ApiResponse::ok(use_case.get(&account_id).await?))
}

/// GET /api/accounts/by-email/{email}
pub async fn find_account_by_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(email): Path<String>,
) -> AuthResult<ApiResponse<AccountView>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    Ok(ApiResponse::ok(use_case.find_by_email(email).await?))
}

/// PATCH /api/accounts/{id}/role
pub async fn change_role<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(id): Path<String>,
    Json(req): Json<ChangeRoleRequest>,
) -> AuthResult<ApiResponse<AccountView>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    Ok(ApiResponse::ok(use_case.change_role(&account_id, req.role).await?))
}

/// DELETE /api/accounts/{id}
pub async fn delete_account<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(id): Path<String>,
) -> AuthResult<ApiResponse<()>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let use_case = ManageAccountUseCase::new(state.repo.clone());
    use_case.delete(&account_id).await?;

    Ok(ApiResponse::ok(()).with_message("Account deleted successfully"))
}
