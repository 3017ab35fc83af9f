//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use auth::AuthenticatedAccount;
use kernel::id::{AccountId, FeedbackId, ProjectId, TransactionId};
use kernel::response::ApiResponse;
use std::sync::Arc;

use crate::application::config::MarketConfig;
use crate::application::{
    AddProjectInput, FeedbackUseCase, ManageTransactionsUseCase, ProjectCatalogUseCase,
    SettleInput, SettleUseCase,
};
use crate::domain::entities::{Feedback, Project, Transaction};
use crate::domain::repository::{
    FeedbackRepository, ProjectRepository, SettlementLedger, TransactionRepository,
};
use crate::domain::value_objects::TransactionStatus;
use crate::error::{MarketError, MarketResult};
use crate::presentation::dto::{
    CreateFeedbackRequest, CreateProjectRequest, CreateTransactionRequest, ProjectResponse,
    SourceResponse, UpdateFeedbackRequest, UpdateStatusRequest,
};

/// Everything the market handlers need from one store
pub trait MarketStore:
    ProjectRepository
    + TransactionRepository
    + FeedbackRepository
    + SettlementLedger
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<S> MarketStore for S where
    S: ProjectRepository
        + TransactionRepository
        + FeedbackRepository
        + SettlementLedger
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for market handlers
#[derive(Clone)]
pub struct MarketAppState<S>
where
    S: MarketStore,
{
    pub store: Arc<S>,
    pub config: Arc<MarketConfig>,
}

impl<S: MarketStore> MarketAppState<S> {
    fn catalog(&self) -> ProjectCatalogUseCase<S, S> {
        ProjectCatalogUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
    }

    fn feedback(&self) -> FeedbackUseCase<S, S> {
        FeedbackUseCase::new(self.store.clone(), self.store.clone())
    }

    fn transactions(&self) -> ManageTransactionsUseCase<S> {
        ManageTransactionsUseCase::new(self.store.clone())
    }
}

fn parse_project_id(raw: &str) -> MarketResult<ProjectId> {
    raw.parse().map_err(|_| MarketError::ProjectNotFound)
}

fn parse_transaction_id(raw: &str) -> MarketResult<TransactionId> {
    raw.parse().map_err(|_| MarketError::TransactionNotFound)
}

fn parse_feedback_id(raw: &str) -> MarketResult<FeedbackId> {
    raw.parse().map_err(|_| MarketError::FeedbackNotFound)
}

fn to_responses(projects: Vec<Project>) -> Vec<ProjectResponse> {
    projects.into_iter().map(ProjectResponse::from).collect()
}

// ============================================================================
// Projects
// ============================================================================

/// GET /api/projects
pub async fn list_projects<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
) -> MarketResult<ApiResponse<Vec<ProjectResponse>>> {
    let projects = state.catalog().list().await?;
    Ok(ApiResponse::ok(to_responses(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<ProjectResponse>> {
    let project_id = parse_project_id(&id)?;
    let project = state.catalog().get(&project_id).await?;
    Ok(ApiResponse::ok(project.into()))
}

/// GET /api/projects/owner/{id}
pub async fn list_projects_by_owner<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<Vec<ProjectResponse>>> {
    // An unknown owner simply has no listings
    let Ok(owner_id) = id.parse::<AccountId>() else {
        return Ok(ApiResponse::ok(Vec::new()));
    };
    let projects = state.catalog().list_by_owner(&owner_id).await?;
    Ok(ApiResponse::ok(to_responses(projects)))
}

/// POST /api/projects
pub async fn create_project<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Json(req): Json<CreateProjectRequest>,
) -> MarketResult<impl IntoResponse> {
    let project = state
        .catalog()
        .add(
            caller.account_id,
            AddProjectInput {
                title: req.title,
                description: req.description,
                short_description: req.short_description,
                price: req.price,
                source_url: req.source_url,
                screenshots: req.screenshots,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(ProjectResponse::from(project)),
    ))
}

/// GET /api/projects/purchased
pub async fn list_purchased_projects<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
) -> MarketResult<ApiResponse<Vec<ProjectResponse>>> {
    let projects = state.catalog().list_purchased(&caller.account_id).await?;
    Ok(ApiResponse::ok(to_responses(projects)))
}

/// GET /api/projects/{id}/source
pub async fn get_project_source<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<SourceResponse>> {
    let project_id = parse_project_id(&id)?;
    let source_url = state.catalog().source(&project_id, &caller).await?;
    Ok(ApiResponse::ok(SourceResponse {
        project_id,
        source_url,
    }))
}

// ============================================================================
// Transactions
// ============================================================================

/// POST /api/transactions
pub async fn create_transaction<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Json(req): Json<CreateTransactionRequest>,
) -> MarketResult<impl IntoResponse> {
    let status = match req.status.as_deref() {
        Some(raw) => raw.parse::<TransactionStatus>()?,
        None => TransactionStatus::default(),
    };

    let use_case = SettleUseCase::new(state.store.clone(), state.store.clone(), state.config.clone());
    let transaction = use_case
        .execute(SettleInput {
            project_id: req.project_id,
            buyer_id: caller.account_id,
            amount: req.amount,
            commission: req.commission,
            status,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(transaction)))
}

/// GET /api/transactions
pub async fn list_transactions<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
) -> MarketResult<ApiResponse<Vec<Transaction>>> {
    let transactions = state.transactions().list().await?;
    Ok(ApiResponse::ok(transactions))
}

/// GET /api/transactions/{id}
pub async fn get_transaction<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<Transaction>> {
    let transaction_id = parse_transaction_id(&id)?;
    let transaction = state.transactions().get(&transaction_id, &caller).await?;
    Ok(ApiResponse::ok(transaction))
}

/// PATCH /api/transactions/{id}/status
pub async fn update_transaction_status<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> MarketResult<ApiResponse<Transaction>> {
    let transaction_id = parse_transaction_id(&id)?;
    let transaction = state
        .transactions()
        .update_status(&transaction_id, &req.status)
        .await?;
    Ok(ApiResponse::ok(transaction))
}

/// DELETE /api/transactions/{id}
pub async fn delete_transaction<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<()>> {
    let transaction_id = parse_transaction_id(&id)?;
    state.transactions().delete(&transaction_id).await?;
    Ok(ApiResponse::ok(()).with_message("Transaction deleted successfully"))
}

// ============================================================================
// Feedback
// ============================================================================

/// GET /api/feedback/project/{id}
pub async fn list_project_feedback<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<Vec<Feedback>>> {
    let project_id = parse_project_id(&id)?;
    let feedback = state.feedback().list_by_project(&project_id).await?;
    Ok(ApiResponse::ok(feedback))
}

/// POST /api/feedback
pub async fn create_feedback<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Json(req): Json<CreateFeedbackRequest>,
) -> MarketResult<impl IntoResponse> {
    let feedback = state
        .feedback()
        .add(&caller, req.project_id, req.rating, req.comment)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(feedback)))
}

/// PATCH /api/feedback/{id}
pub async fn update_feedback<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Path(id): Path<String>,
    Json(req): Json<UpdateFeedbackRequest>,
) -> MarketResult<ApiResponse<Feedback>> {
    let feedback_id = parse_feedback_id(&id)?;
    let feedback = state
        .feedback()
        .edit(&caller, &feedback_id, req.rating, req.comment)
        .await?;
    Ok(ApiResponse::ok(feedback))
}

/// DELETE /api/feedback/{id}
pub async fn delete_feedback<S: MarketStore>(
    State(state): State<MarketAppState<S>>,
    caller: AuthenticatedAccount,
    Path(id): Path<String>,
) -> MarketResult<ApiResponse<()>> {
    let feedback_id = parse_feedback_id(&id)?;
    state.feedback().delete(&caller, &feedback_id).await?;
    Ok(ApiResponse::ok(()).with_message("Feedback deleted successfully."))
}
