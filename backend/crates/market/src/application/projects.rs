//! Project Catalogue Use Case
//!
//! Listing, browsing and the pay-to-unlock source download.

use std::sync::Arc;

use auth::AuthenticatedAccount;
use kernel::id::{AccountId, ProjectId};
use kernel::money::Money;

use crate::application::config::MarketConfig;
use crate::domain::entities::Project;
use crate::domain::repository::{ProjectRepository, TransactionRepository};
use crate::domain::value_objects::Screenshots;
use crate::error::{MarketError, MarketResult};

const TITLE_MAX_CHARS: usize = 200;
const SHORT_DESCRIPTION_MAX_CHARS: usize = 300;

/// Input DTO for a new listing
#[derive(Debug, Clone)]
pub struct AddProjectInput {
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price: Money,
    pub source_url: String,
    pub screenshots: Vec<String>,
}

/// Project catalogue use case
pub struct ProjectCatalogUseCase<P, T>
where
    P: ProjectRepository,
    T: TransactionRepository,
{
    project_repo: Arc<P>,
    transaction_repo: Arc<T>,
    config: Arc<MarketConfig>,
}

impl<P, T> ProjectCatalogUseCase<P, T>
where
    P: ProjectRepository,
    T: TransactionRepository,
{
    pub fn new(project_repo: Arc<P>, transaction_repo: Arc<T>, config: Arc<MarketConfig>) -> Self {
        Self {
            project_repo,
            transaction_repo,
            config,
        }
    }

    pub async fn add(&self, owner_id: AccountId, input: AddProjectInput) -> MarketResult<Project> {
        let title = required("Title", input.title, TITLE_MAX_CHARS)?;
        let short_description =
            required("Short description", input.short_description, SHORT_DESCRIPTION_MAX_CHARS)?;
        let description = required("Description", input.description, usize::MAX)?;
        let source_url = required("Source location", input.source_url, usize::MAX)?;
        if !input.price.is_positive() {
            return Err(MarketError::InvalidAmount("Price must be greater than zero"));
        }
        let screenshots = Screenshots::new(input.screenshots, self.config.max_screenshots)?;

        let project = Project::new(
            owner_id,
            title,
            description,
            short_description,
            input.price,
            source_url,
            screenshots,
        );
        self.project_repo.create_project(&project).await?;

        tracing::info!(
            project_id = %project.project_id,
            owner_id = %owner_id,
            price = %project.price,
            "Project listed"
        );

        Ok(project)
    }

    pub async fn list(&self) -> MarketResult<Vec<Project>> {
        self.project_repo.list_projects().await
    }

    pub async fn get(&self, project_id: &ProjectId) -> MarketResult<Project> {
        self.project_repo
            .find_project(project_id)
            .await?
            .ok_or(MarketError::ProjectNotFound)
    }

    pub async fn list_by_owner(&self, owner_id: &AccountId) -> MarketResult<Vec<Project>> {
        self.project_repo.list_projects_by_owner(owner_id).await
    }

    pub async fn list_purchased(&self, buyer_id: &AccountId) -> MarketResult<Vec<Project>> {
        self.project_repo.list_purchased_projects(buyer_id).await
    }

    /// Source location for the owner, admins, or a buyer with a successful purchase
    pub async fn source(
        &self,
        project_id: &ProjectId,
        caller: &AuthenticatedAccount,
    ) -> MarketResult<String> {
        let project = self.get(project_id).await?;

        let unlocked = project.owner_id == caller.account_id
            || caller.is_admin()
            || self
                .transaction_repo
                .has_successful_purchase(&caller.account_id, project_id)
                .await?;

        if !unlocked {
            return Err(MarketError::Forbidden("Purchase this project to download its source"));
        }

        Ok(project.source_url)
    }
}

fn required(field: &str, value: String, max_chars: usize) -> MarketResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(MarketError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(MarketError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value)
}
