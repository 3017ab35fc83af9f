//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, ProjectId};
use kernel::money::Money;
use serde::{Deserialize, Serialize};

use crate::domain::entities::Project;
use crate::domain::value_objects::Screenshots;

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price: Money,
    pub source_url: String,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Public listing; the source location is never part of it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price: Money,
    pub owner_id: AccountId,
    pub screenshots: Screenshots,
    pub purchase_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            project_id: project.project_id,
            title: project.title,
            description: project.description,
            short_description: project.short_description,
            price: project.price,
            owner_id: project.owner_id,
            screenshots: project.screenshots,
            purchase_count: project.purchase_count,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    pub project_id: ProjectId,
    pub source_url: String,
}

// ============================================================================
// Transactions
// ============================================================================

/// The buyer is always the caller
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub project_id: ProjectId,
    pub amount: Money,
    #[serde(default)]
    pub commission: Option<Money>,
    /// Defaults to `successful`
    #[serde(default)]
    pub status: Option<String>,
}

/// Kept as a raw string so an unknown value maps to `InvalidStatus`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ============================================================================
// Feedback
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub project_id: ProjectId,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeedbackRequest {
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
}
