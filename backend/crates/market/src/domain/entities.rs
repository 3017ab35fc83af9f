//! Domain Entities
//!
//! Core business entities for the market domain.

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, FeedbackId, ProjectId, TransactionId};
use kernel::money::Money;
use serde::Serialize;

use crate::domain::services::CommissionSplit;
use crate::domain::value_objects::{Rating, Screenshots, TransactionStatus};

/// A listed project (source code for sale)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price: Money,
    pub owner_id: AccountId,
    /// Download location, revealed only to owner, admins and buyers
    pub source_url: String,
    pub screenshots: Screenshots,
    /// Only ever incremented by a successful settlement
    pub purchase_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        owner_id: AccountId,
        title: String,
        description: String,
        short_description: String,
        price: Money,
        source_url: String,
        screenshots: Screenshots,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: ProjectId::new(),
            title,
            description,
            short_description,
            price,
            owner_id,
            source_url,
            screenshots,
            purchase_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Settlement record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub project_id: ProjectId,
    pub buyer_id: AccountId,
    pub amount: Money,
    pub commission: Money,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        project_id: ProjectId,
        buyer_id: AccountId,
        split: CommissionSplit,
        status: TransactionStatus,
    ) -> Self {
        Self {
            transaction_id: TransactionId::new(),
            project_id,
            buyer_id,
            amount: split.amount(),
            commission: split.commission(),
            status,
            created_at: Utc::now(),
        }
    }

    /// What the project owner receives
    pub fn owner_share(&self) -> Money {
        // commission <= amount is a table constraint
        self.amount.checked_sub(self.commission).unwrap_or(Money::ZERO)
    }
}

/// Rating and comment left on a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub feedback_id: FeedbackId,
    pub project_id: ProjectId,
    pub author_id: AccountId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(project_id: ProjectId, author_id: AccountId, rating: Rating, comment: String) -> Self {
        let now = Utc::now();
        Self {
            feedback_id: FeedbackId::new(),
            project_id,
            author_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, rating: Option<Rating>, comment: Option<String>) {
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(comment) = comment {
            self.comment = comment;
        }
        self.updated_at = Utc::now();
    }
}
