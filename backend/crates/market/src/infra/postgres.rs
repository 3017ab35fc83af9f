//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, FeedbackId, ProjectId, TransactionId};
use kernel::money::Money;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::entities::{Feedback, Project, Transaction};
use crate::domain::repository::{
    FeedbackRepository, ProjectRepository, SettlementLedger, TransactionRepository,
};
use crate::domain::value_objects::{Rating, Screenshots, TransactionStatus};
use crate::error::{MarketError, MarketResult};

const PROJECT_COLUMNS: &str = r#"
    p.project_id,
    p.title,
    p.description,
    p.short_description,
    p.price,
    p.owner_id,
    p.source_url,
    p.screenshots,
    p.purchase_count,
    p.created_at,
    p.updated_at
"#;

const TRANSACTION_COLUMNS: &str = r#"
    transaction_id,
    project_id,
    buyer_id,
    amount,
    commission,
    status,
    created_at
"#;

const FEEDBACK_COLUMNS: &str = r#"
    feedback_id,
    project_id,
    author_id,
    rating,
    comment,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed market repository
#[derive(Clone)]
pub struct PgMarketRepository {
    pool: PgPool,
}

impl PgMarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Project Repository Implementation
// ============================================================================

impl ProjectRepository for PgMarketRepository {
    async fn create_project(&self, project: &Project) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                project_id,
                title,
                description,
                short_description,
                price,
                owner_id,
                source_url,
                screenshots,
                purchase_count,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(project.project_id.as_uuid())
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.short_description)
        .bind(project.price.amount())
        .bind(project.owner_id.as_uuid())
        .bind(&project.source_url)
        .bind(project.screenshots.as_slice())
        .bind(project.purchase_count as i64)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_project(&self, project_id: &ProjectId) -> MarketResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.project_id = $1"
        ))
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProjectRow::into_project).transpose()
    }

    async fn list_projects(&self) -> MarketResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p ORDER BY p.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    async fn list_projects_by_owner(&self, owner_id: &AccountId) -> MarketResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.owner_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    async fn list_purchased_projects(&self, buyer_id: &AccountId) -> MarketResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects p
            WHERE EXISTS (
                SELECT 1 FROM transactions t
                WHERE t.project_id = p.project_id
                  AND t.buyer_id = $1
                  AND t.status = 'successful'
            )
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(buyer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }
}

// ============================================================================
// Transaction Repository Implementation
// ============================================================================

impl TransactionRepository for PgMarketRepository {
    async fn find_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> MarketResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = $1"
        ))
        .bind(transaction_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRow::into_transaction).transpose()
    }

    async fn list_transactions(&self) -> MarketResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
    ) -> MarketResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions SET status = $2 WHERE transaction_id = $1 RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(transaction_id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRow::into_transaction).transpose()
    }

    async fn delete_transaction(&self, transaction_id: &TransactionId) -> MarketResult<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE transaction_id = $1")
            .bind(transaction_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_successful_purchase(
        &self,
        buyer_id: &AccountId,
        project_id: &ProjectId,
    ) -> MarketResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactions
                WHERE buyer_id = $1 AND project_id = $2 AND status = 'successful'
            )
            "#,
        )
        .bind(buyer_id.as_uuid())
        .bind(project_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }
}

// ============================================================================
// Feedback Repository Implementation
// ============================================================================

impl FeedbackRepository for PgMarketRepository {
    async fn create_feedback(&self, feedback: &Feedback) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (
                feedback_id,
                project_id,
                author_id,
                rating,
                comment,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(feedback.feedback_id.as_uuid())
        .bind(feedback.project_id.as_uuid())
        .bind(feedback.author_id.as_uuid())
        .bind(feedback.rating.stars() as i16)
        .bind(&feedback.comment)
        .bind(feedback.created_at)
        .bind(feedback.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<Option<Feedback>> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE feedback_id = $1"
        ))
        .bind(feedback_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FeedbackRow::into_feedback).transpose()
    }

    async fn list_feedback_by_project(&self, project_id: &ProjectId) -> MarketResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE project_id = $1 ORDER BY created_at"
        ))
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FeedbackRow::into_feedback).collect()
    }

    async fn update_feedback(&self, feedback: &Feedback) -> MarketResult<bool> {
        let result = sqlx::query(
            "UPDATE feedback SET rating = $2, comment = $3, updated_at = $4 WHERE feedback_id = $1",
        )
        .bind(feedback.feedback_id.as_uuid())
        .bind(feedback.rating.stars() as i16)
        .bind(&feedback.comment)
        .bind(feedback.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<bool> {
        let result = sqlx::query("DELETE FROM feedback WHERE feedback_id = $1")
            .bind(feedback_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Settlement Ledger Implementation
// ============================================================================

impl SettlementLedger for PgMarketRepository {
    async fn settle(
        &self,
        transaction: &Transaction,
        platform_account_id: &AccountId,
    ) -> MarketResult<Transaction> {
        // Dropping `tx` without commit rolls everything back
        let mut tx = self.pool.begin().await?;

        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT owner_id FROM projects WHERE project_id = $1 FOR UPDATE")
                .bind(transaction.project_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        let owner_id = owner.ok_or(MarketError::ProjectNotFound)?.0;

        // Lock every account this settlement touches in one fixed order so
        // concurrent settlements cannot deadlock on each other
        let mut touched = vec![*transaction.buyer_id.as_uuid()];
        if transaction.status.is_successful() {
            touched.push(owner_id);
            touched.push(*platform_account_id.as_uuid());
        }
        sqlx::query("SELECT account_id FROM accounts WHERE account_id = ANY($1) ORDER BY account_id FOR UPDATE")
            .bind(touched.as_slice())
            .fetch_all(&mut *tx)
            .await?;

        let balance: Option<(Decimal,)> =
            sqlx::query_as("SELECT wallet_balance FROM accounts WHERE account_id = $1")
                .bind(transaction.buyer_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        let balance = balance.ok_or(MarketError::BuyerNotFound)?.0;
        if balance < transaction.amount.amount() {
            return Err(MarketError::InsufficientFunds);
        }

        if transaction.status.is_successful() {
            let debited = sqlx::query(
                r#"
                UPDATE accounts
                SET wallet_balance = wallet_balance - $2, updated_at = NOW()
                WHERE account_id = $1 AND wallet_balance >= $2
                "#,
            )
            .bind(transaction.buyer_id.as_uuid())
            .bind(transaction.amount.amount())
            .execute(&mut *tx)
            .await?;
            if debited.rows_affected() != 1 {
                return Err(MarketError::InsufficientFunds);
            }
        }

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions (
                transaction_id,
                project_id,
                buyer_id,
                amount,
                commission,
                status,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(transaction.transaction_id.as_uuid())
        .bind(transaction.project_id.as_uuid())
        .bind(transaction.buyer_id.as_uuid())
        .bind(transaction.amount.amount())
        .bind(transaction.commission.amount())
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .fetch_one(&mut *tx)
        .await?;

        if transaction.status.is_successful() {
            if !credit(&mut tx, platform_account_id.as_uuid(), transaction.commission).await? {
                return Err(MarketError::PlatformAccountNotFound);
            }
            if !credit(&mut tx, &owner_id, transaction.owner_share()).await? {
                return Err(MarketError::OwnerNotFound);
            }

            sqlx::query(
                r#"
                UPDATE projects
                SET purchase_count = purchase_count + 1, updated_at = NOW()
                WHERE project_id = $1
                "#,
            )
            .bind(transaction.project_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_transaction()
    }
}

/// Returns false when the account does not exist
async fn credit(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    account_id: &Uuid,
    amount: Money,
) -> MarketResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET wallet_balance = wallet_balance + $2, updated_at = NOW()
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .bind(amount.amount())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProjectRow {
    project_id: Uuid,
    title: String,
    description: String,
    short_description: String,
    price: Decimal,
    owner_id: Uuid,
    source_url: String,
    screenshots: Vec<String>,
    purchase_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> MarketResult<Project> {
        let price = Money::new(self.price)
            .map_err(|e| MarketError::Internal(format!("Invalid price: {e}")))?;
        let purchase_count = u64::try_from(self.purchase_count)
            .map_err(|e| MarketError::Internal(format!("Invalid purchase_count: {e}")))?;

        Ok(Project {
            project_id: ProjectId::from_uuid(self.project_id),
            title: self.title,
            description: self.description,
            short_description: self.short_description,
            price,
            owner_id: AccountId::from_uuid(self.owner_id),
            source_url: self.source_url,
            screenshots: Screenshots::from_db(self.screenshots),
            purchase_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    transaction_id: Uuid,
    project_id: Uuid,
    buyer_id: Uuid,
    amount: Decimal,
    commission: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> MarketResult<Transaction> {
        let amount = Money::new(self.amount)
            .map_err(|e| MarketError::Internal(format!("Invalid amount: {e}")))?;
        let commission = Money::new(self.commission)
            .map_err(|e| MarketError::Internal(format!("Invalid commission: {e}")))?;
        let status = self
            .status
            .parse()
            .map_err(|_| MarketError::Internal(format!("Invalid status: {}", self.status)))?;

        Ok(Transaction {
            transaction_id: TransactionId::from_uuid(self.transaction_id),
            project_id: ProjectId::from_uuid(self.project_id),
            buyer_id: AccountId::from_uuid(self.buyer_id),
            amount,
            commission,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    feedback_id: Uuid,
    project_id: Uuid,
    author_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeedbackRow {
    fn into_feedback(self) -> MarketResult<Feedback> {
        let rating = u8::try_from(self.rating)
            .ok()
            .and_then(Rating::new)
            .ok_or_else(|| MarketError::Internal(format!("Invalid rating: {}", self.rating)))?;

        Ok(Feedback {
            feedback_id: FeedbackId::from_uuid(self.feedback_id),
            project_id: ProjectId::from_uuid(self.project_id),
            author_id: AccountId::from_uuid(self.author_id),
            rating,
            comment: self.comment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
