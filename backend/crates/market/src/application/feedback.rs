//! Feedback Use Case

use std::sync::Arc;

use auth::AuthenticatedAccount;
use kernel::id::{FeedbackId, ProjectId};

use crate::domain::entities::Feedback;
use crate::domain::repository::{FeedbackRepository, ProjectRepository};
use crate::domain::value_objects::Rating;
use crate::error::{MarketError, MarketResult};

const COMMENT_MAX_CHARS: usize = 2_000;

/// Feedback use case
pub struct FeedbackUseCase<F, P>
where
    F: FeedbackRepository,
    P: ProjectRepository,
{
    feedback_repo: Arc<F>,
    project_repo: Arc<P>,
}

impl<F, P> FeedbackUseCase<F, P>
where
    F: FeedbackRepository,
    P: ProjectRepository,
{
    pub fn new(feedback_repo: Arc<F>, project_repo: Arc<P>) -> Self {
        Self {
            feedback_repo,
            project_repo,
        }
    }

    pub async fn add(
        &self,
        caller: &AuthenticatedAccount,
        project_id: ProjectId,
        rating: u8,
        comment: String,
    ) -> MarketResult<Feedback> {
        let rating = parse_rating(rating)?;
        let comment = parse_comment(comment)?;

        if self.project_repo.find_project(&project_id).await?.is_none() {
            return Err(MarketError::ProjectNotFound);
        }

        let feedback = Feedback::new(project_id, caller.account_id, rating, comment);
        self.feedback_repo.create_feedback(&feedback).await?;

        tracing::info!(
            feedback_id = %feedback.feedback_id,
            project_id = %project_id,
            rating = rating.stars(),
            "Feedback added"
        );

        Ok(feedback)
    }

    pub async fn list_by_project(&self, project_id: &ProjectId) -> MarketResult<Vec<Feedback>> {
        self.feedback_repo.list_feedback_by_project(project_id).await
    }

    /// Only the author may edit
    pub async fn edit(
        &self,
        caller: &AuthenticatedAccount,
        feedback_id: &FeedbackId,
        rating: Option<u8>,
        comment: Option<String>,
    ) -> MarketResult<Feedback> {
        let mut feedback = self
            .feedback_repo
            .find_feedback(feedback_id)
            .await?
            .ok_or(MarketError::FeedbackNotFound)?;

        if feedback.author_id != caller.account_id {
            return Err(MarketError::Forbidden("You can only edit your own feedback"));
        }

        let rating = rating.map(parse_rating).transpose()?;
        let comment = comment.map(parse_comment).transpose()?;
        feedback.edit(rating, comment);

        if !self.feedback_repo.update_feedback(&feedback).await? {
            return Err(MarketError::FeedbackNotFound);
        }

        Ok(feedback)
    }

    /// The author or an admin may delete
    pub async fn delete(
        &self,
        caller: &AuthenticatedAccount,
        feedback_id: &FeedbackId,
    ) -> MarketResult<()> {
        let feedback = self
            .feedback_repo
            .find_feedback(feedback_id)
            .await?
            .ok_or(MarketError::FeedbackNotFound)?;

        if feedback.author_id != caller.account_id && !caller.is_admin() {
            return Err(MarketError::Forbidden("You can only delete your own feedback"));
        }

        if !self.feedback_repo.delete_feedback(feedback_id).await? {
            return Err(MarketError::FeedbackNotFound);
        }

        tracing::info!(feedback_id = %feedback_id, "Feedback deleted");

        Ok(())
    }
}

fn parse_rating(stars: u8) -> MarketResult<Rating> {
    Rating::new(stars)
        .ok_or_else(|| MarketError::Validation("Rating must be between 1 and 5".into()))
}

fn parse_comment(comment: String) -> MarketResult<String> {
    let comment = comment.trim().to_string();
    if comment.chars().count() > COMMENT_MAX_CHARS {
        return Err(MarketError::Validation(format!(
            "Comment must be at most {COMMENT_MAX_CHARS} characters"
        )));
    }
    Ok(comment)
}
