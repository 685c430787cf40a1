//! InMemory Submission Repository 実装

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{QuizId, RepositoryError, Submission, SubmissionRepository, UserId};

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    submissions: Mutex<Vec<Submission>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.submissions.lock().await.len()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn find_by_student(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let submissions = self.submissions.lock().await;
        Ok(submissions
            .iter()
            .find(|s| s.quiz_id == quiz_id && s.student_id == student_id)
            .cloned())
    }

    async fn save(&self, submission: Submission) -> Result<(), RepositoryError> {
        let mut submissions = self.submissions.lock().await;
        if submissions
            .iter()
            .any(|s| s.quiz_id == submission.quiz_id && s.student_id == submission.student_id)
        {
            return Err(RepositoryError::AlreadyExists);
        }
        submissions.push(submission);
        Ok(())
    }
}
