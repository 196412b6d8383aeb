// src/store/results.rs

use crate::{error::AppError, models::exam_result::ExamResult};

use super::Store;

const SELECT_RESULTS: &str = r#"
    SELECT id, name, date, is_multi_subject, total_passed,
           subject_results, questions, user_answers, original_config
    FROM results
"#;

impl Store {
    /// Inserts a finished attempt. An existing id is a `Conflict`, never overwritten.
    pub async fn save_result(&self, result: &ExamResult) -> Result<(), AppError> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO results
                (id, name, date, is_multi_subject, total_passed,
                 subject_results, questions, user_answers, original_config)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(&result.name)
        .bind(result.date)
        .bind(result.is_multi_subject)
        .bind(result.total_passed)
        .bind(&result.subject_results)
        .bind(&result.questions)
        .bind(&result.user_answers)
        .bind(&result.original_config)
        .execute(pool)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if let AppError::Conflict(_) = err {
                return AppError::Conflict(format!("Result {} already exists", result.id));
            }
            err
        })?;

        tracing::info!("Saved result {} ({})", result.id, result.name);
        Ok(())
    }

    /// All results, newest first.
    pub async fn get_history(&self) -> Result<Vec<ExamResult>, AppError> {
        let pool = self.pool().await?;
        let results = sqlx::query_as::<_, ExamResult>(&format!(
            "{SELECT_RESULTS} ORDER BY date DESC, id DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(results)
    }

    pub async fn get_result(&self, id: &str) -> Result<Option<ExamResult>, AppError> {
        let pool = self.pool().await?;
        let result = sqlx::query_as::<_, ExamResult>(&format!("{SELECT_RESULTS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(result)
    }
}
