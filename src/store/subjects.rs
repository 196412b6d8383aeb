// src/store/subjects.rs

use sqlx::{Sqlite, Transaction};

use crate::{error::AppError, models::subject::Subject, store::hierarchy};

use super::Store;

const UPSERT_SUBJECT: &str = r#"
    INSERT INTO subjects
        (id, name, parent_id, exam_type, level, category,
         total_questions, learned_count, need_review_count)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        parent_id = excluded.parent_id,
        exam_type = excluded.exam_type,
        level = excluded.level,
        category = excluded.category,
        total_questions = excluded.total_questions,
        learned_count = excluded.learned_count,
        need_review_count = excluded.need_review_count
"#;

pub(super) async fn upsert_subjects(
    tx: &mut Transaction<'_, Sqlite>,
    subjects: &[Subject],
) -> Result<(), AppError> {
    for s in subjects {
        sqlx::query(UPSERT_SUBJECT)
            .bind(&s.id)
            .bind(&s.name)
            .bind(&s.parent_id)
            .bind(&s.exam_type)
            .bind(&s.level)
            .bind(&s.category)
            .bind(s.total_questions)
            .bind(s.learned_count)
            .bind(s.need_review_count)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

impl Store {
    /// All subjects in insertion order.
    pub async fn get_subjects(&self) -> Result<Vec<Subject>, AppError> {
        let pool = self.pool().await?;
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, parent_id, exam_type, level, category,
                   total_questions, learned_count, need_review_count
            FROM subjects
            ORDER BY rowid
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(subjects)
    }

    pub async fn get_subject(&self, id: &str) -> Result<Option<Subject>, AppError> {
        let pool = self.pool().await?;
        let subject = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, parent_id, exam_type, level, category,
                   total_questions, learned_count, need_review_count
            FROM subjects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subject)
    }

    /// Upserts every subject in one transaction.
    pub async fn save_subjects(&self, subjects: &[Subject]) -> Result<(), AppError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;
        upsert_subjects(&mut tx, subjects).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Case-insensitive exact name match over the full subject list; first match wins.
    pub async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>, AppError> {
        let wanted = name.to_lowercase();
        Ok(self
            .get_subjects()
            .await?
            .into_iter()
            .find(|s| s.name.to_lowercase() == wanted))
    }

    /// Deletes a subject, every descendant subject and all of their questions.
    ///
    /// The subtree is resolved up front and a parent cycle aborts before any
    /// delete. Each subject then goes in its own transaction, children first,
    /// so a failure part way leaves the not-yet-visited ancestors intact.
    pub async fn delete_subject(&self, id: &str) -> Result<(), AppError> {
        let subjects = self.get_subjects().await?;
        let order = hierarchy::deletion_order(&subjects, id)?;

        let pool = self.pool().await?;
        for subject_id in &order {
            let mut tx = pool.begin().await?;

            let removed = sqlx::query("DELETE FROM questions WHERE subject_id = ?")
                .bind(subject_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            sqlx::query("DELETE FROM subjects WHERE id = ?")
                .bind(subject_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await.map_err(|e| {
                tracing::error!("Failed to delete subject {}: {:?}", subject_id, e);
                AppError::InternalServerError(e.to_string())
            })?;

            tracing::debug!("Deleted subject {} with {} questions", subject_id, removed);
        }

        tracing::info!("Deleted subject {} and {} descendants", id, order.len() - 1);
        Ok(())
    }
}
