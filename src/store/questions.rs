// src/store/questions.rs

use sqlx::{Sqlite, Transaction, types::Json};

use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionRow},
        subject::Subject,
    },
    store::hierarchy,
};

use super::{Store, subjects::upsert_subjects};

const SELECT_QUESTIONS: &str = r#"
    SELECT id, subject_id, content, image,
           option_a, option_b, option_c, option_d, option_images,
           correct_answer, explanation, explanation_image, status
    FROM questions
"#;

const UPSERT_QUESTION: &str = r#"
    INSERT INTO questions
        (id, subject_id, content, image,
         option_a, option_b, option_c, option_d, option_images,
         correct_answer, explanation, explanation_image, status)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        subject_id = excluded.subject_id,
        content = excluded.content,
        image = excluded.image,
        option_a = excluded.option_a,
        option_b = excluded.option_b,
        option_c = excluded.option_c,
        option_d = excluded.option_d,
        option_images = excluded.option_images,
        correct_answer = excluded.correct_answer,
        explanation = excluded.explanation,
        explanation_image = excluded.explanation_image,
        status = excluded.status
"#;

fn into_questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>, AppError> {
    rows.into_iter().map(Question::try_from).collect()
}

async fn upsert_questions(
    tx: &mut Transaction<'_, Sqlite>,
    questions: &[Question],
) -> Result<(), AppError> {
    for q in questions {
        sqlx::query(UPSERT_QUESTION)
            .bind(&q.id)
            .bind(&q.subject_id)
            .bind(&q.content)
            .bind(&q.image)
            .bind(&q.option_a)
            .bind(&q.option_b)
            .bind(&q.option_c)
            .bind(&q.option_d)
            .bind(q.option_images.as_ref().map(Json))
            .bind(q.correct_answer.as_str())
            .bind(&q.explanation)
            .bind(&q.explanation_image)
            .bind(q.status.as_i64())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// Bumps `total_questions` of each owning subject by its number of `questions`.
/// Subjects that do not exist are skipped.
async fn increment_counters(
    tx: &mut Transaction<'_, Sqlite>,
    questions: &[Question],
) -> Result<(), AppError> {
    let mut per_subject: Vec<(&str, i64)> = Vec::new();
    for q in questions {
        match per_subject.iter_mut().find(|(id, _)| *id == q.subject_id) {
            Some((_, n)) => *n += 1,
            None => per_subject.push((q.subject_id.as_str(), 1)),
        }
    }

    for (subject_id, added) in per_subject {
        sqlx::query("UPDATE subjects SET total_questions = total_questions + ? WHERE id = ?")
            .bind(added)
            .bind(subject_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

impl Store {
    /// Upserts every question in one transaction. Subject counters are untouched.
    pub async fn save_questions(&self, questions: &[Question]) -> Result<(), AppError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;
        upsert_questions(&mut tx, questions).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Saves new questions and bumps each owning subject's `total_questions`,
    /// all in one transaction.
    pub async fn add_questions(&self, questions: &[Question]) -> Result<(), AppError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;
        upsert_questions(&mut tx, questions).await?;
        increment_counters(&mut tx, questions).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes new subjects and new questions together, bumping subject counters,
    /// so a failed import leaves nothing behind.
    pub async fn import_batch(&self, subjects: &[Subject], questions: &[Question]) -> Result<(), AppError> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;
        upsert_subjects(&mut tx, subjects).await?;
        upsert_questions(&mut tx, questions).await?;
        increment_counters(&mut tx, questions).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_QUESTIONS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(Question::try_from).transpose()
    }

    /// Every stored question, in insertion order. Used for export.
    pub async fn get_all_questions(&self) -> Result<Vec<Question>, AppError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_QUESTIONS} ORDER BY rowid"))
            .fetch_all(pool)
            .await?;

        into_questions(rows)
    }

    /// Questions owned directly by `subject_id` (no descendants), via the subject index.
    pub async fn get_questions_by_subject(&self, subject_id: &str) -> Result<Vec<Question>, AppError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_QUESTIONS} WHERE subject_id = ? ORDER BY rowid"
        ))
        .bind(subject_id)
        .fetch_all(pool)
        .await?;

        into_questions(rows)
    }

    /// The recursive pool of `subject_id`: its own questions followed by those of
    /// every descendant, each subject visited once.
    pub async fn get_questions_by_subject_recursive(
        &self,
        subject_id: &str,
    ) -> Result<Vec<Question>, AppError> {
        let subjects = self.get_subjects().await?;
        let ids = hierarchy::descendant_closure(&subjects, subject_id);

        let mut pool = Vec::new();
        for id in &ids {
            pool.extend(self.get_questions_by_subject(id).await?);
        }

        tracing::debug!(
            "Resolved {} questions across {} subjects under {}",
            pool.len(),
            ids.len(),
            subject_id
        );
        Ok(pool)
    }
}
