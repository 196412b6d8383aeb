// src/store/exam_configs.rs

use crate::{error::AppError, models::exam_config::ExamConfig};

use super::Store;

impl Store {
    pub async fn get_exam_configs(&self) -> Result<Vec<ExamConfig>, AppError> {
        let pool = self.pool().await?;
        let configs = sqlx::query_as::<_, ExamConfig>(
            "SELECT id, name, exam_type, level, subjects FROM exam_configs ORDER BY rowid",
        )
        .fetch_all(pool)
        .await?;

        Ok(configs)
    }

    pub async fn get_exam_config(&self, id: &str) -> Result<Option<ExamConfig>, AppError> {
        let pool = self.pool().await?;
        let config = sqlx::query_as::<_, ExamConfig>(
            "SELECT id, name, exam_type, level, subjects FROM exam_configs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(config)
    }

    pub async fn save_exam_config(&self, config: &ExamConfig) -> Result<(), AppError> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO exam_configs (id, name, exam_type, level, subjects)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                exam_type = excluded.exam_type,
                level = excluded.level,
                subjects = excluded.subjects
            "#,
        )
        .bind(&config.id)
        .bind(&config.name)
        .bind(&config.exam_type)
        .bind(&config.level)
        .bind(&config.subjects)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a template. Deleting an unknown id is not an error.
    pub async fn delete_exam_config(&self, id: &str) -> Result<(), AppError> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM exam_configs WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json;

    use crate::{
        models::exam_config::{ExamConfig, SubjectConfig},
        store::Store,
    };

    fn config(id: &str, counts: &[u32]) -> ExamConfig {
        ExamConfig {
            id: id.to_string(),
            name: "Midterm".to_string(),
            exam_type: "Final exam".to_string(),
            level: "Undergraduate".to_string(),
            subjects: Json(
                counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| SubjectConfig {
                        subject_id: format!("sub-{i}"),
                        subject_name: format!("Subject {i}"),
                        count,
                        time: 10,
                    })
                    .collect(),
            ),
        }
    }

    #[tokio::test]
    async fn round_trips_subject_list_in_order() {
        let store = Store::in_memory();
        let saved = config("exam-1", &[2, 3, 4]);
        store.save_exam_config(&saved).await.unwrap();

        let loaded = store.get_exam_config("exam-1").await.unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn delete_of_missing_config_is_noop() {
        let store = Store::in_memory();
        store.save_exam_config(&config("exam-1", &[1])).await.unwrap();
        store.delete_exam_config("exam-404").await.unwrap();
        assert_eq!(store.get_exam_configs().await.unwrap().len(), 1);

        store.delete_exam_config("exam-1").await.unwrap();
        assert!(store.get_exam_configs().await.unwrap().is_empty());
    }
}
