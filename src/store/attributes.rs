// src/store/attributes.rs

use sqlx::types::Json;

use crate::{
    config::ATTRIBUTES_KEY,
    error::AppError,
    models::attributes::{AppAttributes, AttributesRow},
};

use super::Store;

impl Store {
    /// The attribute singleton. Missing records and read failures both yield the defaults.
    pub async fn get_attributes(&self) -> AppAttributes {
        match self.load_attributes().await {
            Ok(Some(attrs)) => attrs,
            Ok(None) => AppAttributes::default(),
            Err(e) => {
                tracing::warn!("Falling back to default attributes: {}", e);
                AppAttributes::default()
            }
        }
    }

    async fn load_attributes(&self) -> Result<Option<AppAttributes>, AppError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, AttributesRow>(
            "SELECT exam_types, levels, subject_types FROM attributes WHERE id = ?",
        )
        .bind(ATTRIBUTES_KEY)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(AppAttributes::from))
    }

    /// Upserts the singleton at its fixed key.
    pub async fn save_attributes(&self, attrs: &AppAttributes) -> Result<(), AppError> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO attributes (id, exam_types, levels, subject_types)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                exam_types = excluded.exam_types,
                levels = excluded.levels,
                subject_types = excluded.subject_types
            "#,
        )
        .bind(ATTRIBUTES_KEY)
        .bind(Json(&attrs.exam_types))
        .bind(Json(&attrs.levels))
        .bind(Json(&attrs.subject_types))
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        models::attributes::{AppAttributes, AttributeKind},
        store::Store,
    };

    #[tokio::test]
    async fn missing_record_reads_as_defaults() {
        let store = Store::in_memory();
        assert_eq!(store.get_attributes().await, AppAttributes::default());
    }

    #[tokio::test]
    async fn unreachable_store_reads_as_defaults() {
        let store = Store::new("sqlite:///nonexistent-dir/for/sure/quiz.db", 1);
        assert_eq!(store.get_attributes().await, AppAttributes::default());
    }

    #[tokio::test]
    async fn save_is_idempotent_upsert() {
        let store = Store::in_memory();
        let mut attrs = AppAttributes::default();
        attrs.add(AttributeKind::SubjectTypes, "Elective").unwrap();

        store.save_attributes(&attrs).await.unwrap();
        store.save_attributes(&attrs).await.unwrap();

        assert_eq!(store.get_attributes().await, attrs);
    }
}
