// src/store/maintenance.rs

use crate::error::AppError;

use super::Store;

const COLLECTIONS: [&str; 5] = ["subjects", "questions", "results", "exam_configs", "attributes"];

impl Store {
    /// Empties all five collections. Each is cleared on its own, so a failure
    /// part way leaves the earlier ones already empty.
    pub async fn clear_all_data(&self) -> Result<(), AppError> {
        let pool = self.pool().await?;
        for table in COLLECTIONS {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to clear {}: {:?}", table, e);
                    AppError::InternalServerError(e.to_string())
                })?;
        }

        tracing::warn!("All local data wiped");
        Ok(())
    }
}
