use crate::domain::ports::StudentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteStudentRepo {
    pool: SqlitePool,
}

impl SqliteStudentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepo {
    async fn has_used_trial(&self, student_id: &str) -> Result<bool, AppError> {
        let used: Option<bool> = sqlx::query_scalar("SELECT has_used_trial FROM students WHERE id = ?")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(used.unwrap_or(false))
    }

    async fn mark_trial_used(&self, student_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO students (id, has_used_trial, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET has_used_trial = excluded.has_used_trial, updated_at = excluded.updated_at",
        )
            .bind(student_id)
            .bind(true)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
