use crate::domain::{models::tutor::Tutor, ports::TutorRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTutorRepo {
    pool: PgPool,
}

impl PostgresTutorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TutorRepository for PostgresTutorRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Tutor>, AppError> {
        sqlx::query_as::<_, Tutor>(
            "SELECT id, display_name, hourly_rate, created_at, updated_at FROM tutors WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn upsert(&self, tutor: &Tutor) -> Result<Tutor, AppError> {
        sqlx::query_as::<_, Tutor>(
            "INSERT INTO tutors (id, display_name, hourly_rate, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET display_name = excluded.display_name, hourly_rate = excluded.hourly_rate, updated_at = excluded.updated_at
             RETURNING id, display_name, hourly_rate, created_at, updated_at",
        )
            .bind(&tutor.id)
            .bind(&tutor.display_name)
            .bind(tutor.hourly_rate)
            .bind(tutor.created_at)
            .bind(tutor.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
