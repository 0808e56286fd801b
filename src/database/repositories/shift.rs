use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Shift;

/// Persistence for shift records.
///
/// Writes are conditional on the version the caller read, so two read-modify-write
/// cycles on the same shift cannot both land: the loser gets `None` / `false` and must
/// re-read before deciding what to do.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn insert(&self, shift: &Shift) -> Result<Shift>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>>;

    /// Owned shifts ordered by date, then start time.
    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Shift>>;

    /// Stores `shift` with its version bumped, if the stored version is still
    /// `expected_version`. Returns the saved record, or `None` when it was stale or gone.
    async fn save_if_version(&self, shift: &Shift, expected_version: i64)
    -> Result<Option<Shift>>;

    async fn delete_if_version(&self, id: Uuid, expected_version: i64) -> Result<bool>;
}

const SHIFT_COLUMNS: &str = "id, title, role, type_of_shift, owner_user_id, location_id, date, \
     start_time, finish_time, num_of_shifts_per_day, clock_in_time, clock_out_time, \
     is_clocked_in, total_hours_worked, version, created_at, updated_at";

#[derive(Clone)]
pub struct PgShiftRepository {
    pool: PgPool,
}

impl PgShiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for PgShiftRepository {
    async fn insert(&self, shift: &Shift) -> Result<Shift> {
        let sql = format!(
            r#"
            INSERT INTO shifts ({SHIFT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {SHIFT_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, Shift>(&sql)
            .bind(shift.id)
            .bind(&shift.title)
            .bind(&shift.role)
            .bind(&shift.type_of_shift)
            .bind(shift.owner_user_id)
            .bind(shift.location_id)
            .bind(shift.date)
            .bind(shift.start_time)
            .bind(shift.finish_time)
            .bind(shift.num_of_shifts_per_day)
            .bind(shift.clock_in_time)
            .bind(shift.clock_out_time)
            .bind(shift.is_clocked_in)
            .bind(shift.total_hours_worked)
            .bind(shift.version)
            .bind(shift.created_at)
            .bind(shift.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = $1");

        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shift)
    }

    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Shift>> {
        let sql = format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE owner_user_id = $1 ORDER BY date, start_time"
        );

        let shifts = sqlx::query_as::<_, Shift>(&sql)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(shifts)
    }

    async fn save_if_version(
        &self,
        shift: &Shift,
        expected_version: i64,
    ) -> Result<Option<Shift>> {
        let sql = format!(
            r#"
            UPDATE shifts
            SET title = $2, role = $3, type_of_shift = $4, location_id = $5, date = $6,
                start_time = $7, finish_time = $8, num_of_shifts_per_day = $9,
                clock_in_time = $10, clock_out_time = $11, is_clocked_in = $12,
                total_hours_worked = $13, updated_at = $14, version = version + 1
            WHERE id = $1 AND version = $15
            RETURNING {SHIFT_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, Shift>(&sql)
            .bind(shift.id)
            .bind(&shift.title)
            .bind(&shift.role)
            .bind(&shift.type_of_shift)
            .bind(shift.location_id)
            .bind(shift.date)
            .bind(shift.start_time)
            .bind(shift.finish_time)
            .bind(shift.num_of_shifts_per_day)
            .bind(shift.clock_in_time)
            .bind(shift.clock_out_time)
            .bind(shift.is_clocked_in)
            .bind(shift.total_hours_worked)
            .bind(shift.updated_at)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn delete_if_version(&self, id: Uuid, expected_version: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
