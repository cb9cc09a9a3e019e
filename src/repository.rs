//! Repository (spec §4.5): the only component that talks to Postgres.
//! Every write here is either a single upsert or a single keyed update —
//! there is no read-modify-write on `locations`, matching the "single
//! upsert statement" resource-model contract in spec §5.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::RepositoryError;
use crate::models::{Device, LocationConditions, User};

/// `locations` SELECT column list; kept in sync with `LocationConditions`.
const CONDITIONS_COLS: &str =
    "wave_height_m, wave_period_s, wind_speed_mps, wind_direction_deg, last_updated";

pub struct Repository {
    pool: PgPool,
}

impl Repository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Run the core's own migrations: `locations` and `devices` only.
    /// `users` is owned and migrated externally (spec_full §3).
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                location TEXT PRIMARY KEY,
                wave_height_m DOUBLE PRECISION NOT NULL,
                wave_period_s DOUBLE PRECISION NOT NULL,
                wind_speed_mps DOUBLE PRECISION NOT NULL,
                wind_direction_deg INTEGER NOT NULL,
                last_updated TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                device_id BIGINT PRIMARY KEY,
                user_id BIGINT NOT NULL,
                location TEXT NOT NULL,
                last_poll_time TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Distinct `devices.location` values currently assigned (spec §4.5).
    pub async fn locations_in_use(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT location FROM devices")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// `{device_id, user_id}` pairs for every device at `location`.
    pub async fn devices_at_location(&self, location: &str) -> Result<Vec<(i64, i64)>, RepositoryError> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT device_id, user_id FROM devices WHERE location = $1")
                .bind(location)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Upsert the one row for `location` — exactly one write per location
    /// per cycle regardless of device count (spec §8 invariant 1).
    pub async fn write_location_conditions(
        &self,
        location: &str,
        conditions: &LocationConditions,
    ) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO locations (location, {cols})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (location) DO UPDATE SET
                wave_height_m = EXCLUDED.wave_height_m,
                wave_period_s = EXCLUDED.wave_period_s,
                wind_speed_mps = EXCLUDED.wind_speed_mps,
                wind_direction_deg = EXCLUDED.wind_direction_deg,
                last_updated = EXCLUDED.last_updated
            "#,
            cols = CONDITIONS_COLS,
        ))
        .bind(location)
        .bind(conditions.wave_height_m)
        .bind(conditions.wave_period_s)
        .bind(conditions.wind_speed_mps)
        .bind(conditions.wind_direction_deg)
        .bind(conditions.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn read_location_conditions(
        &self,
        location: &str,
    ) -> Result<Option<LocationConditions>, RepositoryError> {
        let row = sqlx::query_as::<_, LocationConditions>(&format!(
            "SELECT {CONDITIONS_COLS} FROM locations WHERE location = $1"
        ))
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Best-effort last-poll update for a single device read. Not called
    /// by the Scheduler (spec §4.5) — only the Device Read API calls this,
    /// and only on a successful delivery. Concurrent updates to the same
    /// device coalesce with last-write-wins semantics (spec §5).
    pub async fn batch_update_device_last_poll(
        &self,
        device_ids: &[i64],
        t: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE devices SET last_poll_time = $1 WHERE device_id = ANY($2)")
            .bind(t)
            .bind(device_ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Single joined read backing the Device Read API. Fails with
    /// `DeviceNotFound` if the device or its user doesn't exist; a
    /// missing `LocationConditions` row is not an error — the caller
    /// builds a `data_available=false` envelope instead (spec §4.5).
    pub async fn read_device_view(
        &self,
        device_id: i64,
    ) -> Result<(Device, User, Option<LocationConditions>), RepositoryError> {
        let device: Device =
            sqlx::query_as("SELECT device_id, user_id, location, last_poll_time FROM devices WHERE device_id = $1")
                .bind(device_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(RepositoryError::DeviceNotFound)?;

        let user: User = sqlx::query_as(
            r#"
            SELECT user_id, location, wave_threshold_m, wind_threshold_knots,
                   wave_threshold_max_m, wind_threshold_max_knots, brightness_level,
                   theme, off_hours_enabled, off_hours_start, off_hours_end,
                   quiet_hours_enabled, quiet_hours_start, quiet_hours_end
            FROM users WHERE user_id = $1
            "#,
        )
        .bind(device.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::DeviceNotFound)?;

        let conditions = self.read_location_conditions(&device.location).await?;

        Ok((device, user, conditions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Repository tests that hit a real database are `#[ignore]`d by
    /// default; run with `cargo test -- --ignored` against a reachable
    /// `DATABASE_URL`.
    #[tokio::test]
    #[ignore]
    async fn write_then_read_location_conditions_round_trips() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored DB tests");
        let repo = Repository::connect(&database_url).await.unwrap();
        repo.migrate().await.unwrap();

        let conditions = LocationConditions {
            wave_height_m: 1.5,
            wave_period_s: 8.0,
            wind_speed_mps: 5.0,
            wind_direction_deg: 180,
            last_updated: Utc::now(),
        };
        repo.write_location_conditions("Hadera, Israel", &conditions)
            .await
            .unwrap();

        let read_back = repo
            .read_location_conditions("Hadera, Israel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read_back.wave_height_m, conditions.wave_height_m);
    }

    #[tokio::test]
    #[ignore]
    async fn unknown_device_is_device_not_found() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored DB tests");
        let repo = Repository::connect(&database_url).await.unwrap();
        repo.migrate().await.unwrap();

        let err = repo.read_device_view(i64::MAX).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DeviceNotFound));
    }
}
