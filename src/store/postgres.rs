use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{debug, info};

use super::{CommitOutcome, SeatClaim, SeatStore};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{layout, Seat, SeatRecord};

/// Места в таблице `seats`. Бронь идёт в одной транзакции условными UPDATE'ами.
#[derive(Clone)]
pub struct PgSeatStore {
    pool: PgPool,
}

impl PgSeatStore {
    /// Пул, миграции таблицы `seats` и проверка, что в ней нет чужих строк.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;
        info!("Database connected");

        info!("Running seat migrations...");
        sqlx::migrate!("./src/migrations").run(&pool).await?;

        let store = Self { pool };
        let seats = store.load_all().await?;
        info!(
            "Seat table ready: {} of {} seats present",
            seats.len(),
            layout::TOTAL_SEATS
        );
        Ok(store)
    }
}

fn into_seats(records: Vec<SeatRecord>) -> Result<Vec<Seat>, StoreError> {
    records
        .into_iter()
        .map(|r| Seat::try_from(r).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn load_all(&self) -> Result<Vec<Seat>, StoreError> {
        // один SELECT — один снимок
        let records = sqlx::query_as::<_, SeatRecord>(
            "SELECT id, status, user_name, version FROM seats ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        into_seats(records)
    }

    async fn replace_all(&self, seats: &[Seat]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM seats")
            .execute(&mut *tx)
            .await?;

        for seat in seats {
            let record = SeatRecord::from(seat);
            sqlx::query(
                "INSERT INTO seats (id, status, user_name, version) VALUES ($1, $2, $3, $4)"
            )
            .bind(record.id)
            .bind(record.status)
            .bind(record.user_name)
            .bind(record.version)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn commit_booking(
        &self,
        claims: &[SeatClaim],
        holder: Option<&str>,
    ) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(claims.len());

        for claim in claims {
            let updated = sqlx::query_as::<_, SeatRecord>(
                r#"
                UPDATE seats
                SET status = 'booked', user_name = $1, version = version + 1
                WHERE id = $2 AND version = $3 AND status = 'available'
                RETURNING id, status, user_name, version
                "#
            )
            .bind(holder)
            .bind(claim.id as i32)
            .bind(claim.version as i64)
            .fetch_optional(&mut *tx)
            .await?;

            match updated {
                Some(record) => records.push(record),
                None => {
                    debug!("seat {} changed since snapshot, rolling back", claim.id);
                    // уже перевёрнутые места откатываются вместе с транзакцией
                    tx.rollback().await?;
                    return Ok(CommitOutcome::Stale { seat_id: claim.id });
                }
            }
        }

        tx.commit().await?;

        let mut seats = into_seats(records)?;
        seats.sort_by_key(Seat::id);
        Ok(CommitOutcome::Committed(seats))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
