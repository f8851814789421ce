//! Места в Redis: по хешу `seat:{id}` с полями `status`, `user_name`, `version`.
//!
//! Снимок читается одним MULTI/EXEC, бронь проверяется и применяется Lua-скриптом,
//! так что compare-and-set атомарен на стороне сервера.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{CommitOutcome, SeatClaim, SeatStore};
use redis::{aio::MultiplexedConnection, Client};

use crate::config::RedisConfig;
use crate::error::StoreError;
use crate::models::{layout, InvalidSeat, Seat, SeatStatus};

// Возвращает 0 при успехе или 1-based индекс первого устаревшего места.
// ARGV[1] — держатель ("" если нет), ARGV[i + 1] — версия для KEYS[i].
const COMMIT_SCRIPT: &str = r#"
for i, key in ipairs(KEYS) do
  local status = redis.call('HGET', key, 'status')
  local version = redis.call('HGET', key, 'version')
  if status ~= 'available' or version ~= ARGV[i + 1] then
    return i
  end
end
for i, key in ipairs(KEYS) do
  local next_version = tostring(tonumber(ARGV[i + 1]) + 1)
  redis.call('HSET', key, 'status', 'booked', 'version', next_version)
  if ARGV[1] ~= '' then
    redis.call('HSET', key, 'user_name', ARGV[1])
  end
end
return 0
"#;

fn seat_key(id: u32) -> String {
    format!("seat:{}", id)
}

#[derive(Clone)]
pub struct RedisSeatStore {
    conn: MultiplexedConnection,
}

impl RedisSeatStore {
    /// Подключиться и посчитать, сколько хешей `seat:{id}` уже лежит в Redis.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        info!("Redis connected");

        let mut pipe = redis::pipe();
        for id in 1..=layout::TOTAL_SEATS {
            pipe.exists(seat_key(id));
        }
        let present: Vec<bool> = pipe.query_async(&mut conn).await?;
        info!(
            "Seat keys ready: {} of {} seats present",
            present.iter().filter(|p| **p).count(),
            layout::TOTAL_SEATS
        );

        Ok(Self { conn })
    }
}

fn decode(id: u32, fields: HashMap<String, String>) -> Result<Option<Seat>, StoreError> {
    // пустой хеш — места нет (инвентарь ещё не инициализирован)
    if fields.is_empty() {
        return Ok(None);
    }
    let status: SeatStatus = fields
        .get("status")
        .ok_or_else(|| InvalidSeat::UnknownStatus(String::new()))?
        .parse()?;
    let raw_version = fields.get("version").map(String::as_str).unwrap_or_default();
    // Lua-скрипт сравнивает версию как строку, поэтому мусор здесь не прощаем
    let version = raw_version
        .parse::<u64>()
        .map_err(|_| InvalidSeat::UnreadableVersion(id, raw_version.to_string()))?;
    let holder = fields.get("user_name").cloned();
    Ok(Some(Seat::restore(id, status, holder, version)?))
}

#[async_trait]
impl SeatStore for RedisSeatStore {
    async fn load_all(&self) -> Result<Vec<Seat>, StoreError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for id in 1..=layout::TOTAL_SEATS {
            pipe.hgetall(seat_key(id));
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        let mut seats = Vec::with_capacity(hashes.len());
        for (id, fields) in (1..=layout::TOTAL_SEATS).zip(hashes) {
            if let Some(seat) = decode(id, fields)? {
                seats.push(seat);
            }
        }
        Ok(seats)
    }

    async fn replace_all(&self, seats: &[Seat]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();

        let keys: Vec<String> = (1..=layout::TOTAL_SEATS).map(seat_key).collect();
        pipe.del(keys).ignore();

        for seat in seats {
            let key = seat_key(seat.id());
            let version = seat.version().to_string();
            pipe.hset_multiple(&key, &[("status", seat.status().as_str()), ("version", version.as_str())])
                .ignore();
            if let Some(holder) = seat.holder() {
                pipe.hset(&key, "user_name", holder).ignore();
            }
        }

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn commit_booking(
        &self,
        claims: &[SeatClaim],
        holder: Option<&str>,
    ) -> Result<CommitOutcome, StoreError> {
        let mut conn = self.conn.clone();
        let script = redis::Script::new(COMMIT_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation.arg(holder.unwrap_or(""));
        for claim in claims {
            invocation.key(seat_key(claim.id));
            invocation.arg(claim.version.to_string());
        }

        let stale_index: usize = invocation.invoke_async(&mut conn).await?;
        if stale_index > 0 {
            let seat_id = claims[stale_index - 1].id;
            debug!("seat {} changed since snapshot, script left inventory untouched", seat_id);
            return Ok(CommitOutcome::Stale { seat_id });
        }

        let mut seats = claims
            .iter()
            .map(|c| {
                Seat::restore(c.id, SeatStatus::Booked, holder.map(str::to_owned), c.version + 1)
                    .map_err(StoreError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        seats.sort_by_key(Seat::id);
        Ok(CommitOutcome::Committed(seats))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
