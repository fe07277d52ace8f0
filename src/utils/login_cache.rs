use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

use crate::utils::login_filter::normalize;

/// Logins known to be taken. Absence means "unknown", not "available".
pub static LOGIN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn mark_taken(login: &str) {
    LOGIN_CACHE.insert(normalize(login), true).await;
}

pub async fn is_taken(login: &str) -> bool {
    LOGIN_CACHE.get(&normalize(login)).await.unwrap_or(false)
}

pub async fn forget(login: &str) {
    LOGIN_CACHE.invalidate(&normalize(login)).await;
}

async fn batch_mark(logins: &[String]) {
    let futures: Vec<_> = logins
        .iter()
        .map(|l| LOGIN_CACHE.insert(normalize(l), true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load only logins used in the last `days` days, in batches.
pub async fn warmup_login_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT user_id
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (login,) = row?;
        batch.push(login);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Login cache warmup complete: {} recent users (last {} days)",
        total_count,
        days
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn taken_until_forgotten() {
        assert!(!is_taken("cache.user@test.com").await);
        mark_taken("Cache.User@test.com").await;
        assert!(is_taken("cache.user@test.com").await);
        forget("cache.user@test.com").await;
        assert!(!is_taken("cache.user@test.com").await);
    }
}
