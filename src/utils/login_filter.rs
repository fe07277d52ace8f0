use std::sync::{PoisonError, RwLock};

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static LOGIN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Login e-mails compare case-insensitively.
#[inline]
pub fn normalize(login: &str) -> String {
    login.trim().to_lowercase()
}

/// Check if a login might exist (false positives possible)
pub fn might_exist(login: &str) -> bool {
    LOGIN_FILTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&normalize(login))
}

pub fn insert(login: &str) {
    LOGIN_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .add(&normalize(login));
}

pub fn remove(login: &str) {
    LOGIN_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&normalize(login));
}

/// Warm up the login filter using streaming + batching
pub async fn warmup_login_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT user_id FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (login,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&login));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Login filter warmup complete: {} users", total);
    Ok(())
}

fn insert_batch(logins: &[String]) {
    let mut filter = LOGIN_FILTER.write().unwrap_or_else(PoisonError::into_inner);

    for login in logins {
        filter.add(login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_case_insensitive() {
        insert("Filter.Case@Test.com");
        assert!(might_exist("filter.case@test.com"));
        assert!(might_exist("  FILTER.CASE@TEST.COM "));
    }

    #[test]
    fn removed_logins_are_forgotten() {
        insert("filter.removed@test.com");
        remove("filter.removed@test.com");
        assert!(!might_exist("filter.removed@test.com"));
    }
}
