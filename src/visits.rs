use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Process-lifetime public page view counts.
///
/// Starts empty at process start, is never persisted and is not shared
/// between instances. Holds at most `capacity` users; recording a new user
/// when full evicts the least-visited one.
#[derive(Clone)]
pub struct VisitCounter {
    // Map: user_id -> visits
    counts: Arc<Mutex<HashMap<Uuid, u64>>>,
    capacity: usize,
}

impl VisitCounter {
    pub fn new(capacity: usize) -> Self {
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Count one visit and return the new total
    pub async fn record(&self, user_id: Uuid) -> u64 {
        let mut counts = self.counts.lock().await;

        if !counts.contains_key(&user_id) && counts.len() >= self.capacity {
            let coldest = counts
                .iter()
                .min_by_key(|(_, visits)| **visits)
                .map(|(id, _)| *id);
            if let Some(id) = coldest {
                counts.remove(&id);
                tracing::debug!("Visit counter full, evicted {}", id);
            }
        }

        let visits = counts.entry(user_id).or_insert(0);
        *visits += 1;
        *visits
    }

    /// Current total without counting a visit
    pub async fn get(&self, user_id: Uuid) -> u64 {
        self.counts
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }
}
