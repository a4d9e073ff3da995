use chrono::{DateTime, Utc};
use merca_pricing::{resolve_price_list, PriceList, PriceListAssignment};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct BookInner {
    lists: HashMap<Uuid, PriceList>,
    assignments: Vec<PriceListAssignment>,
}

/// In-memory catalogue of price lists and their company assignments,
/// fronting the assignment resolver.
#[derive(Default)]
pub struct PriceBook {
    inner: RwLock<BookInner>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_list(&self, list: PriceList) {
        self.inner.write().await.lists.insert(list.id, list);
    }

    pub async fn get_list(&self, id: Uuid) -> Option<PriceList> {
        self.inner.read().await.lists.get(&id).cloned()
    }

    pub async fn assign(&self, assignment: PriceListAssignment) {
        self.inner.write().await.assignments.push(assignment);
    }

    /// The single price list in effect for `company_id` at `now`, per the
    /// resolver's priority + recency rules.
    pub async fn resolve_for_company(
        &self,
        company_id: Uuid,
        now: DateTime<Utc>,
    ) -> Option<PriceList> {
        let inner = self.inner.read().await;
        let lists: Vec<PriceList> = inner.lists.values().cloned().collect();
        resolve_price_list(company_id, &inner.assignments, &lists, now).cloned()
    }
}
