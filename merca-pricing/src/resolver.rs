use crate::models::{PriceList, PriceListAssignment};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use uuid::Uuid;

/// Resolve the single price list in effect for a company at `now`.
///
/// Among the company's assignments whose referenced list exists and is
/// inside its effective window, the lowest `priority` number wins. Equal
/// priorities are broken deterministically: the most recently assigned
/// list wins.
pub fn resolve_price_list<'a>(
    company_id: Uuid,
    assignments: &[PriceListAssignment],
    lists: &'a [PriceList],
    now: DateTime<Utc>,
) -> Option<&'a PriceList> {
    assignments
        .iter()
        .filter(|a| a.company_id == company_id)
        .filter_map(|a| {
            lists
                .iter()
                .find(|l| l.id == a.price_list_id && l.is_effective_at(now))
                .map(|l| (a, l))
        })
        .min_by_key(|(a, _)| (a.priority, Reverse(a.assigned_at)))
        .map(|(_, list)| list)
}
