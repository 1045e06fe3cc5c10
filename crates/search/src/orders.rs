use std::cmp::Ordering;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{SearchTerm, SortDirection};

/// The order fields the admin order search looks at.
#[derive(Debug, Clone, Copy)]
pub struct OrderKeys<'a> {
    pub number: &'a str,
    pub client_name: &'a str,
    pub client_email: &'a str,
    pub placed_at: Option<OffsetDateTime>,
}

/// Rank of an order hit. Declaration order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTier {
    ExactNumber,
    ExactContact,
    PrefixNumber,
    PrefixName,
    PrefixEmail,
    SubstringNumber,
    SubstringName,
    SubstringEmail,
}

impl OrderTier {
    /// Tier of the order with `keys` for `term`. An empty term matches
    /// nothing.
    pub fn of(keys: &OrderKeys<'_>, term: &SearchTerm) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        let number_term = term.as_str().strip_prefix('#').unwrap_or(term.as_str());
        Self::classify(keys, term.as_str(), number_term)
    }

    /// `number_term` is the term without its leading `#`; name and e-mail
    /// are matched against the full term.
    fn classify(keys: &OrderKeys<'_>, term: &str, number_term: &str) -> Option<Self> {
        let number = keys.number.to_lowercase();
        let name = keys.client_name.to_lowercase();
        let email = keys.client_email.to_lowercase();
        let has_number_term = !number_term.is_empty();

        if has_number_term && number == number_term {
            Some(Self::ExactNumber)
        } else if name == term || email == term {
            Some(Self::ExactContact)
        } else if has_number_term && number.starts_with(number_term) {
            Some(Self::PrefixNumber)
        } else if name.starts_with(term) {
            Some(Self::PrefixName)
        } else if email.starts_with(term) {
            Some(Self::PrefixEmail)
        } else if has_number_term && number.contains(number_term) {
            Some(Self::SubstringNumber)
        } else if name.contains(term) {
            Some(Self::SubstringName)
        } else if email.contains(term) {
            Some(Self::SubstringEmail)
        } else {
            None
        }
    }
}

/// Ranks orders for the admin order list.
///
/// Within a tier orders are sorted by `placed_at` (descending means newest
/// first); orders without a readable date count as the oldest.
pub fn rank_orders<T, F>(items: &[T], term: &str, direction: SortDirection, keys: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> OrderKeys<'_>,
{
    let term = SearchTerm::new(term);

    let mut hits: Vec<(Option<OrderTier>, OrderKeys<'_>, &T)> = items
        .iter()
        .filter_map(|item| {
            let item_keys = keys(item);
            let tier = if term.is_empty() {
                None
            } else {
                Some(OrderTier::of(&item_keys, &term)?)
            };
            Some((tier, item_keys, item))
        })
        .collect();

    hits.sort_by(|(tier_a, a, _), (tier_b, b, _)| {
        tier_a
            .cmp(tier_b)
            .then_with(|| direction.apply(chronological(a, b)))
    });

    hits.into_iter().map(|(_, _, item)| item.clone()).collect()
}

fn chronological(a: &OrderKeys<'_>, b: &OrderKeys<'_>) -> Ordering {
    a.placed_at
        .cmp(&b.placed_at)
        .then_with(|| a.number.cmp(b.number))
}
