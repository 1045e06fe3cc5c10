//! Tiered local search and ordering over already-fetched lists.
//!
//! Every admin list in the storefront (coupons, genres, authors, categories,
//! orders) narrows the page it fetched with the same ranking: exact match
//! first, then prefix, then substring, all case-insensitive. Entities that
//! match no tier are dropped; inside a tier the requested sort direction
//! applies.
//!
//! Inputs are borrowed and never reordered. Each call returns a fresh `Vec`,
//! so a list shared between requests keeps the order the backend sent.

mod collate;
mod orders;
mod tier;

use std::cmp::Ordering;

pub use collate::{collation_key, compare as collate};
pub use orders::{rank_orders, OrderKeys, OrderTier};
pub use tier::{MatchTier, SearchTerm, SortDirection};

/// Ranks `items` by how well `field` matches `term`.
///
/// An empty (or whitespace-only) term keeps every item and only sorts.
pub fn rank_by<T, F>(items: &[T], term: &str, direction: SortDirection, field: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let term = SearchTerm::new(term);

    let mut hits: Vec<(Option<MatchTier>, String, &T)> = items
        .iter()
        .filter_map(|item| {
            let value = field(item);
            let tier = if term.is_empty() {
                None
            } else {
                Some(term.tier(value)?)
            };
            Some((tier, collation_key(value), item))
        })
        .collect();

    hits.sort_by(|(tier_a, key_a, a), (tier_b, key_b, b)| {
        tier_a.cmp(tier_b).then_with(|| {
            direction.apply(key_a.cmp(key_b).then_with(|| field(*a).cmp(field(*b))))
        })
    });

    hits.into_iter().map(|(_, _, item)| item.clone()).collect()
}

/// Keeps the items whose `field` contains `term` and orders them by `field`.
///
/// No tiers: the admin book list only narrows by title.
pub fn filter_contains<T, F>(items: &[T], term: &str, direction: SortDirection, field: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let term = SearchTerm::new(term);

    let mut kept: Vec<&T> = items
        .iter()
        .filter(|item| term.is_empty() || term.tier(field(*item)).is_some())
        .collect();

    kept.sort_by(|a, b| direction.apply(collate(field(*a), field(*b))));
    kept.into_iter().cloned().collect()
}

/// Option list for a multi-select picker.
///
/// Items matching `term` in any tier are kept; the ones already selected come
/// first, each group in ascending alphabetical order.
pub fn pick<T, F, S>(items: &[T], term: &str, field: F, is_selected: S) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
    S: Fn(&T) -> bool,
{
    let term = SearchTerm::new(term);

    let mut kept: Vec<(bool, &T)> = items
        .iter()
        .filter(|item| term.is_empty() || term.tier(field(*item)).is_some())
        .map(|item| (is_selected(item), item))
        .collect();

    kept.sort_by(|(selected_a, a), (selected_b, b)| match (*selected_a, *selected_b) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => collate(field(*a), field(*b)),
    });

    kept.into_iter().map(|(_, item)| item.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(items: &[&str]) -> Vec<String> {
        items.iter().map(|code| code.to_string()).collect()
    }

    #[test]
    fn coupon_codes_rank_prefix_before_substring() {
        let cupons = codes(&["DESCONTO10", "DESC5", "PROMO-DESC"]);
        let ranked = rank_by(&cupons, "desc", SortDirection::Ascending, |c| c.as_str());
        assert_eq!(ranked, codes(&["DESC5", "DESCONTO10", "PROMO-DESC"]));
    }

    #[test]
    fn exact_match_wins_over_alphabetical_position() {
        let generos = codes(&["Romance Histórico", "Romance", "Drama Romance"]);
        let ranked = rank_by(&generos, "ROMANCE", SortDirection::Descending, |g| g.as_str());
        assert_eq!(
            ranked,
            codes(&["Romance", "Romance Histórico", "Drama Romance"])
        );
    }

    #[test]
    fn empty_term_sorts_everything() {
        let generos = codes(&["Terror", "aventura", "Fantasia"]);
        let ranked = rank_by(&generos, "   ", SortDirection::Ascending, |g| g.as_str());
        assert_eq!(ranked, codes(&["aventura", "Fantasia", "Terror"]));

        let ranked = rank_by(&generos, "", SortDirection::Descending, |g| g.as_str());
        assert_eq!(ranked, codes(&["Terror", "Fantasia", "aventura"]));
    }

    #[test]
    fn input_order_is_left_untouched() {
        let cupons = codes(&["ZETA", "ALFA", "BETA"]);
        let _ = rank_by(&cupons, "", SortDirection::Ascending, |c| c.as_str());
        assert_eq!(cupons, codes(&["ZETA", "ALFA", "BETA"]));
    }

    #[test]
    fn no_match_yields_empty() {
        let autores = codes(&["Machado de Assis", "Clarice Lispector"]);
        assert!(rank_by(&autores, "tolkien", SortDirection::Ascending, |a| a.as_str()).is_empty());
    }

    #[test]
    fn contains_filter_ignores_tiers() {
        let titulos = codes(&["O Cortiço", "Dom Casmurro", "Cortiço Urbano"]);
        let kept = filter_contains(&titulos, "cortiço", SortDirection::Ascending, |t| t.as_str());
        assert_eq!(kept, codes(&["Cortiço Urbano", "O Cortiço"]));
    }

    #[test]
    fn picker_lists_selected_first() {
        let categorias = codes(&["Ficção", "Biografia", "Ficção Científica", "Autoajuda"]);
        let selected = ["Ficção Científica"];
        let picked = pick(
            &categorias,
            "",
            |c| c.as_str(),
            |c| selected.contains(&c.as_str()),
        );
        assert_eq!(
            picked,
            codes(&["Ficção Científica", "Autoajuda", "Biografia", "Ficção"])
        );
    }

    #[test]
    fn picker_filters_by_term() {
        let autores = codes(&["Ana Maria Machado", "Machado de Assis", "Jorge Amado"]);
        let picked = pick(&autores, "machado", |a| a.as_str(), |a| a == "Machado de Assis");
        assert_eq!(picked, codes(&["Machado de Assis", "Ana Maria Machado"]));
    }
}
