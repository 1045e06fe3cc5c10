use elibros_search::{
    collate, rank_by, rank_orders, MatchTier, OrderKeys, OrderTier, SearchTerm, SortDirection,
};
use proptest::prelude::*;
use time::{Duration, OffsetDateTime};

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-dA-D0-9 -]{0,8}", 0..24)
}

fn tier_of(term: &SearchTerm, value: &str) -> MatchTier {
    term.tier(value).expect("ranked value must match the term")
}

proptest! {
    #[test]
    fn every_hit_contains_the_term(items in names(), term in "[a-dA-D]{1,3}") {
        let ranked = rank_by(&items, &term, SortDirection::Ascending, |s| s.as_str());
        let needle = term.to_lowercase();

        for value in &ranked {
            prop_assert!(value.to_lowercase().contains(&needle));
        }
        let expected = items
            .iter()
            .filter(|value| value.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(ranked.len(), expected);
    }

    #[test]
    fn tiers_never_interleave(items in names(), term in "[a-dA-D]{1,3}") {
        let search = SearchTerm::new(&term);
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let ranked = rank_by(&items, &term, direction, |s| s.as_str());
            let tiers: Vec<MatchTier> = ranked.iter().map(|v| tier_of(&search, v)).collect();
            prop_assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn empty_term_only_sorts(items in names()) {
        let ranked = rank_by(&items, "", SortDirection::Ascending, |s| s.as_str());

        let mut expected = items.clone();
        expected.sort_by(|a, b| collate(a, b));
        prop_assert_eq!(ranked, expected);
    }

    #[test]
    fn direction_reverses_within_tiers(items in names(), term in "[a-dA-D]{0,2}") {
        let ascending = rank_by(&items, &term, SortDirection::Ascending, |s| s.as_str());
        let descending = rank_by(&items, &term, SortDirection::Descending, |s| s.as_str());
        let search = SearchTerm::new(&term);

        let group = |ranked: &[String]| {
            let mut groups: Vec<(Option<MatchTier>, Vec<String>)> = Vec::new();
            for value in ranked {
                let tier = search.tier(value);
                match groups.last_mut() {
                    Some((last, members)) if *last == tier => members.push(value.clone()),
                    _ => groups.push((tier, vec![value.clone()])),
                }
            }
            groups
        };

        let up = group(&ascending);
        let down = group(&descending);
        prop_assert_eq!(up.len(), down.len());
        for ((tier_up, members_up), (tier_down, members_down)) in up.into_iter().zip(down) {
            prop_assert_eq!(tier_up, tier_down);
            let mut reversed = members_down;
            reversed.reverse();
            prop_assert_eq!(members_up, reversed);
        }
    }

    #[test]
    fn ranking_is_deterministic(items in names(), term in "[a-dA-D]{0,2}") {
        let first = rank_by(&items, &term, SortDirection::Descending, |s| s.as_str());
        let second = rank_by(&items, &term, SortDirection::Descending, |s| s.as_str());
        prop_assert_eq!(first, second);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Order {
    number: String,
    name: String,
    email: String,
    placed_at: Option<OffsetDateTime>,
}

fn order_keys(order: &Order) -> OrderKeys<'_> {
    OrderKeys {
        number: &order.number,
        client_name: &order.name,
        client_email: &order.email,
        placed_at: order.placed_at,
    }
}

fn orders() -> impl Strategy<Value = Vec<Order>> {
    let order = (
        "[a-c0-9-]{0,5}",
        "[a-cA-C ]{0,6}",
        "[a-c]{0,3}@[a-c]{0,2}",
        prop::option::of(0i64..5_000_000),
    )
        .prop_map(|(number, name, email, offset)| Order {
            number,
            name,
            email,
            placed_at: offset.map(|secs| OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs)),
        });
    prop::collection::vec(order, 0..20)
}

proptest! {
    #[test]
    fn every_order_hit_matches_some_field(items in orders(), term in "#?[a-cA-C]{1,2}") {
        let ranked = rank_orders(&items, &term, SortDirection::Descending, order_keys);
        let lowered = term.to_lowercase();
        let number_term = lowered.trim_start_matches('#');
        let matches = |order: &Order| {
            order.number.to_lowercase().contains(number_term)
                || order.name.to_lowercase().contains(&lowered)
                || order.email.to_lowercase().contains(&lowered)
        };

        for order in &ranked {
            prop_assert!(matches(order));
        }
        prop_assert_eq!(ranked.len(), items.iter().filter(|order| matches(order)).count());
    }

    #[test]
    fn order_tiers_never_interleave(items in orders(), term in "#?[a-cA-C]{1,2}") {
        let search = SearchTerm::new(&term);
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let ranked = rank_orders(&items, &term, direction, order_keys);
            let tiers: Vec<OrderTier> = ranked
                .iter()
                .map(|order| {
                    OrderTier::of(&order_keys(order), &search).expect("ranked order must match")
                })
                .collect();
            prop_assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn empty_order_term_only_sorts_by_date(items in orders()) {
        let ascending = rank_orders(&items, "", SortDirection::Ascending, order_keys);
        let mut expected = items.clone();
        expected.sort_by(|a, b| {
            a.placed_at
                .cmp(&b.placed_at)
                .then_with(|| a.number.cmp(&b.number))
        });
        prop_assert_eq!(&ascending, &expected);

        let descending = rank_orders(&items, "", SortDirection::Descending, order_keys);
        let mut expected = items.clone();
        expected.sort_by(|a, b| {
            b.placed_at
                .cmp(&a.placed_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        prop_assert_eq!(descending, expected);
    }
}
