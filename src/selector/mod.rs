// src/selector/mod.rs
use crate::model::{Item, QuotaCondition};
use crate::utils::error::SelectError;
use rand::Rng;
use std::collections::HashSet;

/// Draws items according to an ordered list of quota conditions.
///
/// Conditions are processed strictly in input order, so earlier conditions
/// get first pick of the pool: an item eligible for two conditions is granted
/// to whichever is listed first. This greedy policy does no rebalancing or
/// backtracking; if a later condition becomes infeasible the whole run fails.
///
/// Identity is tracked by index into `items`, never by tag value: two
/// distinct questions carrying identical tags can both be drawn, but no
/// single question is ever drawn twice.
///
/// The caller supplies the random generator, so tests can pass a seeded
/// `StdRng` for reproducible draws.
pub fn select<'a, R: Rng + ?Sized>(
    items: &'a [Item],
    conditions: &[QuotaCondition],
    rng: &mut R,
) -> Result<Vec<&'a Item>, SelectError> {
    let mut selected: Vec<&'a Item> = Vec::new();
    let mut used: HashSet<usize> = HashSet::new();

    for condition in conditions {
        let pool: Vec<usize> = (0..items.len())
            .filter(|i| !used.contains(i) && condition.matches(&items[*i].tags))
            .collect();

        tracing::debug!(
            "Condition {} matched a pool of {} unused questions",
            condition,
            pool.len()
        );

        if pool.len() < condition.count {
            return Err(SelectError::InsufficientPool {
                condition: condition.to_string(),
                required: condition.count,
                available: pool.len(),
            });
        }

        // Uniform draw without replacement: every subset of `count` pool
        // members is equally likely.
        for drawn in rand::seq::index::sample(rng, pool.len(), condition.count).into_vec() {
            let idx = pool[drawn];
            used.insert(idx);
            selected.push(&items[idx]);
        }
    }

    Ok(selected)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentBlock, ItemTags, ParagraphFormat, StyledRun, TextBlock};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(topic: &str, difficulty: &str, code: &str) -> Item {
        Item {
            tags: ItemTags {
                topic: topic.to_string(),
                difficulty: difficulty.to_string(),
                code: code.to_string(),
            },
            blocks: vec![ContentBlock::Text(TextBlock {
                runs: vec![StyledRun {
                    text: format!("body of {}", code),
                    ..Default::default()
                }],
                format: ParagraphFormat::default(),
            })],
        }
    }

    fn cond(
        topic: Option<&str>,
        difficulty: Option<&str>,
        count: usize,
    ) -> QuotaCondition {
        QuotaCondition {
            topic: topic.map(str::to_string),
            difficulty: difficulty.map(str::to_string),
            code: None,
            count,
        }
    }

    #[test]
    fn exact_quota_satisfaction() {
        let items: Vec<Item> = (0..6)
            .map(|i| item("Polymer", "B", &format!("B{:02}", i)))
            .chain((0..3).map(|i| item("Polymer", "H", &format!("H{:02}", i))))
            .collect();
        let conditions = vec![
            cond(Some("Polymer"), Some("B"), 4),
            cond(Some("Polymer"), Some("H"), 2),
        ];

        let mut rng = StdRng::seed_from_u64(7);
        let picked = select(&items, &conditions, &mut rng).expect("quota should be satisfiable");

        assert_eq!(picked.len(), 6);
        assert_eq!(picked.iter().filter(|q| q.tags.difficulty == "B").count(), 4);
        assert_eq!(picked.iter().filter(|q| q.tags.difficulty == "H").count(), 2);
        // Condition order is preserved in the output: all B draws precede H.
        assert!(picked[..4].iter().all(|q| q.tags.difficulty == "B"));
        assert!(picked[4..].iter().all(|q| q.tags.difficulty == "H"));
    }

    #[test]
    fn insufficient_pool_fails_without_partial_result() {
        let items = vec![
            item("Polymer", "B", "B00"),
            item("Polymer", "B", "B01"),
            item("Polymer", "B", "B02"),
            item("Polymer", "H", "H00"),
        ];
        let conditions = vec![
            cond(Some("Polymer"), Some("B"), 4), // only 3 available
            cond(Some("Polymer"), Some("H"), 1),
        ];

        let mut rng = StdRng::seed_from_u64(0);
        let err = select(&items, &conditions, &mut rng).unwrap_err();
        match err {
            SelectError::InsufficientPool {
                required,
                available,
                condition,
            } => {
                assert_eq!(required, 4);
                assert_eq!(available, 3);
                assert!(condition.contains("\"B\""));
            }
        }
    }

    #[test]
    fn no_item_is_drawn_twice_even_with_identical_tags() {
        // Five questions with byte-identical tags: only per-instance identity
        // can tell them apart.
        let items: Vec<Item> = (0..5).map(|_| item("Polymer", "B", "P01")).collect();
        let conditions = vec![
            cond(Some("Polymer"), Some("B"), 3),
            cond(Some("Polymer"), Some("B"), 2),
        ];

        let mut rng = StdRng::seed_from_u64(42);
        let picked = select(&items, &conditions, &mut rng).expect("5 of 5 should succeed");

        assert_eq!(picked.len(), 5);
        let mut seen: HashSet<*const Item> = HashSet::new();
        for q in &picked {
            assert!(seen.insert(*q as *const Item), "question drawn twice");
        }
    }

    #[test]
    fn earlier_condition_gets_first_pick_of_overlapping_pool() {
        let items = vec![
            item("Polymer", "B", "P00"),
            item("Polymer", "B", "P01"),
            item("Polymer", "B", "P02"),
            item("Ester", "B", "E00"),
        ];
        // Both conditions match the three Polymer/B items; the first takes
        // all of them, forcing the second to the Ester question.
        let conditions = vec![cond(Some("Polymer"), None, 3), cond(None, Some("B"), 1)];

        let mut rng = StdRng::seed_from_u64(3);
        let picked = select(&items, &conditions, &mut rng).expect("should succeed");

        assert_eq!(picked.len(), 4);
        assert_eq!(picked[3].tags.topic, "Ester");
    }

    #[test]
    fn swapped_condition_order_can_change_feasibility() {
        let items = vec![item("Polymer", "B", "P00"), item("Ester", "B", "E00")];
        // Wildcard-difficulty condition first eats from the shared pool.
        let greedy_first = vec![cond(None, Some("B"), 2), cond(Some("Polymer"), None, 1)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select(&items, &greedy_first, &mut rng).is_err());

        let specific_first = vec![cond(Some("Polymer"), None, 1), cond(None, Some("B"), 1)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select(&items, &specific_first, &mut rng).is_ok());
    }

    #[test]
    fn same_seed_reproduces_the_same_draw() {
        let items: Vec<Item> = (0..20)
            .map(|i| item("Polymer", "B", &format!("P{:02}", i)))
            .collect();
        let conditions = vec![cond(Some("Polymer"), Some("B"), 5)];

        let codes = |picked: Vec<&Item>| -> Vec<String> {
            picked.iter().map(|q| q.tags.code.clone()).collect()
        };

        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a = codes(select(&items, &conditions, &mut rng_a).unwrap());
        let b = codes(select(&items, &conditions, &mut rng_b).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_condition_list_selects_nothing() {
        let items = vec![item("Polymer", "B", "P00")];
        let mut rng = StdRng::seed_from_u64(0);
        let picked = select(&items, &[], &mut rng).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn zero_count_condition_is_satisfied_by_an_empty_pool() {
        let items = vec![item("Polymer", "B", "P00")];
        let conditions = vec![cond(Some("Alkane"), None, 0)];
        let mut rng = StdRng::seed_from_u64(0);
        let picked = select(&items, &conditions, &mut rng).unwrap();
        assert!(picked.is_empty());
    }
}
