//! Property-based tests for graph parsing and ordering.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::graph::{order_packages, GraphEntry, GraphParser, PipenvGraphParser};
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = GraphEntry> {
        (
            "[a-z][a-z0-9-]{0,12}",
            "[0-9]{1,3}\\.[0-9]{1,3}",
            0usize..6,
        )
            .prop_map(|(package, version, depth)| GraphEntry::new(package, version, depth))
    }

    // ============================================================================
    // parser property tests
    // ============================================================================

    proptest! {
        /// Property: parsing never panics, whatever the listing contains
        #[test]
        fn parse_accepts_arbitrary_text(text in ".*") {
            let _ = PipenvGraphParser::new().parse(&text);
        }

        /// Property: a rendered entry parses back to itself
        #[test]
        fn parse_round_trips_rendered_entries(
            package in "[a-z][a-z0-9-]{0,12}",
            version in "[0-9]{1,3}\\.[0-9]{1,3}(\\.[0-9]{1,3})?",
            depth in 0usize..8,
        ) {
            let listing = format!("{}{}=={}\n", " ".repeat(depth * 2), package, version);
            let entries = PipenvGraphParser::new().parse(&listing);

            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(&entries[0].package, &package);
            prop_assert_eq!(&entries[0].version, &version);
            prop_assert_eq!(entries[0].depth, depth);
        }

        /// Property: parsing is deterministic
        #[test]
        fn parse_is_deterministic(text in ".*") {
            let first = PipenvGraphParser::new().parse(&text);
            let second = PipenvGraphParser::new().parse(&text);
            prop_assert_eq!(first, second);
        }
    }

    // ============================================================================
    // ordering property tests
    // ============================================================================

    proptest! {
        /// Property: ordering is deterministic for any entry multiset
        #[test]
        fn order_is_deterministic(entries in prop::collection::vec(entry_strategy(), 0..40)) {
            let first = order_packages(&entries, |_| true);
            let second = order_packages(&entries, |_| true);
            prop_assert_eq!(first, second);
        }

        /// Property: the output never repeats a (package, version) pair
        #[test]
        fn order_output_pairs_are_unique(entries in prop::collection::vec(entry_strategy(), 0..40)) {
            let ordered = order_packages(&entries, |_| true);
            let mut seen = std::collections::HashSet::new();
            for req in &ordered {
                prop_assert!(
                    seen.insert((req.package.clone(), req.version.clone())),
                    "pair {}={} appeared twice",
                    req.package,
                    req.version
                );
            }
        }

        /// Property: packages appear in non-decreasing order of their
        /// deepest graph position
        #[test]
        fn order_is_sorted_by_deepest_position(entries in prop::collection::vec(entry_strategy(), 0..40)) {
            let mut max_depths = std::collections::HashMap::new();
            for entry in &entries {
                let depth = max_depths.entry(entry.package.clone()).or_insert(0usize);
                *depth = (*depth).max(entry.depth);
            }

            let ordered = order_packages(&entries, |_| true);
            let depths: Vec<usize> = ordered
                .iter()
                .map(|req| max_depths[&req.package])
                .collect();
            prop_assert!(
                depths.windows(2).all(|pair| pair[0] <= pair[1]),
                "depths out of order: {:?}",
                depths
            );
        }

        /// Property: a rejected package never reaches the output, and
        /// accepted pairs all survive
        #[test]
        fn order_respects_the_vendor_filter(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            rejected in "[a-z][a-z0-9-]{0,12}",
        ) {
            let ordered = order_packages(&entries, |package| package != rejected);

            prop_assert!(ordered.iter().all(|req| req.package != rejected));

            let expected: std::collections::HashSet<(String, String)> = entries
                .iter()
                .filter(|entry| entry.package != rejected)
                .map(|entry| (entry.package.clone(), entry.version.clone()))
                .collect();
            prop_assert_eq!(ordered.len(), expected.len());
        }
    }
}
