//! Property-based tests for catalog ordering and merging.
//!
//! These tests use proptest to generate random entry sets and verify that
//! the ordering and merge invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use crate::catalog::{compare_entries, sort_entries, CatalogEntry};
    use crate::phases::merge::{added_entries, merge_entries};
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = CatalogEntry> {
        ("[a-cA-C]{1,3}", "u[0-9]{1,2}", 0u64..50)
            .prop_map(|(name, url, size)| CatalogEntry::new("h", &name, &url, size, ""))
    }

    proptest! {
        /// Property: sorting is a pure function of the entry set
        #[test]
        fn sort_is_independent_of_input_order(
            entries in prop::collection::vec(entry_strategy(), 0..30),
            seed in any::<u64>(),
        ) {
            let unique = merge_entries(Vec::new(), entries);
            let mut shuffled = unique.clone();
            // Deterministic permutation driven by the seed.
            let len = shuffled.len();
            for i in 0..len {
                let j = ((seed.wrapping_mul(i as u64 + 1)) % len as u64) as usize;
                shuffled.swap(i, j);
            }
            sort_entries(&mut shuffled);
            prop_assert_eq!(shuffled, unique);
        }

        /// Property: equal names (ignoring case) are ordered by size, largest first
        #[test]
        fn equal_names_sorted_by_size_desc(
            entries in prop::collection::vec(entry_strategy(), 0..30),
        ) {
            let mut sorted = entries;
            sort_entries(&mut sorted);
            for pair in sorted.windows(2) {
                prop_assert_ne!(compare_entries(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
                if pair[0].display_name.to_lowercase() == pair[1].display_name.to_lowercase() {
                    prop_assert!(pair[0].byte_size >= pair[1].byte_size);
                }
            }
        }

        /// Property: a merge never drops a prior URL and always contains every new URL
        #[test]
        fn merge_is_monotonic(
            prior in prop::collection::vec(entry_strategy(), 0..20),
            new_entries in prop::collection::vec(entry_strategy(), 0..20),
        ) {
            let prior_urls: HashSet<String> = prior.iter().map(|e| e.canonical_url.clone()).collect();
            let new_urls: HashSet<String> = new_entries.iter().map(|e| e.canonical_url.clone()).collect();

            let merged = merge_entries(prior, new_entries);
            let merged_urls: HashSet<String> = merged.iter().map(|e| e.canonical_url.clone()).collect();

            prop_assert!(prior_urls.is_subset(&merged_urls));
            prop_assert!(new_urls.is_subset(&merged_urls));
            prop_assert_eq!(merged_urls.len(), merged.len());

            let added = added_entries(&merged, &prior_urls);
            let expected: HashSet<String> = new_urls.difference(&prior_urls).cloned().collect();
            let actual: HashSet<String> = added.iter().map(|e| e.canonical_url.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
