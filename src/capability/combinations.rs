//! Enumeration of all non-empty capability subsets.
//!
//! Subsets of size n are built by extending each subset of size n-1 with one
//! unused index, re-sorting, and discarding content-duplicates. The final
//! list is ordered largest subset first; ordering within equal sizes is not
//! semantic, only completeness and uniqueness are.

/// All non-empty subsets of `{0..k-1}`, each ascending, deduplicated,
/// sorted by descending subset size. Exactly `2^k - 1` entries.
pub fn combinations(k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return Vec::new();
    }
    let mut rows = grow(k, k);
    rows.sort_by(|a, b| b.len().cmp(&a.len()));
    rows
}

fn grow(n: usize, k: usize) -> Vec<Vec<usize>> {
    if n == 1 {
        return (0..k).map(|i| vec![i]).collect();
    }
    let mut rows = grow(n - 1, k);
    for i in 0..rows.len() {
        for j in 0..k {
            if rows[i].contains(&j) {
                continue;
            }
            let mut row = rows[i].clone();
            row.push(j);
            row.sort_unstable();
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;
    use std::collections::HashSet;

    #[test]
    fn count_is_two_to_the_k_minus_one() {
        for k in 1..=4 {
            assert_eq!(combinations(k).len(), (1 << k) - 1, "k={}", k);
        }
    }

    #[test]
    fn zero_slots_yield_nothing() {
        assert!(combinations(0).is_empty());
    }

    #[test]
    fn every_subset_appears_exactly_once() {
        for k in 1..=4 {
            let rows = combinations(k);
            let seen: HashSet<CapabilitySet> = rows
                .iter()
                .map(|row| CapabilitySet::from_indices(row))
                .collect();
            assert_eq!(seen.len(), rows.len(), "duplicate subset for k={}", k);

            // Every non-empty bitmask over k slots must be present.
            for mask in 1u8..(1 << k) {
                let indices: Vec<usize> = (0..k).filter(|&i| mask & (1 << i) != 0).collect();
                assert!(
                    seen.contains(&CapabilitySet::from_indices(&indices)),
                    "missing subset {:?} for k={}",
                    indices,
                    k
                );
            }
        }
    }

    #[test]
    fn rows_are_ascending_and_size_ordered() {
        let rows = combinations(4);
        assert_eq!(rows[0], vec![0, 1, 2, 3], "full subset comes first");
        for row in &rows {
            assert!(row.windows(2).all(|w| w[0] < w[1]), "not ascending: {:?}", row);
        }
        for pair in rows.windows(2) {
            assert!(pair[0].len() >= pair[1].len(), "size order violated");
        }
    }
}
