use std::collections::HashMap;

use crate::data_models::{TermFrequency, TopKResult};

/// How many terms the pipeline hands to the cloud.
pub const TOP_K: usize = 50;

/// Counts `lemmas` and keeps the `k` most frequent.
///
/// Terms are ranked by count, descending. Equal counts keep the order in
/// which the terms first appeared in `lemmas`.
pub fn aggregate<S: AsRef<str>>(lemmas: &[S], k: usize) -> TopKResult {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut table: Vec<TermFrequency> = Vec::new();

    for lemma in lemmas {
        let lemma = lemma.as_ref();
        match index.get(lemma) {
            Some(&slot) => table[slot].count += 1,
            None => {
                index.insert(lemma, table.len());
                table.push(TermFrequency::new(lemma, 1));
            }
        }
    }

    // stable: ties stay in first-occurrence order
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table.truncate(k);
    TopKResult::new(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_orders() {
        let top = aggregate(&["Тур", "Тур", "Дорогой"], TOP_K);
        assert_eq!(top.as_pairs(), vec![("Тур", 2), ("Дорогой", 1)]);
    }

    #[test]
    fn test_ties_follow_first_occurrence() {
        let lemmas = ["Море", "Горы", "Озеро", "Горы", "Море", "Озеро", "Лес"];
        let top = aggregate(&lemmas, TOP_K);
        assert_eq!(
            top.as_pairs(),
            vec![("Море", 2), ("Горы", 2), ("Озеро", 2), ("Лес", 1)]
        );
        assert_eq!(aggregate(&lemmas, TOP_K), top);
    }

    #[test]
    fn test_truncates_to_k() {
        let lemmas = ["А", "Б", "В", "Б", "В", "В"];
        let top = aggregate(&lemmas, 2);
        assert_eq!(top.as_pairs(), vec![("В", 3), ("Б", 2)]);
        assert!(aggregate(&lemmas, 0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(aggregate(&empty, TOP_K).is_empty());
    }

    #[test]
    fn test_count_invariants() {
        let lemmas: Vec<String> = (0..500).map(|i| format!("Слово{}", i % 73)).collect();
        for k in [0, 1, 10, 50, 73, 100] {
            let top = aggregate(&lemmas, k);
            assert!(top.len() <= k);
            assert!(top.len() <= 73);
            assert!(top.total_count() <= lemmas.len());
            if k >= 73 {
                assert_eq!(top.total_count(), lemmas.len());
            }
            assert!(top.entries().windows(2).all(|w| w[0].count >= w[1].count));
        }
    }
}
