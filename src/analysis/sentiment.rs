use crate::analysis::text::{log_frequency, VocabularySet, TOTAL};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Word -> magnitude of its pros/cons imbalance (always > 0)
pub type DifferenceDictionary = BTreeMap<String, u64>;

/// Word counts over the `TOTAL` vocabulary. The vocabulary is a set, so
/// every word counts once.
pub fn occurrences(vocab: &VocabularySet) -> BTreeMap<String, usize> {
    vocab
        .get(TOTAL)
        .into_iter()
        .flatten()
        .map(|word| (word.clone(), 1))
        .collect()
}

fn log_frequencies(side: &str, counts: &BTreeMap<String, usize>) {
    let frequencies = log_frequency(counts);
    for (word, frequency) in &frequencies {
        trace!(side, word = word.as_str(), frequency, "log frequency");
    }
    let lowest = frequencies.values().copied().reduce(f64::min);
    debug!(
        "{}: {} unique words, lowest log frequency {:?}",
        side,
        frequencies.len(),
        lowest
    );
}

/// Split words into positive- and negative-leaning dictionaries by the
/// signed difference of pros and cons counts, keeping the `top_n` strongest
/// on each side. Equal differences are ordered alphabetically.
pub fn differentiate(
    pros_vocab: &VocabularySet,
    cons_vocab: &VocabularySet,
    top_n: usize,
) -> (DifferenceDictionary, DifferenceDictionary) {
    let pros = occurrences(pros_vocab);
    let cons = occurrences(cons_vocab);
    log_frequencies("pros", &pros);
    log_frequencies("cons", &cons);

    let mut differences: Vec<(String, i64)> = pros
        .keys()
        .chain(cons.keys().filter(|w| !pros.contains_key(*w)))
        .map(|word| {
            let p = pros.get(word).copied().unwrap_or(0) as i64;
            let c = cons.get(word).copied().unwrap_or(0) as i64;
            (word.clone(), p - c)
        })
        .collect();

    differences.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    let negative = differences
        .iter()
        .take(top_n)
        .filter(|(_, diff)| *diff < 0)
        .map(|(word, diff)| (word.clone(), diff.unsigned_abs()))
        .collect();

    differences.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let positive = differences
        .iter()
        .take(top_n)
        .filter(|(_, diff)| *diff > 0)
        .map(|(word, diff)| (word.clone(), diff.unsigned_abs()))
        .collect();

    (positive, negative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::text::{classify, SentencesByBrand};
    use std::collections::BTreeSet;

    /// (brand, space-separated words)
    fn vocab(entries: &[(&str, &str)]) -> VocabularySet {
        let mut vocab = VocabularySet::new();
        let mut total = BTreeSet::new();
        for (brand, words) in entries {
            let set: BTreeSet<String> = words.split_whitespace().map(str::to_string).collect();
            total.extend(set.iter().cloned());
            vocab.insert(brand.to_string(), set);
        }
        vocab.insert(TOTAL.to_string(), total);
        vocab
    }

    #[test]
    fn occurrences_count_each_total_word_once() {
        let v = vocab(&[("On", "light grip"), ("Nike", "light")]);
        let counts = occurrences(&v);
        assert_eq!(counts["light"], 1);
        assert_eq!(counts["grip"], 1);
        assert_eq!(counts.len(), 2);
        assert!(occurrences(&VocabularySet::new()).is_empty());
    }

    #[test]
    fn differences_split_by_sign() {
        let pros = vocab(&[
            ("On", "light comfortable firm"),
            ("Nike", "light comfortable"),
            ("Hoka", "light"),
        ]);
        let cons = vocab(&[
            ("On", "firm pricey"),
            ("Nike", "pricey narrow"),
            ("Hoka", "pricey"),
        ]);

        let (positive, negative) = differentiate(&pros, &cons, 100);
        assert_eq!(positive.keys().collect::<Vec<_>>(), ["comfortable", "light"]);
        assert_eq!(negative.keys().collect::<Vec<_>>(), ["narrow", "pricey"]);
        // firm: 1 - 1 = 0 appears nowhere
        assert!(!positive.contains_key("firm"));
        assert!(!negative.contains_key("firm"));
        assert!(positive.values().chain(negative.values()).all(|&m| m == 1));
    }

    #[test]
    fn words_on_both_sides_cancel_out() {
        fn brands(sentence: &str, names: &[&str]) -> SentencesByBrand {
            names
                .iter()
                .map(|name| (name.to_string(), vec![sentence.to_string()]))
                .collect()
        }
        let pros = brands("light", &["On", "Hoka", "Nike"]);
        let cons = brands("light heavy", &["On"]);

        let (pros_vocab, cons_vocab) = classify(&pros, &cons);
        let (positive, negative) = differentiate(&pros_vocab, &cons_vocab, 100);
        assert!(positive.is_empty());
        assert_eq!(negative, BTreeMap::from([("heavy".to_string(), 1)]));
    }

    #[test]
    fn top_n_breaks_ties_alphabetically() {
        let pros = vocab(&[("On", "zesty airy bouncy")]);
        let cons = vocab(&[("On", "heavy stiff")]);

        let (positive, negative) = differentiate(&pros, &cons, 2);
        assert_eq!(positive.keys().collect::<Vec<_>>(), ["airy", "bouncy"]);
        assert_eq!(negative.keys().collect::<Vec<_>>(), ["heavy", "stiff"]);
    }

    #[test]
    fn empty_vocabularies_produce_nothing() {
        let (positive, negative) = differentiate(&VocabularySet::new(), &VocabularySet::new(), 10);
        assert!(positive.is_empty());
        assert!(negative.is_empty());
    }
}
