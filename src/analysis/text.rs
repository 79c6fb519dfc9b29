use crate::models::CatalogSnapshot;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// Reserved key for the union across brands
pub const TOTAL: &str = "total";

/// Brand name -> normalized tokens, plus the `TOTAL` union
pub type VocabularySet = BTreeMap<String, BTreeSet<String>>;

/// Brand name -> review sentences
pub type SentencesByBrand = BTreeMap<String, Vec<String>>;

static HYPHENATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}+(?:-\p{L}+)+$").expect("valid hyphenation pattern"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]").expect("valid non-word pattern"));

/// NLTK's English stopword list
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Brand names would otherwise dominate their own vocabulary
const BRAND_STOPWORDS: &[&str] = &["on", "hoka", "nike", "adidas", "new", "balance"];

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH_STOPWORDS
        .iter()
        .chain(BRAND_STOPWORDS)
        .copied()
        .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase a sentence and join hyphenated letter runs ("light-weight" -> "lightweight")
pub fn fix_hyphenated(sentence: &str) -> String {
    sentence
        .to_lowercase()
        .split_whitespace()
        .map(|token| {
            if HYPHENATED.is_match(token) {
                token.replace('-', "")
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip non-word characters; numeric-only or letterless tokens become ""
pub fn clean_word(token: &str) -> String {
    let cleaned = NON_WORD.replace_all(token, "");
    if cleaned.chars().all(|c| c.is_numeric()) || !cleaned.chars().any(char::is_alphabetic) {
        return String::new();
    }
    cleaned.into_owned()
}

/// Cleaned, stopword-free tokens of one sentence
pub fn tokenize(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split_whitespace()
        .map(|token| clean_word(&token.to_lowercase()))
        .filter(|word| !word.is_empty() && !is_stopword(word))
}

/// Every brand's pros and cons across both genders, hyphenation fixed
pub fn extract_pros_cons(snapshot: &CatalogSnapshot) -> (SentencesByBrand, SentencesByBrand) {
    let mut pros = SentencesByBrand::new();
    let mut cons = SentencesByBrand::new();

    for brand in snapshot.brands() {
        let brand_pros = pros.entry(brand.to_string()).or_default();
        let brand_cons = cons.entry(brand.to_string()).or_default();
        for shoe in snapshot.brand_records(brand) {
            brand_pros.extend(shoe.pros.iter().map(|p| fix_hyphenated(p)));
            brand_cons.extend(shoe.cons.iter().map(|c| fix_hyphenated(c)));
        }
    }

    (pros, cons)
}

fn vocabulary(sentences_by_brand: &SentencesByBrand) -> VocabularySet {
    let mut vocab = VocabularySet::new();
    let mut total = BTreeSet::new();

    for (brand, sentences) in sentences_by_brand {
        let words: BTreeSet<String> = sentences.iter().flat_map(|s| tokenize(s)).collect();
        total.extend(words.iter().cloned());
        vocab.insert(brand.clone(), words);
    }

    vocab.insert(TOTAL.to_string(), total);
    vocab
}

/// Per-brand pros and cons vocabularies
pub fn classify(
    pros_by_brand: &SentencesByBrand,
    cons_by_brand: &SentencesByBrand,
) -> (VocabularySet, VocabularySet) {
    let pros = vocabulary(pros_by_brand);
    let cons = vocabulary(cons_by_brand);

    debug!(
        "Vocabulary: {} unique words in pros, {} in cons",
        pros[TOTAL].len(),
        cons[TOTAL].len()
    );
    (pros, cons)
}

/// log10 of each word's share of the total count
pub fn log_frequency(counts: &BTreeMap<String, usize>) -> BTreeMap<String, f64> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(word, &count)| (word.clone(), (count as f64 / total as f64).log10()))
        .collect()
}
