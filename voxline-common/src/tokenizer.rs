//! Query tokenizer
//!
//! Turns free text into a short ordered list of content-bearing keywords.

/// Maximum number of keywords kept per query
pub const MAX_KEYWORDS: usize = 10;

/// Words that carry no matching signal.
///
/// Pronouns, articles, conjunctions, prepositions, auxiliary and modal verbs,
/// interrogatives and a handful of generic filler words.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    "a", "an", "the", "and", "but", "or", "nor", "so", "yet", "for", "of", "to", "in", "on",
    "at", "by", "from", "with", "about", "as", "into", "like", "through", "after", "over",
    "between", "out", "against", "during", "without", "before", "under", "around", "among",
    "is", "am", "are", "was", "were", "be", "been", "being", "do", "does", "did", "doing",
    "have", "has", "had", "having",
    "will", "would", "shall", "should", "can", "could", "may", "might", "must",
    "this", "that", "these", "those", "there", "here", "then", "than", "now", "not", "no", "yes",
    "what", "which", "who", "whom", "when", "where", "why", "how",
    "just", "very", "too", "also", "still", "again", "some", "want", "wants",
];

/// True if `token` is in [`STOP_WORDS`]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split text into lowercase tokens.
///
/// Every character outside `[a-z0-9']` becomes a separator; leading and
/// trailing apostrophes are stripped from each token and empty tokens dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .map(|token| token.trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract up to [`MAX_KEYWORDS`] keywords from a query, in original order.
pub fn query_keywords(query: &str) -> Vec<String> {
    tokenize(query)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .take(MAX_KEYWORDS)
        .collect()
}
