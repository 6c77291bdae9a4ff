//! String primitives behind fuzzy matching, scoring, and highlighting.

use regex::{Captures, RegexBuilder};

/// Classic dynamic-programming edit distance over Unicode scalar values.
///
/// Insertion, deletion, and substitution each cost 1.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a.len()][b.len()]
}

/// Relevance of `text` to `query`, both expected lower-cased.
///
/// Tiers are checked in order: exact match 1.0, containment 0.8, prefix 0.6,
/// otherwise `1 - distance / max_len` (0.0 when both are empty).
pub fn calculate_score(text: &str, query: &str) -> f64 {
    if text == query {
        return 1.0;
    }
    if text.contains(query) {
        return 0.8;
    }
    // A prefix is always contained, so this tier is shadowed by the one above.
    if text.starts_with(query) {
        return 0.6;
    }

    let max_len = text.chars().count().max(query.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein_distance(text, query) as f64 / max_len as f64
}

/// Wrap every case-insensitive occurrence of `query` in `prefix`/`suffix`.
///
/// Text outside matches is preserved verbatim. An empty query returns the
/// text unchanged.
pub fn highlight(text: &str, query: &str, prefix: &str, suffix: &str) -> String {
    if query.is_empty() {
        return text.to_string();
    }
    let re = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            tracing::debug!(error = %e, "highlight pattern rejected");
            return text.to_string();
        }
    };
    re.replace_all(text, |caps: &Captures| format!("{prefix}{}{suffix}", &caps[0]))
        .into_owned()
}

/// Translate a glob (`*` any run, `?` any single character) into an anchored regex.
///
/// Everything other than the two wildcards matches literally.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}
