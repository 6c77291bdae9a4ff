use anyhow::Result;
use clap::ValueEnum;
use std::sync::Arc;

use nornicdb_accel::config::AccelConfig;
use nornicdb_accel::graph::{Node, Value};
use nornicdb_accel::search::{highlight, SearchEngine};

const HIGHLIGHT_PREFIX: &str = "**";
const HIGHLIGHT_SUFFIX: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchMode {
    /// Property equals the query (parsed as JSON, else a string)
    Exact,
    /// Property contains any word of the query
    FullText,
    /// Property within [search] fuzzy_distance edits of the query
    Fuzzy,
    /// Property matches a regular expression
    Regex,
    /// Property matches a `*`/`?` glob over its whole value
    Match,
    Prefix,
    Suffix,
    Contains,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub score: bool,
    pub highlight: bool,
}

/// Run one search mode against the configured graph and print the matches.
pub fn search(
    config: &AccelConfig,
    mode: SearchMode,
    label: &str,
    property: &str,
    query: &str,
    opts: SearchOptions,
) -> Result<()> {
    let engine = SearchEngine::new(super::open_graph(config)?);

    let nodes = match mode {
        SearchMode::Exact => engine.node(label, property, &parse_value(query)),
        SearchMode::FullText => engine.full_text(label, property, query),
        SearchMode::Fuzzy => engine.fuzzy(label, property, query, config.search.fuzzy_distance),
        SearchMode::Regex => engine.regex(label, property, query),
        SearchMode::Match => engine.wildcard(label, property, query),
        SearchMode::Prefix => engine.prefix(label, property, query),
        SearchMode::Suffix => engine.suffix(label, property, query),
        SearchMode::Contains => engine.contains(label, property, query),
    };

    if nodes.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", nodes.len());

    if opts.score {
        let mut scored = engine.score(&nodes, property, query);
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        for (i, hit) in scored.iter().enumerate() {
            println!(
                "  {}. [{}] {} (score: {:.2})",
                i + 1,
                hit.node.id,
                display_value(&hit.node, property, query, opts.highlight),
                hit.score
            );
        }
        return Ok(());
    }

    for (i, node) in nodes.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            i + 1,
            node.id,
            display_value(node, property, query, opts.highlight)
        );
    }
    Ok(())
}

/// Print up to `limit` values of `property` starting with `prefix`.
pub fn suggest(
    config: &AccelConfig,
    label: &str,
    property: &str,
    prefix: &str,
    limit: usize,
) -> Result<()> {
    let engine = SearchEngine::new(super::open_graph(config)?);
    let suggestions = engine.suggest(label, property, prefix, limit);
    print_list(&suggestions, "No suggestions.");
    Ok(())
}

/// Print values of `property` that are close to `query`.
pub fn did_you_mean(config: &AccelConfig, label: &str, property: &str, query: &str) -> Result<()> {
    let engine = SearchEngine::new(super::open_graph(config)?);
    let candidates = engine.did_you_mean(label, property, query);
    if candidates.is_empty() {
        println!("No close matches.");
    } else {
        println!("Did you mean:");
        print_list(&candidates, "");
    }
    Ok(())
}

fn print_list(items: &[String], empty: &str) {
    if items.is_empty() {
        println!("{empty}");
        return;
    }
    for item in items {
        println!("  {item}");
    }
}

fn display_value(node: &Arc<Node>, property: &str, query: &str, mark: bool) -> String {
    match node.properties.get(property) {
        Some(Value::String(text)) if mark => {
            highlight(text, query, HIGHLIGHT_PREFIX, HIGHLIGHT_SUFFIX)
        }
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

/// Interpret a command-line query as a typed value: `30` is an integer,
/// `true` a boolean, anything unparseable a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("30"), Value::Int(30));
        assert_eq!(parse_value("2.5"), Value::Float(2.5));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("Alice"), Value::String("Alice".into()));
        assert_eq!(parse_value("\"42\""), Value::String("42".into()));
    }
}
