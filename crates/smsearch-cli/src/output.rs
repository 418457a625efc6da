//! Output formatting for search results.
//!
//! Supports both human-readable terminal output and JSON for scripting.
//! Either way the shape follows the requested format: one block per result
//! for `rows`, aligned columns for `table`.

use anyhow::{Context, Result};
use serde::Serialize;
use smsearch_core::search::{FormattedResults, ResultRow, ResultTable, SearchStrategy};

/// Maximum characters to show in text snippet
const SNIPPET_MAX_LEN: usize = 160;

/// Snippet width in table output
const TABLE_TEXT_WIDTH: usize = 60;

/// JSON output structure for search results
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub query: &'a str,
    pub method: &'static str,
    pub format: &'static str,
    pub results: &'a FormattedResults,
}

/// Formats search results as JSON.
pub fn format_json(
    query: &str,
    strategy: SearchStrategy,
    results: &FormattedResults,
) -> Result<String> {
    let output = JsonOutput {
        query,
        method: strategy.as_str(),
        format: results.format().as_str(),
        results,
    };
    serde_json::to_string_pretty(&output).context("Failed to serialize results as JSON")
}

/// Formats search results for human-readable terminal output.
pub fn format_human(query: &str, results: &FormattedResults) -> String {
    if results.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut output = format!(
        "Found {} result{} for \"{}\":\n\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        query
    );

    match results {
        FormattedResults::Rows(rows) => output.push_str(&format_rows(rows)),
        FormattedResults::Table(table) => output.push_str(&format_table(table)),
    }

    output.trim_end().to_string()
}

fn format_rows(rows: &[ResultRow]) -> String {
    let mut output = String::new();
    for row in rows {
        output.push_str(&format!(
            "{}. #{} [{}]{}\n",
            row.rank,
            row.id,
            row.search_method,
            score_suffix(row.score)
        ));
        output.push_str(&format!(
            "   {}\n\n",
            truncate_text(&row.text, SNIPPET_MAX_LEN)
        ));
    }
    output
}

fn format_table(table: &ResultTable) -> String {
    let ids: Vec<String> = table.id.iter().map(|id| id.to_string()).collect();
    let scores: Vec<String> = table
        .score
        .iter()
        .map(|score| score.map(|s| format!("{:.4}", s)).unwrap_or_else(|| "-".to_string()))
        .collect();

    let id_width = ids.iter().map(String::len).max().unwrap_or(0).max("id".len());
    let score_width = scores
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("score".len());

    let mut output = format!(
        "{:>4}  {:<7}  {:>id_width$}  {:>score_width$}  text\n",
        "rank", "method", "id", "score"
    );
    for i in 0..table.len() {
        output.push_str(&format!(
            "{:>4}  {:<7}  {:>id_width$}  {:>score_width$}  {}\n",
            table.rank[i],
            table.search_method[i].as_str(),
            ids[i],
            scores[i],
            truncate_text(&table.text[i].replace('\n', " "), TABLE_TEXT_WIDTH)
        ));
    }
    output
}

fn score_suffix(score: Option<f32>) -> String {
    score
        .map(|s| format!(" (score: {:.4})", s))
        .unwrap_or_default()
}

/// Truncates text to a maximum length, adding ellipsis if needed.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        // Find a word boundary near max_len
        let cut = text
            .char_indices()
            .nth(max_len)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let truncated = &text[..cut];
        if let Some(last_space) = truncated.rfind(' ') {
            format!("{}...", &truncated[..last_space])
        } else {
            format!("{}...", truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsearch_core::search::{OutputFormat, RecordId, ScoredResult, SearchMethod};

    fn results(format: OutputFormat) -> FormattedResults {
        format.format(&[
            ScoredResult {
                method: SearchMethod::Fused,
                id: RecordId::from_u64(3),
                text: "claim your free prize".to_string(),
                score: Some(0.0325),
                rank: 1,
            },
            ScoredResult {
                method: SearchMethod::Fused,
                id: RecordId::from_u64(1),
                text: "win a free prize now".to_string(),
                score: Some(0.0323),
                rank: 2,
            },
        ])
    }

    #[test]
    fn test_format_human_empty() {
        let output = format_human("test query", &OutputFormat::Rows.format(&[]));
        assert!(output.contains("No results found"));
    }

    #[test]
    fn test_format_human_rows() {
        let output = format_human("free prize", &results(OutputFormat::Rows));
        assert!(output.contains("2 results"));
        assert!(output.contains("1. #3 [fused] (score: 0.0325)"));
        assert!(output.contains("win a free prize now"));
    }

    #[test]
    fn test_format_human_table() {
        let output = format_human("free prize", &results(OutputFormat::Table));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[2].starts_with("rank"));
        assert!(lines[3].contains("fused"));
        assert!(lines[3].contains("0.0325"));
        assert!(lines[4].contains("win a free prize now"));
    }

    #[test]
    fn test_vector_rows_have_no_score() {
        let rows = OutputFormat::Rows.format(&[ScoredResult {
            method: SearchMethod::Vector,
            id: RecordId::from_u64(7),
            text: "call me later".to_string(),
            score: None,
            rank: 1,
        }]);
        let output = format_human("call", &rows);
        assert!(output.contains("1. #7 [vector]\n"));
        assert!(!output.contains("score"));
    }

    #[test]
    fn test_format_json() {
        let output =
            format_json("free prize", SearchStrategy::Hybrid, &results(OutputFormat::Rows)).unwrap();
        assert!(output.contains("\"query\": \"free prize\""));
        assert!(output.contains("\"method\": \"hybrid\""));
        assert!(output.contains("\"format\": \"rows\""));
        assert!(output.contains("\"search_method\": \"fused\""));

        let output =
            format_json("free prize", SearchStrategy::Hybrid, &results(OutputFormat::Table))
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"]["rank"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_truncate_text() {
        let short = "Short text";
        assert_eq!(truncate_text(short, 50), short);

        let long = "This is a much longer text that should be truncated at a reasonable point";
        let truncated = truncate_text(long, 30);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 33); // 30 + "..."
    }
}
