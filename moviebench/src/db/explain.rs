//! EXPLAIN ANALYZE instrumentation.
//!
//! `EXPLAIN ANALYZE` really executes the statement it analyzes. Every pass
//! here therefore runs inside a transaction that is rolled back on all exit
//! paths, so no analyzed statement's effects are ever committed and repeated
//! benchmarking against production-shaped data stays safe.

use crate::db::errors::Result;
use sqlx::{PgPool, Row};

/// Run `query` under `EXPLAIN (ANALYZE, BUFFERS, VERBOSE, FORMAT TEXT)` and
/// return the plan lines newline-joined, in server order.
///
/// The transaction is rolled back on every path: explicitly on success, and
/// by the [`sqlx::Transaction`] drop guard on any error return.
pub async fn run_explain(pool: &PgPool, query: &str, binds: &[&str]) -> Result<String> {
    let mut tx = pool.begin().await?;

    let explain_sql = format!("EXPLAIN (ANALYZE, BUFFERS, VERBOSE, FORMAT TEXT) {query}");
    let mut explain_query = sqlx::query(&explain_sql);
    for bind in binds {
        explain_query = explain_query.bind(*bind);
    }

    let rows = explain_query.fetch_all(&mut *tx).await?;

    let mut plan = String::new();
    for row in &rows {
        let line: String = row.try_get(0)?;
        plan.push_str(&line);
        plan.push('\n');
    }

    tx.rollback().await?;
    Ok(plan)
}

/// Extract the execution time in milliseconds from plan text.
///
/// Scans for the first line containing `Execution Time:` and parses the
/// token following `Time:`; the trailing unit (`ms`) is a separate token and
/// ignored. A missing or malformed timing line degrades to `0.0` rather than
/// failing the caller's request.
pub fn extract_execution_time(plan: &str) -> f64 {
    for line in plan.lines() {
        if line.contains("Execution Time:") {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            for (i, token) in tokens.iter().enumerate() {
                if *token == "Time:" {
                    return tokens
                        .get(i + 1)
                        .and_then(|t| t.parse().ok())
                        .unwrap_or(0.0);
                }
            }
        }
    }
    0.0
}

/// One labelled EXPLAIN pass of a multi-section report.
#[derive(Debug, Clone)]
pub struct ExplainSection {
    /// Header label, e.g. `CAST QUERY`.
    pub label: &'static str,
    /// Summary-block label, e.g. `Cast Query`.
    pub summary_label: &'static str,
    /// Raw plan text as returned by [`run_explain`].
    pub plan: String,
    /// Extracted execution time in milliseconds (0.0 when unparseable).
    pub execution_time_ms: f64,
}

impl ExplainSection {
    pub fn new(label: &'static str, summary_label: &'static str, plan: String) -> Self {
        let execution_time_ms = extract_execution_time(&plan);
        Self {
            label,
            summary_label,
            plan,
            execution_time_ms,
        }
    }
}

/// Render the fixed-format comparison report: a header per section, its raw
/// plan, a blank line, then a SUMMARY block with per-section times to three
/// decimal places and a TOTAL equal to their sum.
///
/// The exact layout is a compatibility surface; downstream tooling may parse
/// it. Section order is execution order.
pub fn render_report(sections: &[ExplainSection]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for section in sections {
        let _ = writeln!(out, "========== {} ==========", section.label);
        out.push_str(&section.plan);
        out.push('\n');
    }

    out.push_str("========== SUMMARY ==========\n");
    let mut total = 0.0;
    for section in sections {
        let _ = writeln!(
            out,
            "{:<28}{:.3} ms",
            format!("{}:", section.summary_label),
            section.execution_time_ms
        );
        total += section.execution_time_ms;
    }
    out.push_str("─────────────────────────────────────\n");
    let _ = writeln!(out, "{:<28}{:.3} ms", "TOTAL:", total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_execution_time_from_plan_line() {
        let plan = "Seq Scan on title_basics  (cost=0.00..1.00 rows=1 width=4)\n\
                    Planning Time: 0.100 ms\n\
                    Execution Time: 12.345 ms\n";
        assert_eq!(extract_execution_time(plan), 12.345);
    }

    #[test]
    fn missing_timing_line_yields_zero() {
        assert_eq!(extract_execution_time(""), 0.0);
        assert_eq!(extract_execution_time("Seq Scan on movies\nPlanning Time: 1.0 ms\n"), 0.0);
    }

    #[test]
    fn malformed_timing_token_yields_zero() {
        assert_eq!(extract_execution_time("Execution Time: garbage ms\n"), 0.0);
        // No standalone "Time:" token to anchor on.
        assert_eq!(extract_execution_time("Execution Time:12.345 ms\n"), 0.0);
    }

    fn section(label: &'static str, summary_label: &'static str, ms: f64) -> ExplainSection {
        ExplainSection::new(label, summary_label, format!("Some Plan\nExecution Time: {ms} ms\n"))
    }

    #[test]
    fn report_total_is_sum_of_section_times() {
        let sections = [
            section("MAIN QUERY (Movie Details)", "Main Query (Movie Details)", 1.5),
            section("CAST QUERY", "Cast Query", 2.25),
            section("CREW QUERY", "Crew Query", 3.125),
        ];
        let report = render_report(&sections);

        let expected_total: f64 = sections.iter().map(|s| s.execution_time_ms).sum();
        assert!((expected_total - 6.875).abs() < 1e-6);
        assert!(report.contains("TOTAL:                      6.875 ms"));
    }

    #[test]
    fn report_layout_matches_fixed_format() {
        let sections = [
            section("MAIN QUERY (Movie Details)", "Main Query (Movie Details)", 1.0),
            section("CAST QUERY", "Cast Query", 2.0),
            section("CREW QUERY", "Crew Query", 3.0),
        ];
        let report = render_report(&sections);

        assert!(report.starts_with("========== MAIN QUERY (Movie Details) ==========\n"));
        assert!(report.contains("========== CAST QUERY ==========\n"));
        assert!(report.contains("========== CREW QUERY ==========\n"));
        assert!(report.contains("========== SUMMARY ==========\n"));
        assert!(report.contains("Main Query (Movie Details): 1.000 ms\n"));
        assert!(report.contains("Cast Query:                 2.000 ms\n"));
        assert!(report.contains("Crew Query:                 3.000 ms\n"));

        // Sections appear in execution order, each plan followed by a blank line.
        let main_at = report.find("MAIN QUERY").unwrap();
        let cast_at = report.find("CAST QUERY").unwrap();
        let crew_at = report.find("CREW QUERY").unwrap();
        assert!(main_at < cast_at && cast_at < crew_at);
    }
}
