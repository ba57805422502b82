//! Final result text of a completed run.

use std::fmt::Write;

use crewboard_core::types::Timestamp;
use crewboard_db::models::agent::Agent;
use crewboard_db::models::crew::Crew;
use crewboard_db::models::task::Task;

/// Everything a report may reference.
pub struct ReportContext<'a> {
    pub crew: &'a Crew,
    pub agents: &'a [Agent],
    pub tasks: &'a [Task],
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub tokens_used: i64,
    pub api_calls: i64,
}

/// Renders the `result` of a completed execution.
pub trait ReportGenerator: Send + Sync {
    fn generate(&self, ctx: &ReportContext<'_>) -> String;
}

const RECOMMENDATIONS: &[&str] = &[
    "All agents performed as expected",
    "Tasks completed within acceptable timeframes",
    "Consider optimizing token usage for cost efficiency",
    "Monitor execution patterns for future improvements",
];

const FOOTER: &str = "*Generated by Crewboard*";

/// Markdown summary of crew, members and usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

impl ReportGenerator for MarkdownReport {
    fn generate(&self, ctx: &ReportContext<'_>) -> String {
        let elapsed = (ctx.finished_at - ctx.started_at).num_milliseconds().max(0) as f64 / 1000.0;
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "# Crew Execution Report: {}", ctx.crew.name);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out, "- **Crew**: {}", ctx.crew.name);
        let _ = writeln!(
            out,
            "- **Description**: {}",
            ctx.crew.description.as_deref().unwrap_or("No description")
        );
        let _ = writeln!(out, "- **Agents**: {}", ctx.agents.len());
        let _ = writeln!(out, "- **Tasks**: {}", ctx.tasks.len());
        let _ = writeln!(out, "- **Status**: Completed Successfully");
        let _ = writeln!(out);
        let _ = writeln!(out, "## Execution Details");
        let _ = writeln!(out, "- **Started**: {}", ctx.started_at.to_rfc3339());
        let _ = writeln!(out, "- **Completed**: {}", ctx.finished_at.to_rfc3339());
        let _ = writeln!(out, "- **Duration**: {elapsed:.2} seconds");
        let _ = writeln!(out, "- **Tokens Used**: {}", ctx.tokens_used);
        let _ = writeln!(out, "- **API Calls**: {}", ctx.api_calls);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Agent Performance");
        for agent in ctx.agents {
            let _ = writeln!(out, "- **{}** ({}): Completed successfully", agent.name, agent.role);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Task Results");
        for task in ctx.tasks {
            let _ = writeln!(out, "- **{}**: {}", task.name, task.description);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Recommendations");
        for (i, line) in RECOMMENDATIONS.iter().enumerate() {
            let _ = writeln!(out, "{}. {line}", i + 1);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "{FOOTER}");

        out.trim_end().to_string()
    }
}
