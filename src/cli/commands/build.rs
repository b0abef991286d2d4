//! Build command - run a plan inside a single cache scope

use crate::cli::args::{BuildArgs, OutputFormat};
use crate::config::Config;
use crate::diagnostics::TracingLog;
use crate::error::BuildMemoResult;
use crate::plan::{Plan, PlanReport, PlanRunner, TaskOutput, TaskReport};
use crate::version::ExternalTool;
use console::style;
use std::sync::Arc;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> BuildMemoResult<()> {
    let plan = Plan::load(&args.plan).await?;
    debug!("Loaded plan {}", args.plan.display());

    let tool = ExternalTool::new(super::tool_config(config, args.program.as_deref()));
    let runner = PlanRunner::new(Arc::new(tool), Arc::new(TracingLog), config.defaults.clone());
    let report = runner.run(&plan).await?;

    match args.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Plain => print_plain(&report),
    }

    Ok(())
}

/// One-line description of a task's result
fn describe(output: &TaskOutput) -> String {
    match output {
        TaskOutput::CacheSet { key } => format!("{} stored", key),
        TaskOutput::CacheGet {
            key,
            found: true,
            value: Some(value),
        } => format!("{} = {}", key, value),
        TaskOutput::CacheGet {
            key, found: true, ..
        } => format!("{} (no value)", key),
        TaskOutput::CacheGet { key, .. } => format!("{} (absent)", key),
        TaskOutput::Version(outcome) => outcome.version.clone(),
    }
}

fn kind(report: &TaskReport) -> &'static str {
    match report.output {
        TaskOutput::CacheSet { .. } => "cache-set",
        TaskOutput::CacheGet { .. } => "cache-get",
        TaskOutput::Version(_) => "version",
    }
}

fn print_table(report: &PlanReport) {
    println!(
        "{:<20} {:<6} {:<10} {:<40} {:<8}",
        style("STAGE").bold(),
        style("TASK").bold(),
        style("KIND").bold(),
        style("RESULT").bold(),
        style("CACHED").bold()
    );
    println!("{}", "-".repeat(88));

    for task in &report.tasks {
        let cached = match &task.output {
            TaskOutput::Version(v) if v.cached => style("hit").green(),
            TaskOutput::Version(_) => style("miss").yellow(),
            _ => style("-").dim(),
        };
        println!(
            "{:<20} {:<6} {:<10} {:<40} {:<8}",
            task.stage,
            task.index,
            kind(task),
            describe(&task.output),
            cached
        );
    }

    println!();
    println!(
        "{} task(s), {} version cache hit(s), {}ms",
        report.tasks.len(),
        report.cache_hits(),
        report.scope.duration().num_milliseconds()
    );
}

fn print_json(report: &PlanReport) -> BuildMemoResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(report: &PlanReport) {
    for task in &report.tasks {
        println!(
            "{}/{} {} {}",
            task.stage,
            task.index,
            kind(task),
            describe(&task.output)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionOutcome;

    #[test]
    fn describe_distinguishes_lookup_results() {
        let found = TaskOutput::CacheGet {
            key: "k".to_string(),
            found: true,
            value: Some(String::new()),
        };
        let bare = TaskOutput::CacheGet {
            key: "k".to_string(),
            found: true,
            value: None,
        };
        let absent = TaskOutput::CacheGet {
            key: "k".to_string(),
            found: false,
            value: None,
        };

        assert_eq!(describe(&found), "k = ");
        assert_eq!(describe(&bare), "k (no value)");
        assert_eq!(describe(&absent), "k (absent)");
    }

    #[test]
    fn describe_version() {
        let output = TaskOutput::Version(VersionOutcome {
            version: "1.2.0".to_string(),
            cached: true,
            fingerprint: "abcdef012345".to_string(),
            parts: None,
        });
        assert_eq!(describe(&output), "1.2.0");
    }
}
