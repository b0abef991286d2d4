//! Version command - calculate the version in a one-shot scope

use crate::cache::BuildScope;
use crate::cli::args::{OutputFormat, VersionArgs};
use crate::config::Config;
use crate::diagnostics::TracingLog;
use crate::error::BuildMemoResult;
use crate::version::{ExternalTool, VersionOutcome, VersionTask};
use console::style;

/// Execute the version command
pub async fn execute(args: VersionArgs, config: &Config) -> BuildMemoResult<()> {
    let tool = ExternalTool::new(super::tool_config(config, args.program.as_deref()));
    let options = args.options.with_defaults(&config.defaults);

    let scope = BuildScope::begin();
    let outcome = VersionTask::new(&scope, &tool, &TracingLog)
        .execute(&options)
        .await?;
    scope.end().await;

    match args.format {
        OutputFormat::Plain => println!("{}", outcome.version),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Table => print_table(&outcome),
    }

    Ok(())
}

fn print_table(outcome: &VersionOutcome) {
    println!("{:<16} {}", style("VERSION").bold(), outcome.version);
    if let Some(ref parts) = outcome.parts {
        println!("{:<16} {}", style("MAJOR").bold(), parts.major);
        println!("{:<16} {}", style("MINOR").bold(), parts.minor);
        println!("{:<16} {}", style("PATCH").bold(), parts.patch);
        println!("{:<16} {}", style("PRE-RELEASE").bold(), parts.pre_release);
        println!("{:<16} {}", style("BUILD METADATA").bold(), parts.build_metadata);
    }
    println!("{:<16} {}", style("KEY").bold(), outcome.fingerprint);
}
