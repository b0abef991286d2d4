//! CLI command implementations

pub mod build;
pub mod config;
pub mod version;

pub use build::execute as build;
pub use config::execute as config;
pub use version::execute as version;

use crate::config::{Config, ToolConfig};

/// Tool settings from config, with an optional program override from the command line
fn tool_config(config: &Config, program: Option<&str>) -> ToolConfig {
    let mut tool = config.tool.clone();
    if let Some(program) = program {
        tool.program = program.to_string();
    }
    tool
}
