//! Build plans: the host that drives tasks through a build scope

pub mod runner;
pub mod schema;

pub use runner::{run_task, PlanReport, PlanRunner, TaskOutput, TaskReport};
pub use schema::{Plan, Stage, TaskSpec};
