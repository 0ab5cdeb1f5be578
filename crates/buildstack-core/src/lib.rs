//! buildstack core
//!
//! Turns the definitions under `.buildstack/` into a CloudFormation
//! template and deploys it.
//!
//! ```text
//! project.yml ─┐
//! role.yml ────┼─> compose ─> write_template ─> StackService::deploy_stack ─> StatusPoller
//! schedule.yml ┘
//! ```

pub mod definition;
pub mod error;
pub mod logs;
pub mod naming;
pub mod project;
pub mod role;
pub mod schedule;
pub mod stack;
pub mod template;

pub use error::{CoreError, Result};
pub use logs::LogFetcher;
pub use naming::{inferred_project_name, inferred_stack_name, project_name_convention};
pub use project::{ProjectBuilder, ProjectDefinition};
pub use role::{RoleBuilder, RoleDefinition};
pub use schedule::{ScheduleBuilder, ScheduleDefinition};
pub use stack::{DeployOptions, DeployOutcome, DeploymentRequest, StackDeployer};
pub use template::{Fragment, Template, compose, needs_generated_role, write_template};
