//! AWS provider for buildstack
//!
//! This crate implements the StackService and BuildService traits for AWS,
//! deploying CloudFormation stacks and reading CodeBuild output.
//!
//! # Features
//!
//! - Stack create-or-update (replacing stacks stuck in ROLLBACK_COMPLETE)
//! - Stack status lookup
//! - CodeBuild build listing and CloudWatch log retrieval
//!
//! # Requirements
//!
//! - `aws` CLI v2 must be installed and configured
//! - Credentials and default region come from the aws CLI configuration
//!
//! # Example
//!
//! ```ignore
//! use buildstack_cloud::StackService;
//! use buildstack_cloud_aws::AwsProvider;
//!
//! let provider = AwsProvider::new(None, None);
//!
//! let stack = provider.find_stack("demo-cb").await?;
//! println!("{:?}", stack.map(|s| s.status));
//! ```

pub mod aws_cli;
pub mod error;
pub mod provider;

pub use aws_cli::{AwsCli, BuildDetail, StackInfo};
pub use error::{AwsError, Result};
pub use provider::AwsProvider;
