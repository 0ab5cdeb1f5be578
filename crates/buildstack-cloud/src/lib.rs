//! buildstack cloud abstraction
//!
//! Remote-service seam for buildstack. Providers implement
//! [`StackService`] (stack submission and lookup) and [`BuildService`]
//! (build listing and log retrieval); everything here is provider-neutral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 buildstack CLI                   │
//! │              (buildstack deploy/logs)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               buildstack-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait StackService / trait BuildService │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  classify    │  │ StatusPoller │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │      aws      │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod classify;
pub mod error;
pub mod provider;
pub mod status;
pub mod waiter;

// Re-exports
pub use classify::{ClassifiedError, ErrorContext, classify};
pub use error::{CloudError, Result};
pub use provider::{
    BuildInfo, BuildService, DEFAULT_REGION, LogLine, LogLocation, LogPage, StackDescription,
    StackService, console_url,
};
pub use status::StackStatus;
pub use waiter::{StatusPoller, WaitConfig};
