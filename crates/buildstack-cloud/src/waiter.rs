//! Stack status polling
//!
//! Blocks until the remote service reports a terminal status for a stack.
//! The service exposes no completion callback, so this is a plain
//! query-sleep loop.

use crate::error::{CloudError, Result};
use crate::provider::StackService;
use crate::status::StackStatus;
use colored::Colorize;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Polling settings
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Delay between two status queries
    pub interval: Duration,

    /// Give up after this long. `None` waits until a terminal status.
    pub max_wait: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: None,
        }
    }
}

/// Polls a stack until it leaves the `_IN_PROGRESS` family
pub struct StatusPoller<'a> {
    service: &'a dyn StackService,
    config: WaitConfig,
    last_status: Option<StackStatus>,
}

impl<'a> StatusPoller<'a> {
    pub fn new(service: &'a dyn StackService, config: WaitConfig) -> Self {
        Self {
            service,
            config,
            last_status: None,
        }
    }

    /// Wait for `stack_name` to reach a terminal status and return it
    pub async fn wait(&mut self, stack_name: &str) -> Result<StackStatus> {
        let started = Instant::now();

        loop {
            let stack = self.service.describe_stack(stack_name).await?;
            let status = stack.status;

            if self.last_status.as_ref() != Some(&status) {
                println!("Stack status: {}", status.as_str().yellow());
                tracing::debug!(stack = stack_name, status = %status, "Stack status changed");
            }
            self.last_status = Some(status.clone());

            if status.is_terminal() {
                if let Some(reason) = stack.status_reason.filter(|_| status.is_failed()) {
                    println!("  reason: {}", reason);
                }
                return Ok(status);
            }

            if let Some(max_wait) = self.config.max_wait {
                if started.elapsed() + self.config.interval > max_wait {
                    return Err(CloudError::Timeout(format!(
                        "stack {} still {} after {}s",
                        stack_name,
                        status,
                        max_wait.as_secs()
                    )));
                }
            }

            sleep(self.config.interval).await;
        }
    }

    /// Last observed status, if any
    pub fn last_status(&self) -> Option<&StackStatus> {
        self.last_status.as_ref()
    }

    /// Whether the last observed status is a successful terminal one
    pub fn success(&self) -> bool {
        self.last_status
            .as_ref()
            .is_some_and(StackStatus::is_success)
    }
}
