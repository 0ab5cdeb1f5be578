//! Build log retrieval

use crate::error::{CoreError, Result};
use buildstack_cloud::{BuildService, LogLine};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use std::time::Duration;
use tokio::time::sleep;

/// Prints the output of a single build
pub struct LogFetcher<'a> {
    service: &'a dyn BuildService,
    poll_interval: Duration,
}

impl<'a> LogFetcher<'a> {
    pub fn new(service: &'a dyn BuildService, poll_interval: Duration) -> Self {
        Self {
            service,
            poll_interval,
        }
    }

    /// The explicit build id, or the most recent build of the project
    pub async fn resolve_build_id(
        &self,
        build_id: Option<&str>,
        full_project_name: &str,
    ) -> Result<String> {
        if let Some(id) = build_id {
            return Ok(id.to_string());
        }

        let ids = self.service.list_build_ids(full_project_name).await?;
        ids.into_iter()
            .next()
            .ok_or_else(|| CoreError::NoBuilds(full_project_name.to_string()))
    }

    /// Print the build's log lines. With `follow`, keep polling until the
    /// build is no longer running and its stream is drained.
    ///
    /// Returns the number of lines printed.
    pub async fn run(&self, build_id: &str, follow: bool) -> Result<usize> {
        let mut token: Option<String> = None;
        let mut printed = 0usize;

        println!("Showing logs for build {}", build_id.green());

        loop {
            let build = self.service.build_info(build_id).await?;

            match build.log {
                Some(ref log) => loop {
                    let page = self.service.log_events(log, token.as_deref()).await?;
                    for line in &page.lines {
                        print_line(line);
                    }
                    printed += page.lines.len();

                    let exhausted = page.lines.is_empty()
                        || page.next_token.is_none()
                        || page.next_token == token;
                    if page.next_token.is_some() {
                        token = page.next_token;
                    }
                    if exhausted {
                        break;
                    }
                },
                None => tracing::debug!(build = build_id, "Log stream not available yet"),
            }

            if !follow || !build.is_in_progress() {
                if build.log.is_none() {
                    println!("{}", "No log stream is available for this build".yellow());
                }
                println!("Build status: {}", build_status(&build.status));
                tracing::debug!(build = build_id, lines = printed, "Finished log retrieval");
                return Ok(printed);
            }

            sleep(self.poll_interval).await;
        }
    }
}

fn build_status(status: &str) -> colored::ColoredString {
    match status {
        "SUCCEEDED" => status.green(),
        "IN_PROGRESS" => status.yellow(),
        _ => status.red(),
    }
}

fn print_line(line: &LogLine) {
    let message = line.message.trim_end_matches(['\n', '\r']);
    match line.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(ts) => println!(
            "{} {}",
            ts.with_timezone(&Local).format("%H:%M:%S").to_string().dimmed(),
            message
        ),
        None => println!("{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_colors_do_not_change_text() {
        colored::control::set_override(false);
        assert_eq!(build_status("SUCCEEDED").to_string(), "SUCCEEDED");
        assert_eq!(build_status("FAILED").to_string(), "FAILED");
    }
}
