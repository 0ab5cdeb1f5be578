pub mod deploy;
pub mod logs;

use buildstack_cloud_aws::AwsProvider;
use buildstack_config::Settings;
use colored::Colorize;

pub fn print_error(error: &dyn std::fmt::Display) {
    println!("{} {}", "ERROR:".red().bold(), error);
}

pub fn aws_provider(settings: &Settings) -> AwsProvider {
    AwsProvider::new(settings.region.clone(), settings.profile.clone())
}
