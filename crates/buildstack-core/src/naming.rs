//! Project and stack naming conventions

use std::path::Path;

/// Project name when it cannot be derived from the project root
const FALLBACK_PROJECT_NAME: &str = "project";

/// Suffix of inferred stack names
const STACK_SUFFIX: &str = "cb";

/// Project name derived from the project root directory
pub fn inferred_project_name(project_root: &Path) -> String {
    project_root
        .file_name()
        .and_then(|name| name.to_str())
        .map(sanitize)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}

/// Full project name, with the environment suffix when one is configured
pub fn project_name_convention(project_name: &str, env_extra: Option<&str>) -> String {
    match env_extra.map(str::trim).filter(|extra| !extra.is_empty()) {
        Some(extra) => format!("{}-{}", project_name, extra),
        None => project_name.to_string(),
    }
}

/// Stack name derived from the full project name
pub fn inferred_stack_name(full_project_name: &str) -> String {
    format!("{}-{}", sanitize(full_project_name), STACK_SUFFIX)
}

/// Reduce a name to the stack-name alphabet: ASCII letters, digits and `-`
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    replaced
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inferred_project_name() {
        assert_eq!(inferred_project_name(Path::new("/src/demo-web")), "demo-web");
        assert_eq!(inferred_project_name(Path::new("/src/my_app.v2")), "my-app-v2");
        assert_eq!(inferred_project_name(Path::new("/")), "project");
    }

    #[test]
    fn test_project_name_convention() {
        assert_eq!(project_name_convention("demo", None), "demo");
        assert_eq!(project_name_convention("demo", Some("staging")), "demo-staging");
        assert_eq!(project_name_convention("demo", Some(" ")), "demo");
    }

    #[test]
    fn test_inferred_stack_name() {
        assert_eq!(inferred_stack_name("demo-staging"), "demo-staging-cb");
        assert_eq!(inferred_stack_name("demo__web"), "demo-web-cb");
    }
}
