//! Maps the current navigation path to the label reported with every activity record.

/// Product label sent as `app_name` with every payload.
pub const APP_LABEL: &str = "Task Manager Web";

/// Label used for any path missing from [PAGE_LABELS].
pub const DEFAULT_PAGE_LABEL: &str = "Task Manager";

/// Exact path to label table. Paths are matched as whole strings, so `/tasks/12` does not
/// resolve to the `/tasks` entry.
pub const PAGE_LABELS: &[(&str, &str)] = &[
    ("/", "Dashboard"),
    ("/dashboard", "Dashboard"),
    ("/tasks", "Tasks Management"),
    ("/reports", "Reports"),
    ("/activity", "Activity Log"),
    ("/notifications", "Notifications"),
    ("/profile", "Profile"),
    ("/settings", "Settings"),
    ("/login", "Login"),
    ("/register", "Register"),
];

pub fn resolve_page_label(path: &str) -> &'static str {
    PAGE_LABELS
        .iter()
        .find(|(known, _)| *known == path)
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_PAGE_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_path() {
        assert_eq!(resolve_page_label("/tasks"), "Tasks Management");
        assert_eq!(resolve_page_label("/"), "Dashboard");
    }

    #[test]
    fn test_unknown_path_falls_back() {
        assert_eq!(resolve_page_label("/unknown-path"), DEFAULT_PAGE_LABEL);
        assert_eq!(resolve_page_label(""), DEFAULT_PAGE_LABEL);
    }

    #[test]
    fn test_no_prefix_matching() {
        assert_eq!(resolve_page_label("/tasks/extra"), DEFAULT_PAGE_LABEL);
        assert_eq!(resolve_page_label("/tasks/"), DEFAULT_PAGE_LABEL);
        assert_eq!(resolve_page_label("/TASKS"), DEFAULT_PAGE_LABEL);
    }
}
