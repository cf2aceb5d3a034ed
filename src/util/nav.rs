//! Navigation items and active-route matching for the header.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

/// One entry in the primary navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { path: "/dashboard", label: "My Courses", description: "View your enrolled courses" },
    NavItem { path: "/analytics", label: "Analytics", description: "Track your learning progress" },
    NavItem { path: "/study-companion", label: "Assignments", description: "Complete quizzes and assignments" },
    NavItem { path: "/ai-tutor", label: "AI Tutor", description: "Get personalized help" },
];

/// `current` is `path` itself or nested below it.
#[must_use]
pub fn is_active_route(current: &str, path: &str) -> bool {
    current == path || current.strip_prefix(path).is_some_and(|rest| rest.starts_with('/'))
}
