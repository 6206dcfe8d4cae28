//! Employee directory filtering.

use serde::Deserialize;

use crate::models::{Department, PublicUser};

/// Directory query: free-text search plus an optional department.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
}

impl DirectoryFilter {
    fn matches(&self, user: &PublicUser) -> bool {
        if let Some(department) = self.department {
            if user.department != department {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&user.full_name, &user.title, &user.username]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }

    /// Returns the matching users sorted by full name.
    pub fn apply(&self, users: &[PublicUser]) -> Vec<PublicUser> {
        let mut matched: Vec<PublicUser> =
            users.iter().filter(|u| self.matches(u)).cloned().collect();
        matched.sort_by(|a, b| {
            a.full_name
                .to_lowercase()
                .cmp(&b.full_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        matched
    }
}
