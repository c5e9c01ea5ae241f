use serde::Serialize;

/// Name of the bucket collecting scopes no rule matches.
pub const OTHER_CATEGORY: &str = "Other";

/// Category rules in display order. A scope matches on the part before its
/// first `:`, then on the first `.`-segment of that part.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Conversations",
        &["channels", "groups", "im", "mpim", "conversations"],
    ),
    ("Messaging", &["chat", "incoming-webhook"]),
    ("Users", &["users", "users.profile", "usergroups", "dnd"]),
    ("Files", &["files", "remote_files"]),
    ("Reactions & Pins", &["reactions", "pins", "stars", "bookmarks"]),
    ("Workspace", &["team", "emoji", "workflow", "calls", "reminders"]),
    ("Search", &["search"]),
    ("Links", &["links"]),
    ("Admin", &["admin", "auditlogs"]),
    ("Identity", &["identity", "identify", "openid", "email", "profile"]),
    (
        "App Features",
        &["commands", "bot", "app_mentions", "connections", "tokens"],
    ),
];

/// Scopes grouped under one category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeCategory {
    /// Category display name.
    pub name: String,
    /// Scopes in input order.
    pub scopes: Vec<String>,
}

/// Result of categorizing a scope list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorizedScopes {
    /// Non-empty categories in display order.
    pub categories: Vec<ScopeCategory>,
    /// Number of input scopes.
    pub total: usize,
}

/// Groups scopes into display categories.
#[must_use]
pub fn categorize_scopes(scopes: &[String]) -> CategorizedScopes {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); CATEGORY_RULES.len() + 1];

    for scope in scopes {
        let index = category_index(scope).unwrap_or(CATEGORY_RULES.len());
        buckets[index].push(scope.clone());
    }

    let categories = CATEGORY_RULES
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once(OTHER_CATEGORY))
        .zip(buckets)
        .filter(|(_, scopes)| !scopes.is_empty())
        .map(|(name, scopes)| ScopeCategory {
            name: name.to_owned(),
            scopes,
        })
        .collect();

    CategorizedScopes {
        categories,
        total: scopes.len(),
    }
}

/// Returns the category name for one scope.
#[must_use]
pub fn category_of(scope: &str) -> &'static str {
    category_index(scope)
        .map(|index| CATEGORY_RULES[index].0)
        .unwrap_or(OTHER_CATEGORY)
}

fn category_index(scope: &str) -> Option<usize> {
    let prefix = scope.split(':').next().unwrap_or(scope);
    let base = prefix.split('.').next().unwrap_or(prefix);

    find_rule(prefix).or_else(|| find_rule(base))
}

fn find_rule(key: &str) -> Option<usize> {
    CATEGORY_RULES
        .iter()
        .position(|(_, prefixes)| prefixes.contains(&key))
}
