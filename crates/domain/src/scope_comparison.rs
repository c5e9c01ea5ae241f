use std::collections::BTreeSet;

use serde::Serialize;

use crate::ScopeState;

/// Whether one entity holds a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityPresence {
    /// App or service id.
    pub entity_id: String,
    /// Whether the scope is active for the entity.
    pub has_scope: bool,
}

/// Presence of one scope across all compared entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopePresenceRow {
    /// Scope name.
    pub scope: String,
    /// One entry per compared entity, in input order.
    pub presence: Vec<EntityPresence>,
}

/// Scope × entity presence matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeComparison {
    /// Sorted union of all active scopes.
    pub scopes: Vec<String>,
    /// One row per scope in `scopes`.
    pub comparison: Vec<ScopePresenceRow>,
}

/// Compares the active scopes of several entities.
#[must_use]
pub fn compare_scopes(states: &[ScopeState]) -> ScopeComparison {
    let scopes: Vec<String> = states
        .iter()
        .flat_map(|state| state.active_scopes.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let comparison = scopes
        .iter()
        .map(|scope| ScopePresenceRow {
            scope: scope.clone(),
            presence: states
                .iter()
                .map(|state| EntityPresence {
                    entity_id: state.entity_id.clone(),
                    has_scope: state.has_scope(scope),
                })
                .collect(),
        })
        .collect();

    ScopeComparison { scopes, comparison }
}
