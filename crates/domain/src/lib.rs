//! Integration log model and the pure projections derived from it.

#![forbid(unsafe_code)]

mod integration_log;
mod scope_category;
mod scope_comparison;
mod scope_state;
mod timeline;
mod user_activity;

pub use integration_log::{
    ChangeType, DisabledReason, IntegrationLogPage, LogEvent, PagingInfo, UNKNOWN_ENTITY_ID,
    parse_scopes,
};
pub use scope_category::{
    CategorizedScopes, OTHER_CATEGORY, ScopeCategory, categorize_scopes, category_of,
};
pub use scope_comparison::{EntityPresence, ScopeComparison, ScopePresenceRow, compare_scopes};
pub use scope_state::{ScopeState, reduce_all_entities, reduce_scopes};
pub use timeline::{
    TimelineEntry, build_timeline, filter_timeline_by_days, filter_timeline_by_entity,
};
pub use user_activity::{UserAction, UserSummary, build_user_summaries};
