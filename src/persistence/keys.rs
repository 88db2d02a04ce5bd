//! Stable storage keys
//!
//! The key names are shared with existing stored data and backup files and
//! must not change.

pub const KEY_PREFIX: &str = "aesthetic_planner_";

pub const GOALS_KEY: &str = "aesthetic_planner_goals";
pub const TASKS_KEY: &str = "aesthetic_planner_tasks";
pub const VISION_KEY: &str = "aesthetic_planner_vision";
pub const TAB_KEY: &str = "aesthetic_planner_tab";
pub const MONTH_KEY: &str = "aesthetic_planner_month";
pub const CHAT_HISTORY_KEY: &str = "aesthetic_planner_chat_history";
pub const EXPANDED_GOALS_KEY: &str = "aesthetic_planner_expanded_goals";

/// Keys holding goals, tasks and vision data
pub const CORE_KEYS: [&str; 3] = [VISION_KEY, GOALS_KEY, TASKS_KEY];

/// Suffix of in-flight writes in directory stores; never a key
pub const TMP_SUFFIX: &str = ".tmp";

/// True for keys in the planner's namespace
pub fn is_planner_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX) && key.len() > KEY_PREFIX.len()
}

pub fn is_core_key(key: &str) -> bool {
    CORE_KEYS.contains(&key)
}

/// Keys every backend can hold: ASCII alphanumerics and `_-.`, not hidden and
/// not a temp-file name
pub fn is_storable_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(TMP_SUFFIX)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
