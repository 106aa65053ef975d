//! Table processing order.
//!
//! Foreign keys are not discovered from either catalog. Instead a
//! hand-authored priority list names the parent entities that must land
//! before their dependents; every other table follows in natural order.

use std::collections::HashSet;
use tracing::debug;

/// Built-in priority list covering the application's known entity graph.
///
/// Parents precede children: posts reference users and categories, comments
/// reference posts and users, notifications reference users and comments.
pub const DEFAULT_TABLE_PRIORITY: &[&str] = &[
    "users",
    "categories",
    "tags",
    "posts",
    "post_tags",
    "comments",
    "notifications",
];

/// Produces a deterministic processing order from a priority list.
#[derive(Debug, Clone)]
pub struct DependencyOrderer {
    priority: Vec<String>,
}

impl Default for DependencyOrderer {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_PRIORITY.iter().map(|t| (*t).to_string()))
    }
}

impl DependencyOrderer {
    /// Creates an orderer over the given priority list.
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priority: priority.into_iter().map(Into::into).collect(),
        }
    }

    /// Orders the common tables for transfer.
    ///
    /// Priority tables present in `common_tables` come first in list order;
    /// the rest keep the order they were given in. Priority entries missing
    /// from `common_tables` are dropped. Each name is emitted once.
    pub fn order<S: AsRef<str>>(&self, common_tables: &[S]) -> Vec<String> {
        let present: HashSet<&str> = common_tables.iter().map(AsRef::as_ref).collect();
        let mut emitted: HashSet<&str> = HashSet::with_capacity(present.len());
        let mut order = Vec::with_capacity(present.len());

        for table in &self.priority {
            if present.contains(table.as_str()) {
                if emitted.insert(table.as_str()) {
                    order.push(table.clone());
                }
            } else {
                debug!("Priority table '{}' not present in both stores", table);
            }
        }

        for table in common_tables.iter().map(AsRef::as_ref) {
            if emitted.insert(table) {
                order.push(table.to_string());
            }
        }

        order
    }
}
