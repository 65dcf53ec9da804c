//! Parsed response tree returned by a transport.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A nested mapping from field name to text or sub-tree.
///
/// Repeated sibling fields are collected into a `List`. The untagged serde
/// representation lets fixtures be written as plain JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseTree {
    Text(String),
    List(Vec<ResponseTree>),
    Node(BTreeMap<String, ResponseTree>),
}

impl Default for ResponseTree {
    fn default() -> Self {
        ResponseTree::Node(BTreeMap::new())
    }
}

impl ResponseTree {
    /// Direct child named `name` of a node.
    pub fn get(&self, name: &str) -> Option<&ResponseTree> {
        match self {
            ResponseTree::Node(map) => map.get(name),
            _ => None,
        }
    }

    /// Follows a path of field names.
    pub fn path(&self, path: &[&str]) -> Option<&ResponseTree> {
        path.iter().try_fold(self, |node, name| node.get(name))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseTree::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text of the leaf `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ResponseTree::as_text)
    }

    /// Owned text of the leaf `name`.
    pub fn string(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    /// Parses the leaf `name`, discarding values that do not parse.
    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.text(name).and_then(|s| s.trim().parse().ok())
    }

    /// Items of a repeated field. A single node counts as a list of one.
    pub fn items(&self) -> Vec<&ResponseTree> {
        match self {
            ResponseTree::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Inserts `value` under `name`, turning repeated names into a list.
    pub fn insert(&mut self, name: impl Into<String>, value: ResponseTree) {
        if !matches!(self, ResponseTree::Node(_)) {
            *self = ResponseTree::default();
        }
        if let ResponseTree::Node(map) = self {
            match map.entry(name.into()) {
                std::collections::btree_map::Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                std::collections::btree_map::Entry::Occupied(mut slot) => match slot.get_mut() {
                    ResponseTree::List(items) => items.push(value),
                    existing => {
                        let first = std::mem::take(existing);
                        *existing = ResponseTree::List(vec![first, value]);
                    }
                },
            }
        }
    }
}
