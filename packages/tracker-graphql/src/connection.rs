use crate::{cursor::Cursor, self_prelude::*};
use serde::Serialize;

/// Pagination metadata for one page.
///
/// With no edges the page collapses to the zero state: both flags false and
/// both cursors empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Cursor,
    pub end_cursor: Cursor,
}

impl PageInfo {
    pub fn is_zero(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge<N> {
    pub cursor: Cursor,
    pub node: N,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub total_count: u64,
    pub page_info: PageInfo,
}

impl<N> Connection<N> {
    pub fn empty(total_count: u64) -> Self {
        Self {
            edges: Vec::new(),
            total_count,
            page_info: PageInfo::default(),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// A record that can carry its public identifier.
pub trait ConnectionNode {
    /// Overwrite the node's `id` with the record key.
    fn assign_id(&mut self, key: &str);
}

impl ConnectionNode for JsonValue {
    fn assign_id(&mut self, key: &str) {
        if let JsonValue::Object(map) = self {
            map.insert("id".to_string(), JsonValue::String(key.to_string()));
        }
    }
}
