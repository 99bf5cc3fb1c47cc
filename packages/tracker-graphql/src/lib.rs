//! # tracker-graphql
//!
//! Relay-style cursor connections for the tracker API: argument validation,
//! opaque cursors, window assembly over a pluggable [`source::DataSource`],
//! and `async_graphql::dynamic` types that expose the result.
//!
//! See: https://relay.dev/graphql/connections.htm

pub mod connection;
pub mod connections;
pub mod cursor;
pub mod error;
pub mod loader;
pub mod log;
pub mod ordering;
pub mod paging;
pub mod schema;
pub mod source;
pub mod testing;

pub(self) mod self_prelude {
    pub use async_trait::async_trait;
    pub use extension_trait::extension_trait;
    pub use serde_json::Value as JsonValue;
    pub use std::{fmt, str::FromStr, sync::Arc};
}

pub use connection::*;
pub use cursor::*;
pub use error::*;
pub use loader::*;
pub use log::*;
pub use ordering::*;
pub use paging::*;
pub use source::*;
