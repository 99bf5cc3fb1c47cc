use crate::self_prelude::*;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("Unknown order field `{0}`.")]
    UnknownField(String),
    #[error("Unknown order direction `{0}`.")]
    UnknownDirection(String),
}

/// A field a connection may be sorted on.
///
/// Implementations are small enums, one per connection. The record key is
/// always used as the secondary sort key, so ties never reorder between pages.
pub trait OrderField:
    Copy + fmt::Debug + PartialEq + AsRef<str> + Send + Sync + 'static
{
    /// Every field, in declaration order.
    const ALL: &'static [Self];

    /// Node field (and storage column) the records are sorted by.
    fn field_name(&self) -> &'static str;

    /// Enum item name exposed in the GraphQL schema.
    fn graphql_name(&self) -> &'static str;

    /// Accepts either the client spelling (`spf-default`) or the GraphQL
    /// enum item (`SPF_DEFAULT`).
    fn from_name(name: &str) -> Result<Self, OrderingError> {
        Self::ALL
            .iter()
            .find(|field| field.as_ref() == name || field.graphql_name() == name)
            .copied()
            .ok_or_else(|| OrderingError::UnknownField(name.to_string()))
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum OrderDirection {
    #[default]
    #[strum(serialize = "ASC")]
    Asc,
    #[strum(serialize = "DESC")]
    Desc,
}

impl OrderDirection {
    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderSpec<F> {
    pub field: F,
    pub direction: OrderDirection,
}

impl<F: OrderField> OrderSpec<F> {
    pub fn new(field: F, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    pub fn parse(field: &str, direction: &str) -> Result<Self, OrderingError> {
        let field = F::from_name(field)?;
        let direction = OrderDirection::from_str(direction)
            .map_err(|_| OrderingError::UnknownDirection(direction.to_string()))?;
        Ok(Self { field, direction })
    }
}

/// Declare the order fields of one connection.
///
/// Each variant maps to `(client spelling, GraphQL item, node field)`.
macro_rules! order_fields {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($client:literal, $graphql:literal, $field:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
        pub enum $name {
            $(
                #[strum(to_string = $client, serialize = $graphql)]
                $variant,
            )+
        }

        impl $crate::ordering::OrderField for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn field_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $field,)+
                }
            }

            fn graphql_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $graphql,)+
                }
            }
        }
    };
}

pub(crate) use order_fields;
