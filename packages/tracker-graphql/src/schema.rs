//! `async_graphql::dynamic` extensions for cursor connections.
//! See: https://relay.dev/graphql/connections.htm

use crate::{
    connection::{Connection, Edge, PageInfo},
    error::ConnectionError,
    loader::ConnectionLoader,
    ordering::{OrderField, OrderSpec},
    paging::PaginationArgs,
    self_prelude::*,
    source::{DataSource, OwnerFilter},
};
use async_graphql::{
    dynamic::{
        Enum, Field, FieldFuture, FieldValue, InputObject, InputValue, Object,
        ResolverContext, Scalar, SchemaBuilder, TypeRef, ValueAccessor,
    },
    ErrorExtensions, Value,
};
use chrono::NaiveDate;

/// Identity of the requesting user, stored in the request data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub const ANONYMOUS: &'static str = "anonymous";
}

#[extension_trait]
pub impl TypeRefConnectionExt for TypeRef {
    const PAGE_INFO: &'static str = "PageInfo";
    const ORDER_DIRECTION: &'static str = "OrderDirection";
    const JSON: &'static str = "JSON";

    fn connection(node_name: impl Into<String>) -> String {
        format!("{}Connection", node_name.into())
    }

    fn edge(node_name: impl Into<String>) -> String {
        format!("{}Edge", node_name.into())
    }

    fn order_input(node_name: impl Into<String>) -> String {
        format!("{}Order", node_name.into())
    }

    fn order_field(node_name: impl Into<String>) -> String {
        format!("{}OrderField", node_name.into())
    }
}

fn parent_field<T, V>(
    name: &str,
    type_ref: TypeRef,
    get: fn(&T) -> V,
) -> Field
where
    T: Send + Sync + 'static,
    V: Into<Value> + 'static,
{
    Field::new(name, type_ref, move |ctx| {
        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<T>()?;
            Ok(Some(FieldValue::value(get(parent))))
        })
    })
}

#[extension_trait]
pub impl ObjectConnectionExt for Object {
    /// `<Node>Connection`, resolved from a `Connection<serde_json::Value>`.
    fn new_connection(node_name: impl Into<String>) -> Self {
        let node_name = node_name.into();
        Self::new(TypeRef::connection(node_name.clone()))
            .field(Field::new(
                "edges",
                TypeRef::named_nn_list_nn(TypeRef::edge(node_name)),
                |ctx| {
                    FieldFuture::new(async move {
                        let connection =
                            ctx.parent_value.try_downcast_ref::<Connection<JsonValue>>()?;
                        let edges = connection.edges.iter().cloned().map(FieldValue::owned_any);
                        Ok(Some(FieldValue::list(edges)))
                    })
                },
            ))
            .field(Field::new(
                "pageInfo",
                TypeRef::named_nn(TypeRef::PAGE_INFO),
                |ctx| {
                    FieldFuture::new(async move {
                        let connection =
                            ctx.parent_value.try_downcast_ref::<Connection<JsonValue>>()?;
                        Ok(Some(FieldValue::owned_any(connection.page_info.clone())))
                    })
                },
            ))
            .field(parent_field(
                "totalCount",
                TypeRef::named_nn(TypeRef::INT),
                |connection: &Connection<JsonValue>| {
                    i64::try_from(connection.total_count).unwrap_or(i64::MAX)
                },
            ))
    }

    /// `<Node>Edge`, resolved from an `Edge<serde_json::Value>`.
    fn new_edge(node_name: impl Into<String>) -> Self {
        let node_name = node_name.into();
        Self::new(TypeRef::edge(node_name.clone()))
            .field(parent_field(
                "cursor",
                TypeRef::named_nn(TypeRef::STRING),
                |edge: &Edge<JsonValue>| edge.cursor.clone(),
            ))
            .field(Field::new("node", TypeRef::named_nn(node_name), |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<Edge<JsonValue>>()?;
                    Ok(Some(FieldValue::owned_any(edge.node.clone())))
                })
            }))
    }

    /// Add a field read from the parent JSON node under the same name.
    fn json_field(self, name: &str, type_ref: TypeRef) -> Self {
        let key = name.to_string();
        self.field(Field::new(name, type_ref, move |ctx| {
            let key = key.clone();
            FieldFuture::new(async move {
                let node = ctx.parent_value.try_downcast_ref::<JsonValue>()?;
                match node.get(&key) {
                    None | Some(JsonValue::Null) => Ok(None),
                    Some(value) => Ok(Some(FieldValue::value(Value::from_json(value.clone())?))),
                }
            })
        }))
    }
}

#[extension_trait]
pub impl SchemaBuilderConnectionExt for SchemaBuilder {
    fn register_paging_types(self) -> Self {
        // See: https://relay.dev/graphql/connections.htm#sec-PageInfo
        let page_info_object = Object::new(TypeRef::PAGE_INFO)
            .field(parent_field(
                "hasNextPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                |page_info: &PageInfo| page_info.has_next_page,
            ))
            .field(parent_field(
                "hasPreviousPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                |page_info: &PageInfo| page_info.has_previous_page,
            ))
            .field(parent_field(
                "startCursor",
                TypeRef::named_nn(TypeRef::STRING),
                |page_info: &PageInfo| page_info.start_cursor.clone(),
            ))
            .field(parent_field(
                "endCursor",
                TypeRef::named_nn(TypeRef::STRING),
                |page_info: &PageInfo| page_info.end_cursor.clone(),
            ));
        let order_direction_enum = Enum::new(TypeRef::ORDER_DIRECTION)
            .item("ASC")
            .item("DESC");
        let json_scalar = Scalar::new(TypeRef::JSON)
            .description("Any JSON value; checked by the field that accepts it.");

        self.register(page_info_object)
            .register(order_direction_enum)
            .register(json_scalar)
    }

    /// Register the connection, edge and ordering types of one node type.
    fn register_connection_types<F: OrderField>(self, node_name: &str) -> Self {
        let order_field_enum = F::ALL.iter().fold(
            Enum::new(TypeRef::order_field(node_name)),
            |order_enum, field| order_enum.item(field.graphql_name()),
        );
        let order_input = InputObject::new(TypeRef::order_input(node_name))
            .field(InputValue::new(
                "field",
                TypeRef::named_nn(TypeRef::order_field(node_name)),
            ))
            .field(InputValue::new(
                "direction",
                TypeRef::named_nn(TypeRef::ORDER_DIRECTION),
            ));

        self.register(Object::new_connection(node_name))
            .register(Object::new_edge(node_name))
            .register(order_field_enum)
            .register(order_input)
    }
}

#[extension_trait]
pub impl FieldConnectionExt for Field {
    /// See: https://relay.dev/graphql/connections.htm#sec-Arguments
    fn paging_arguments(self) -> Self {
        self.argument(
            InputValue::new("first", TypeRef::named(TypeRef::JSON))
                .description("Paginate forward, returning the given amount of edges at most."),
        )
        .argument(
            InputValue::new("after", TypeRef::named(TypeRef::STRING))
                .description("Return edges after the given cursor."),
        )
        .argument(
            InputValue::new("last", TypeRef::named(TypeRef::JSON))
                .description("Paginate backward, returning the given amount of edges at most."),
        )
        .argument(
            InputValue::new("before", TypeRef::named(TypeRef::STRING))
                .description("Return edges before the given cursor."),
        )
    }

    fn connection_arguments(self, node_name: &str) -> Self {
        self.paging_arguments()
            .argument(InputValue::new(
                "orderBy",
                TypeRef::named(TypeRef::order_input(node_name)),
            ))
            .argument(
                InputValue::new("startDate", TypeRef::named(TypeRef::STRING))
                    .description("Earliest day to include, as `YYYY-MM-DD`."),
            )
            .argument(
                InputValue::new("endDate", TypeRef::named(TypeRef::STRING))
                    .description("Latest day to include, as `YYYY-MM-DD`."),
            )
    }
}

fn present<'a>(ctx: &'a ResolverContext<'_>, name: &str) -> Option<ValueAccessor<'a>> {
    ctx.args.get(name).filter(|arg| !arg.is_null())
}

fn date_arg(ctx: &ResolverContext<'_>, name: &str) -> async_graphql::Result<Option<NaiveDate>> {
    present(ctx, name)
        .map(|arg| {
            let value = arg.string()?;
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                async_graphql::Error::new(format!(
                    "`{name}` must be a date formatted as `YYYY-MM-DD`."
                ))
            })
        })
        .transpose()
}

impl<F: OrderField> PaginationArgs<F> {
    /// Read connection arguments from a field added with
    /// [`FieldConnectionExt::connection_arguments`].
    pub fn from_resolver_context(ctx: &ResolverContext<'_>) -> async_graphql::Result<Self> {
        let raw = |name: &str| -> async_graphql::Result<Option<JsonValue>> {
            Ok(ctx
                .args
                .get(name)
                .map(|arg| arg.deserialize::<JsonValue>())
                .transpose()?)
        };
        let cursor = |name: &str| -> async_graphql::Result<Option<String>> {
            Ok(present(ctx, name)
                .map(|arg| arg.string().map(str::to_string))
                .transpose()?)
        };

        let order_by = match present(ctx, "orderBy") {
            Some(arg) => {
                let order = arg.object()?;
                let field = order.try_get("field")?.enum_name()?.to_string();
                let direction = order.try_get("direction")?.enum_name()?.to_string();
                Some(OrderSpec::parse(&field, &direction)?)
            }
            None => None,
        };

        Ok(Self {
            first: raw("first")?,
            last: raw("last")?,
            after: cursor("after")?,
            before: cursor("before")?,
            order_by,
            start_date: date_arg(ctx, "startDate")?,
            end_date: date_arg(ctx, "endDate")?,
        })
    }
}

impl ErrorExtensions for ConnectionError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.kind();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code.as_ref()))
    }
}

impl<S> ConnectionLoader<S>
where
    S: DataSource<Node = JsonValue>,
{
    /// Resolve a connection field, reading arguments and the [`Caller`] from
    /// `ctx`.
    ///
    /// A failed load resolves the field to `null` and records one error on
    /// the response; sibling fields still resolve.
    pub async fn resolve(
        &self,
        ctx: &ResolverContext<'_>,
        owner: OwnerFilter,
    ) -> async_graphql::Result<Option<FieldValue<'static>>> {
        let caller = ctx
            .data_opt::<Caller>()
            .map_or(Caller::ANONYMOUS, |caller| caller.0.as_str());
        let loaded = match PaginationArgs::from_resolver_context(ctx) {
            Ok(args) => self.load(caller, owner, args).await.map_err(|e| e.extend()),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(connection) => Ok(Some(FieldValue::owned_any(connection))),
            Err(e) => {
                ctx.add_error(e.into_server_error(ctx.item.pos));
                Ok(None)
            }
        }
    }
}
