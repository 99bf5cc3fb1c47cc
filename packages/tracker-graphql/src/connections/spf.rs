use crate::{loader::ConnectionDescriptor, ordering::order_fields};

pub const SPF_BY_DOMAIN: ConnectionDescriptor = ConnectionDescriptor {
    name: "spfLoaderConnectionsByDomainId",
    label: "SPF",
    resource: "SPF scan(s)",
    timestamp_field: Some("timestamp"),
};

order_fields! {
    pub enum SpfOrderField {
        Timestamp => ("timestamp", "TIMESTAMP", "timestamp"),
        Lookups => ("lookups", "LOOKUPS", "lookups"),
        Record => ("record", "RECORD", "record"),
        SpfDefault => ("spf-default", "SPF_DEFAULT", "spfDefault"),
    }
}
