use crate::{loader::ConnectionDescriptor, ordering::order_fields};

pub const DKIM_BY_DOMAIN: ConnectionDescriptor = ConnectionDescriptor {
    name: "loadDkimConnectionsByDomainId",
    label: "DKIM",
    resource: "DKIM scan(s)",
    timestamp_field: Some("timestamp"),
};

order_fields! {
    pub enum DkimOrderField {
        Timestamp => ("timestamp", "TIMESTAMP", "timestamp"),
    }
}
