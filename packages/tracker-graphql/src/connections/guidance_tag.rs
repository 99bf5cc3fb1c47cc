use crate::{loader::ConnectionDescriptor, ordering::order_fields};

pub const SPF_GUIDANCE_TAGS: ConnectionDescriptor = ConnectionDescriptor {
    name: "loadSpfGuidanceTagConnectionsByTagId",
    label: "GuidanceTag",
    resource: "SPF guidance tag(s)",
    timestamp_field: None,
};

order_fields! {
    pub enum GuidanceTagOrderField {
        TagId => ("tag-id", "TAG_ID", "tagId"),
        TagName => ("tag-name", "TAG_NAME", "tagName"),
        Guidance => ("guidance", "GUIDANCE", "guidance"),
    }
}
