use crate::{loader::ConnectionDescriptor, ordering::order_fields};

pub const AFFILIATIONS_BY_USER: ConnectionDescriptor = ConnectionDescriptor {
    name: "affiliationLoaderByUserId",
    label: "Affiliation",
    resource: "affiliation(s)",
    timestamp_field: None,
};

order_fields! {
    /// Affiliations sort on the affiliated organization or the permission.
    pub enum AffiliationOrderField {
        OrgAcronym => ("org-acronym", "ORG_ACRONYM", "orgAcronym"),
        OrgName => ("org-name", "ORG_NAME", "orgName"),
        OrgSlug => ("org-slug", "ORG_SLUG", "orgSlug"),
        Permission => ("permission", "PERMISSION", "permission"),
    }
}
