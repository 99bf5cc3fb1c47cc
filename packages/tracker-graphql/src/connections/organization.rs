use crate::{loader::ConnectionDescriptor, ordering::order_fields};

/// Organizations that have completed verification; visible to everyone.
pub const VERIFIED_ORGS: ConnectionDescriptor = ConnectionDescriptor {
    name: "verifiedOrgLoaderConnections",
    label: "VerifiedOrganization",
    resource: "verified organization(s)",
    timestamp_field: None,
};

order_fields! {
    pub enum VerifiedOrgOrderField {
        Acronym => ("acronym", "ACRONYM", "acronym"),
        Name => ("name", "NAME", "name"),
        Slug => ("slug", "SLUG", "slug"),
        Zone => ("zone", "ZONE", "zone"),
        Sector => ("sector", "SECTOR", "sector"),
        Country => ("country", "COUNTRY", "country"),
        Province => ("province", "PROVINCE", "province"),
        City => ("city", "CITY", "city"),
        DomainCount => ("domain-count", "DOMAIN_COUNT", "domainCount"),
    }
}
