//! Descriptors and order fields of the tracker's paginated connections.

pub mod affiliation;
pub mod dkim;
pub mod guidance_tag;
pub mod organization;
pub mod spf;

use crate::loader::ConnectionDescriptor;

/// Every built-in connection.
pub const ALL: &[ConnectionDescriptor] = &[
    affiliation::AFFILIATIONS_BY_USER,
    dkim::DKIM_BY_DOMAIN,
    spf::SPF_BY_DOMAIN,
    guidance_tag::SPF_GUIDANCE_TAGS,
    organization::VERIFIED_ORGS,
];
