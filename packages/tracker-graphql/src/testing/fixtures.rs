use super::MemorySource;
use crate::connections::{
    affiliation::AffiliationOrderField, organization::VerifiedOrgOrderField, spf::SpfOrderField,
};
use serde_json::json;

/// Two affiliations of `users/1` and one of `users/2`.
pub fn affiliations() -> MemorySource<AffiliationOrderField> {
    MemorySource::new()
        .insert(
            "1",
            Some("users/1"),
            json!({
                "orgAcronym": "TBS",
                "orgName": "Treasury Board Secretariat",
                "orgSlug": "treasury-board-secretariat",
                "permission": "admin",
            }),
        )
        .insert(
            "2",
            Some("users/1"),
            json!({
                "orgAcronym": "CSE",
                "orgName": "Communications Security Establishment",
                "orgSlug": "communications-security-establishment",
                "permission": "user",
            }),
        )
        .insert(
            "3",
            Some("users/2"),
            json!({
                "orgAcronym": "FCAC",
                "orgName": "Financial Consumer Agency of Canada",
                "orgSlug": "financial-consumer-agency-of-canada",
                "permission": "user",
            }),
        )
}

/// Three SPF scans of `domains/1`, one per day from 2023-01-01, and one scan
/// of `domains/2`.
pub fn spf_scans() -> MemorySource<SpfOrderField> {
    MemorySource::new()
        .with_timestamp_field("timestamp")
        .insert(
            "1",
            Some("domains/1"),
            json!({
                "timestamp": "2023-01-01T12:00:00Z",
                "lookups": 5,
                "record": "v=spf1 include:spf.protection.outlook.com -all",
                "spfDefault": "fail",
            }),
        )
        .insert(
            "2",
            Some("domains/1"),
            json!({
                "timestamp": "2023-01-02T12:00:00Z",
                "lookups": 3,
                "record": "v=spf1 ip4:192.0.2.0/24 ~all",
                "spfDefault": "softfail",
            }),
        )
        .insert(
            "3",
            Some("domains/1"),
            json!({
                "timestamp": "2023-01-03T12:00:00Z",
                "lookups": 8,
                "record": "v=spf1 a mx include:_spf.google.com -all",
                "spfDefault": "fail",
            }),
        )
        .insert(
            "4",
            Some("domains/2"),
            json!({
                "timestamp": "2023-01-01T08:00:00Z",
                "lookups": 1,
                "record": "v=spf1 -all",
                "spfDefault": "fail",
            }),
        )
}

/// `count` verified organizations keyed `1..=count`, with repeating sectors.
pub fn verified_orgs(count: usize) -> MemorySource<VerifiedOrgOrderField> {
    const SECTORS: [&str; 3] = ["TBS", "CSE", "GAC"];
    (1..=count).fold(MemorySource::new(), |source, i| {
        source.insert(
            i.to_string(),
            None,
            json!({
                "acronym": format!("ORG{i}"),
                "name": format!("Organization {i}"),
                "sector": SECTORS[i % SECTORS.len()],
                "domainCount": i % 4,
            }),
        )
    })
}
