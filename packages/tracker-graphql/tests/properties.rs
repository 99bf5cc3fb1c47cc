use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::{json, Value};
use tracker_graphql::{
    connections::{
        self,
        organization::{VerifiedOrgOrderField, VERIFIED_ORGS},
    },
    testing::{fixtures, RecordingLog},
    ArgumentValidator, Connection, ConnectionLoader, CursorCodec, Limit, OrderDirection,
    OrderSpec, OwnerFilter, PaginationArgs, ValidationError,
};

type Args = PaginationArgs<VerifiedOrgOrderField>;

fn validate(args: Args) -> (Result<Limit, ValidationError>, usize) {
    let log = RecordingLog::default();
    let result = ArgumentValidator::new(&VERIFIED_ORGS, 100, &log)
        .validate("1", args)
        .map(|paging| paging.limit);
    (result, log.entries().len())
}

fn load(count: usize, args: Args) -> Connection<Value> {
    let loader = ConnectionLoader::new(VERIFIED_ORGS, fixtures::verified_orgs(count));
    block_on(loader.load("1", OwnerFilter::All, args)).unwrap()
}

fn ids(connection: &Connection<Value>) -> Vec<usize> {
    connection
        .nodes()
        .map(|node| node["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

fn non_number() -> impl Strategy<Value = (Value, &'static str)> {
    prop_oneof![
        ".*".prop_map(|s| (json!(s), "string")),
        any::<bool>().prop_map(|b| (json!(b), "boolean")),
        Just((Value::Null, "null")),
        prop::collection::vec(any::<i32>(), 0..4).prop_map(|v| (json!(v), "array")),
        any::<i32>().prop_map(|n| (json!({ "first": n }), "object")),
    ]
}

proptest! {
    #[test]
    fn prop_exactly_one_limit_is_required(first in prop::option::of(0i64..=100), last in prop::option::of(0i64..=100)) {
        let mut args = Args::new();
        args.first = first.map(Value::from);
        args.last = last.map(Value::from);
        let (result, logged) = validate(args);

        match (first, last) {
            (Some(_), Some(_)) => prop_assert!(matches!(result, Err(ValidationError::BothLimitsSet { .. })), "expected BothLimitsSet"),
            (None, None) => prop_assert!(matches!(result, Err(ValidationError::NoLimitSet { .. })), "expected NoLimitSet"),
            _ => prop_assert!(result.is_ok()),
        }
        prop_assert_eq!(logged, usize::from(result.is_err()));
    }

    #[test]
    fn prop_limits_are_bounded(n in any::<i64>(), forward in any::<bool>()) {
        let args = if forward { Args::new().first(n) } else { Args::new().last(n) };
        let (result, logged) = validate(args);

        if n < 0 {
            prop_assert!(matches!(result, Err(ValidationError::NegativeLimit { .. })), "expected NegativeLimit");
        } else if n > 100 {
            prop_assert!(matches!(result, Err(ValidationError::LimitExceeded { amount, max: 100, .. }) if amount == serde_json::Number::from(n)), "expected LimitExceeded");
        } else {
            prop_assert_eq!(result.map(|limit| limit.count()), Ok(n as u64));
        }
        prop_assert_eq!(logged, usize::from(!(0..=100).contains(&n)));
    }

    #[test]
    fn prop_non_numbers_report_their_type((value, type_name) in non_number()) {
        let (result, logged) = validate(Args::new().last(value));
        prop_assert!(matches!(
            result,
            Err(ValidationError::InvalidLimitType { type_name: reported, .. }) if reported == type_name
        ), "expected InvalidLimitType");
        prop_assert_eq!(logged, 1);
    }

    #[test]
    fn prop_cursor_round_trip(index in 0..connections::ALL.len(), key in "[0-9A-Za-z_:/-]{1,40}") {
        let name = connections::ALL[index].name;
        let cursor = CursorCodec::encode(name, &key);
        prop_assert_eq!(CursorCodec::decode(&cursor), Ok(key));
    }

    #[test]
    fn prop_first_and_last_are_symmetric(count in 0usize..40, k in 0u64..=100) {
        let head = load(count, Args::new().first(k));
        let expected: Vec<usize> = (1..=count).take(k as usize).collect();
        prop_assert_eq!(ids(&head), expected);
        if !head.edges.is_empty() {
            prop_assert_eq!(head.page_info.has_next_page, (k as usize) < count);
            prop_assert!(!head.page_info.has_previous_page);
        }

        let tail = load(count, Args::new().last(k));
        let expected: Vec<usize> = (1..=count).skip(count.saturating_sub(k as usize)).collect();
        prop_assert_eq!(ids(&tail), expected);
        if !tail.edges.is_empty() {
            prop_assert_eq!(tail.page_info.has_previous_page, (k as usize) < count);
            prop_assert!(!tail.page_info.has_next_page);
        }
    }

    #[test]
    fn prop_total_count_ignores_window(
        count in 1usize..30,
        k in 0u64..=100,
        forward in any::<bool>(),
        after in prop::option::of(1usize..30),
        before in prop::option::of(1usize..30),
    ) {
        let cursor = |key: usize| CursorCodec::encode(VERIFIED_ORGS.name, &key.to_string());
        let mut args = if forward { Args::new().first(k) } else { Args::new().last(k) };
        args.after = after.map(cursor);
        args.before = before.map(cursor);

        let page = load(count, args);
        prop_assert_eq!(page.total_count, count as u64);
        prop_assert!(page.edges.len() as u64 <= k);
        if page.edges.is_empty() {
            prop_assert!(page.page_info.is_zero());
        }
    }

    #[test]
    fn prop_paging_forward_visits_every_record_once(
        count in 0usize..30,
        size in 1u64..8,
        descending in any::<bool>(),
    ) {
        let direction = if descending { OrderDirection::Desc } else { OrderDirection::Asc };
        let order = OrderSpec::new(VerifiedOrgOrderField::Sector, direction);
        let loader = ConnectionLoader::new(VERIFIED_ORGS, fixtures::verified_orgs(count));

        let mut seen = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut args = Args::new().first(size).order_by(order);
            args.after = after.clone();
            let page = block_on(loader.load("1", OwnerFilter::All, args)).unwrap();
            seen.extend(ids(&page));
            if !page.page_info.has_next_page {
                break;
            }
            after = Some(page.page_info.end_cursor.clone());
        }

        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted, (1..=count).collect::<Vec<_>>());
        prop_assert_eq!(seen.len(), count);
    }
}
