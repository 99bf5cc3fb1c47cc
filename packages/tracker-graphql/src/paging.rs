use crate::{
    error::ValidationError,
    loader::ConnectionDescriptor,
    log::ConnectionLog,
    ordering::OrderSpec,
    self_prelude::*,
    source::DateRange,
};
use chrono::NaiveDate;
use serde_json::Number;
use strum::{AsRefStr, Display};

/// Which of the two page-size arguments a value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LimitArg {
    First,
    Last,
}

/// Raw connection arguments as received from a client.
///
/// `first` and `last` stay untyped until validation: `None` means the
/// argument was omitted, any `Some` value is type-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct PaginationArgs<F> {
    pub first: Option<JsonValue>,
    pub last: Option<JsonValue>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub order_by: Option<OrderSpec<F>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl<F> Default for PaginationArgs<F> {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
            after: None,
            before: None,
            order_by: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl<F> PaginationArgs<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(mut self, first: impl Into<JsonValue>) -> Self {
        self.first = Some(first.into());
        self
    }

    pub fn last(mut self, last: impl Into<JsonValue>) -> Self {
        self.last = Some(last.into());
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn order_by(mut self, order: OrderSpec<F>) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Page size and direction, after validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    First(u64),
    Last(u64),
}

impl Limit {
    pub fn count(&self) -> u64 {
        match self {
            Self::First(n) | Self::Last(n) => *n,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Self::First(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedPaging<F> {
    pub limit: Limit,
    pub after: Option<String>,
    pub before: Option<String>,
    pub order: Option<OrderSpec<F>>,
    pub date_range: DateRange,
}

/// Checks the page-size arguments of one connection.
///
/// Checks run in a fixed order and stop at the first failure: type, both
/// set, neither set, negative, over the maximum. Each refusal is logged once.
pub struct ArgumentValidator<'a> {
    descriptor: &'a ConnectionDescriptor,
    max_page_size: u64,
    log: &'a dyn ConnectionLog,
}

impl<'a> ArgumentValidator<'a> {
    pub fn new(
        descriptor: &'a ConnectionDescriptor,
        max_page_size: u64,
        log: &'a dyn ConnectionLog,
    ) -> Self {
        Self {
            descriptor,
            max_page_size,
            log,
        }
    }

    pub fn validate<F>(
        &self,
        caller: &str,
        args: PaginationArgs<F>,
    ) -> Result<NormalizedPaging<F>, ValidationError> {
        match self.check_limit(args.first.as_ref(), args.last.as_ref()) {
            Ok(limit) => Ok(NormalizedPaging {
                limit,
                after: args.after,
                before: args.before,
                order: args.order_by,
                date_range: DateRange::new(args.start_date, args.end_date),
            }),
            Err(e) => {
                self.log
                    .warn(self.descriptor.name, &e.log_line(caller, self.descriptor.name));
                Err(e)
            }
        }
    }

    fn check_limit(
        &self,
        first: Option<&JsonValue>,
        last: Option<&JsonValue>,
    ) -> Result<Limit, ValidationError> {
        let label = self.descriptor.label;

        let first = first
            .map(|v| as_integer(LimitArg::First, v))
            .transpose()?;
        let last = last.map(|v| as_integer(LimitArg::Last, v)).transpose()?;

        let (arg, (amount, requested)) = match (first, last) {
            (Some(_), Some(_)) => return Err(ValidationError::BothLimitsSet { label }),
            (None, None) => return Err(ValidationError::NoLimitSet { label }),
            (Some(n), None) => (LimitArg::First, n),
            (None, Some(n)) => (LimitArg::Last, n),
        };

        if amount < 0 {
            return Err(ValidationError::NegativeLimit { arg, label });
        }
        if amount > self.max_page_size as i128 {
            return Err(ValidationError::LimitExceeded {
                arg,
                amount: requested.clone(),
                max: self.max_page_size,
                label,
            });
        }

        let amount = amount as u64;
        Ok(match arg {
            LimitArg::First => Limit::First(amount),
            LimitArg::Last => Limit::Last(amount),
        })
    }
}

/// Integral value of a page-size argument, with the number as sent. Integral
/// floats are accepted and out-of-range magnitudes saturate so they fail the
/// range checks by sign.
fn as_integer(arg: LimitArg, value: &JsonValue) -> Result<(i128, &Number), ValidationError> {
    let invalid = |type_name| ValidationError::InvalidLimitType { arg, type_name };

    match value {
        JsonValue::Number(n) => {
            let amount = if let Some(i) = n.as_i64() {
                i as i128
            } else if let Some(u) = n.as_u64() {
                u as i128
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => f as i128,
                    _ => return Err(invalid("float")),
                }
            };
            Ok((amount, n))
        }
        JsonValue::String(_) => Err(invalid("string")),
        JsonValue::Bool(_) => Err(invalid("boolean")),
        JsonValue::Null => Err(invalid("null")),
        JsonValue::Array(_) => Err(invalid("array")),
        JsonValue::Object(_) => Err(invalid("object")),
    }
}
