//! Query descriptors and query-string composition.
//!
//! # Design
//! A descriptor writes its set fields into a `QueryParams` list; absent
//! fields write nothing. The `Result` mode is always appended last. Values
//! are percent-encoded, names are emitted as-is. Appending a parameter list
//! onto a path that already carries a query string continues it with `&`,
//! so `append(append(p, a), b) == append(p, a ++ b)`.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ObjectStatus;

pub const RESULT_PARAM: &str = "Result";

/// Response shape requested from a query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryResultType {
    /// A JSON array of items.
    #[default]
    Items,
    /// A scalar item count.
    Count,
    /// A `QueryResult` envelope with count and items.
    ItemsWithCount,
}

/// Enums that appear in query strings by name.
pub trait QueryEnum {
    fn query_name(&self) -> &'static str;
}

impl QueryEnum for QueryResultType {
    fn query_name(&self) -> &'static str {
        match self {
            QueryResultType::Items => "Items",
            QueryResultType::Count => "Count",
            QueryResultType::ItemsWithCount => "ItemsWithCount",
        }
    }
}

/// Paged query response for `QueryResultType::ItemsWithCount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub count: i64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self {
            count: 0,
            items: Vec::new(),
        }
    }
}

/// Ordered `name=value` pairs of a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.pairs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn push_opt<T: Display>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(name, value);
        }
        self
    }

    /// Skips `None` and empty strings.
    pub fn push_text(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(text) if !text.is_empty() => self.push(name, text),
            _ => self,
        }
    }

    /// Skips `false`, the default.
    pub fn push_flag(&mut self, name: &str, value: bool) -> &mut Self {
        if value {
            self.push(name, "true");
        }
        self
    }

    /// Calendar date as `yyyy-MM-dd`.
    pub fn push_date(&mut self, name: &str, value: Option<NaiveDate>) -> &mut Self {
        self.push_opt(name, value.map(|date| date.format("%Y-%m-%d")))
    }

    /// Calendar date of a UTC moment as `yyyy-MM-dd`.
    pub fn push_moment(&mut self, name: &str, value: Option<DateTime<Utc>>) -> &mut Self {
        self.push_date(name, value.map(|moment| moment.date_naive()))
    }

    pub fn push_enum<E: QueryEnum>(&mut self, name: &str, value: Option<E>) -> &mut Self {
        self.push_opt(name, value.map(|value| value.query_name()))
    }

    /// One `name=value` pair per element, in element order.
    pub fn push_all<T: Display>(&mut self, name: &str, values: impl IntoIterator<Item = T>) -> &mut Self {
        for value in values {
            self.push(name, value);
        }
        self
    }

    pub fn extend(&mut self, other: QueryParams) -> &mut Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A typed filter/paging descriptor.
pub trait QueryDescriptor {
    fn result(&self) -> QueryResultType;

    fn set_result(&mut self, result: QueryResultType);

    /// Write every set field except the result mode.
    fn write_params(&self, params: &mut QueryParams);

    /// All set fields followed by the mandatory result mode.
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        self.write_params(&mut params);
        params.push(RESULT_PARAM, self.result().query_name());
        params
    }
}

/// Append `params` to `path`, continuing an existing query string if present.
pub fn append(path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", params.to_query_string())
}

/// Compose the canonical query url of `descriptor` onto `path`.
pub fn compose<Q: QueryDescriptor + ?Sized>(path: &str, descriptor: &Q) -> String {
    append(path, &descriptor.to_params())
}

/// Common query fields understood by every collection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub status: Option<ObjectStatus>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub select: Option<String>,
    pub top: Option<i32>,
    pub skip: Option<i32>,
    pub result: QueryResultType,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on `field eq 'value'`, quotes in the value doubled.
    pub fn equals(field: &str, value: &str) -> Self {
        Self {
            filter: Some(format!("{field} eq '{}'", value.replace('\'', "''"))),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: ObjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    pub fn with_order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    pub fn with_paging(mut self, skip: i32, top: i32) -> Self {
        self.skip = Some(skip);
        self.top = Some(top);
        self
    }
}

impl QueryDescriptor for Query {
    fn result(&self) -> QueryResultType {
        self.result
    }

    fn set_result(&mut self, result: QueryResultType) {
        self.result = result;
    }

    fn write_params(&self, params: &mut QueryParams) {
        params
            .push_enum("Status", self.status)
            .push_text("Filter", self.filter.as_deref())
            .push_text("OrderBy", self.order_by.as_deref())
            .push_text("Select", self.select.as_deref())
            .push_opt("Top", self.top)
            .push_opt("Skip", self.skip);
    }
}

/// Query restricted to one division.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivisionQuery {
    pub query: Query,
    pub division_id: Option<i32>,
}

impl DivisionQuery {
    pub fn for_division(division_id: i32) -> Self {
        Self {
            division_id: Some(division_id),
            ..Self::default()
        }
    }
}

impl QueryDescriptor for DivisionQuery {
    fn result(&self) -> QueryResultType {
        self.query.result
    }

    fn set_result(&mut self, result: QueryResultType) {
        self.query.result = result;
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.query.write_params(params);
        params.push_opt("DivisionId", self.division_id);
    }
}

/// Query over case changes of an employee or a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseChangeQuery {
    pub query: Query,
    pub division_id: Option<i32>,
    pub exclude_global: bool,
    pub culture: Option<String>,
    pub evaluation_date: Option<NaiveDate>,
    pub case_names: Vec<String>,
}

impl QueryDescriptor for CaseChangeQuery {
    fn result(&self) -> QueryResultType {
        self.query.result
    }

    fn set_result(&mut self, result: QueryResultType) {
        self.query.result = result;
    }

    fn write_params(&self, params: &mut QueryParams) {
        self.query.write_params(params);
        params
            .push_opt("DivisionId", self.division_id)
            .push_flag("ExcludeGlobal", self.exclude_global)
            .push_text("Culture", self.culture.as_deref())
            .push_date("EvaluationDate", self.evaluation_date)
            .push_all("CaseNames", &self.case_names);
    }
}
