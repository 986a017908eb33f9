//! Shareable query string for the list view state
//!
//! Flat `key=value` pairs. Dates are `YYYY-MM-DD`, multi-selects are
//! comma-joined, amounts are written as entered. Keys holding their default
//! value are left out. Parsing is strict: unknown keys, repeated keys,
//! malformed values and half-given ranges are rejected with the offending
//! key named.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use crate::config::{MAX_PAGE_LIMIT, MIN_PAGE_LIMIT};
use crate::error::{JobError, JobResult};
use crate::models::is_valid_code;
use crate::view::filter::{CostRange, DateRange, FilterPatch};
use crate::view::sort::{Sort, VisibleColumns};
use crate::view::state::{JobTab, ListViewState};

pub const QUERY_KEYS: [&str; 23] = [
    "page",
    "limit",
    "sort",
    "search",
    "tab",
    "columns",
    "createdFrom",
    "createdTo",
    "dueFrom",
    "dueTo",
    "completedFrom",
    "completedTo",
    "finishedFrom",
    "finishedTo",
    "incomeCostMin",
    "incomeCostMax",
    "staffCostMin",
    "staffCostMax",
    "status",
    "type",
    "assignee",
    "paymentChannel",
    "paid",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn encode(pairs: &[(&'static str, String)]) -> String {
    // String pairs cannot fail to encode
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

fn push_date_range(pairs: &mut Vec<(&'static str, String)>, keys: (&'static str, &'static str), range: &Option<DateRange>) {
    if let Some(range) = range {
        pairs.push((keys.0, range.from.format(DATE_FORMAT).to_string()));
        pairs.push((keys.1, range.to.format(DATE_FORMAT).to_string()));
    }
}

fn push_cost_range(pairs: &mut Vec<(&'static str, String)>, keys: (&'static str, &'static str), range: &Option<CostRange>) {
    if let Some(range) = range {
        pairs.push((keys.0, range.min.to_string()));
        pairs.push((keys.1, range.max.to_string()));
    }
}

fn join<T: ToString>(values: &BTreeSet<T>) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

impl ListViewState {
    fn to_pairs(&self, with_columns: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if self.tab != JobTab::All {
            pairs.push(("tab", self.tab.key().to_string()));
        }
        if with_columns {
            if let Some(columns) = self.visible_columns.to_param() {
                pairs.push(("columns", columns));
            }
        }

        let f = &self.filters;
        push_date_range(&mut pairs, ("createdFrom", "createdTo"), &f.created);
        push_date_range(&mut pairs, ("dueFrom", "dueTo"), &f.due);
        push_date_range(&mut pairs, ("completedFrom", "completedTo"), &f.completed);
        push_date_range(&mut pairs, ("finishedFrom", "finishedTo"), &f.finished);
        push_cost_range(&mut pairs, ("incomeCostMin", "incomeCostMax"), &f.income_cost);
        push_cost_range(&mut pairs, ("staffCostMin", "staffCostMax"), &f.staff_cost);
        if !f.statuses.is_empty() {
            pairs.push(("status", join(&f.statuses)));
        }
        if !f.types.is_empty() {
            pairs.push(("type", join(&f.types)));
        }
        if !f.assignees.is_empty() {
            pairs.push(("assignee", join(&f.assignees)));
        }
        if !f.payment_channels.is_empty() {
            pairs.push(("paymentChannel", join(&f.payment_channels)));
        }
        if let Some(paid) = f.paid {
            pairs.push(("paid", paid.to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        encode(&self.to_pairs(true))
    }

    /// Identity of the result set: the query string without column visibility
    pub fn scope_key(&self) -> String {
        encode(&self.to_pairs(false))
    }

    pub fn from_query_string(query: &str) -> JobResult<Self> {
        Self::default().with_query_string(query)
    }

    /// Overlay the keys present in `query` on this state. Changing the
    /// result set without naming a page goes back to page 1.
    pub fn with_query_string(mut self, query: &str) -> JobResult<Self> {
        let mut params = QueryParams::parse(query)?;
        let resets_page = !params.values.contains_key("page")
            && params.values.keys().any(|k| k != "columns");

        if let Some(page) = params.take("page") {
            self.page = parse_number::<u32>("page", &page)?;
            if self.page < 1 {
                return Err(JobError::validation("page", "must be at least 1"));
            }
        }
        if let Some(limit) = params.take("limit") {
            let limit = parse_number::<u32>("limit", &limit)?;
            if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) {
                return Err(JobError::validation(
                    "limit",
                    format!("must be between {} and {}", MIN_PAGE_LIMIT, MAX_PAGE_LIMIT),
                ));
            }
            self.limit = limit;
        }
        if let Some(sort) = params.take("sort") {
            self.sort = Sort::parse(&sort)?;
        }
        if let Some(search) = params.take("search") {
            let trimmed = search.trim();
            self.search = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
        }
        if let Some(tab) = params.take("tab") {
            self.tab = JobTab::from_key(&tab)
                .ok_or_else(|| JobError::validation("tab", format!("unknown tab '{}'", tab)))?;
        }
        if let Some(columns) = params.take("columns") {
            self.visible_columns = VisibleColumns::parse(&columns)?;
        }

        self.filters.merge(FilterPatch {
            created: params.date_range("created", "createdFrom", "createdTo")?,
            due: params.date_range("due", "dueFrom", "dueTo")?,
            completed: params.date_range("completed", "completedFrom", "completedTo")?,
            finished: params.date_range("finished", "finishedFrom", "finishedTo")?,
            income_cost: params.cost_range("incomeCost", "incomeCostMin", "incomeCostMax")?,
            staff_cost: params.cost_range("staffCost", "staffCostMin", "staffCostMax")?,
            statuses: params.list("status", |v| parse_code("status", v))?,
            types: params.list("type", |v| parse_code("type", v))?,
            assignees: params.list("assignee", |v| parse_number::<i64>("assignee", v))?,
            payment_channels: params.list("paymentChannel", |v| parse_number::<i64>("paymentChannel", v))?,
            paid: match params.take("paid") {
                None => None,
                Some(v) => Some(parse_bool("paid", &v)?),
            },
        });
        if resets_page {
            self.restart();
        }
        Ok(self)
    }
}

struct QueryParams {
    values: BTreeMap<String, String>,
}

impl QueryParams {
    fn parse(query: &str) -> JobResult<Self> {
        let query = query.trim().trim_start_matches('?');
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| JobError::validation("query", e.to_string()))?;

        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            if !QUERY_KEYS.contains(&key.as_str()) {
                return Err(JobError::validation(&key, "unknown query key"));
            }
            if values.contains_key(&key) {
                return Err(JobError::validation(&key, "given more than once"));
            }
            values.insert(key, value);
        }
        Ok(QueryParams { values })
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    fn pair(&mut self, from_key: &str, to_key: &str) -> JobResult<Option<(String, String)>> {
        match (self.take(from_key), self.take(to_key)) {
            (None, None) => Ok(None),
            (Some(from), Some(to)) => Ok(Some((from, to))),
            (Some(_), None) => Err(JobError::validation(to_key, format!("required with {}", from_key))),
            (None, Some(_)) => Err(JobError::validation(from_key, format!("required with {}", to_key))),
        }
    }

    fn date_range(&mut self, field: &str, from_key: &str, to_key: &str) -> JobResult<Option<DateRange>> {
        match self.pair(from_key, to_key)? {
            None => Ok(None),
            Some((from, to)) => Ok(Some(DateRange::new(
                field,
                parse_date(from_key, &from)?,
                parse_date(to_key, &to)?,
            )?)),
        }
    }

    fn cost_range(&mut self, field: &str, min_key: &str, max_key: &str) -> JobResult<Option<CostRange>> {
        match self.pair(min_key, max_key)? {
            None => Ok(None),
            Some((min, max)) => Ok(Some(CostRange::new(
                field,
                parse_decimal(min_key, &min)?,
                parse_decimal(max_key, &max)?,
            )?)),
        }
    }

    fn list<T: Ord>(&mut self, key: &str, parse: impl Fn(&str) -> JobResult<T>) -> JobResult<Option<BTreeSet<T>>> {
        let Some(raw) = self.take(key) else {
            return Ok(None);
        };
        let mut set = BTreeSet::new();
        for item in raw.split(',').map(str::trim) {
            if item.is_empty() {
                return Err(JobError::validation(key, "empty list item"));
            }
            set.insert(parse(item)?);
        }
        Ok(Some(set))
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> JobResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| JobError::validation(key, format!("'{}' is not a valid number", value)))
}

fn parse_code(key: &str, value: &str) -> JobResult<String> {
    if is_valid_code(value) {
        Ok(value.to_string())
    } else {
        Err(JobError::validation(key, format!("'{}' is not a valid code", value)))
    }
}

fn parse_bool(key: &str, value: &str) -> JobResult<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(JobError::validation(key, format!("expected true or false, got '{}'", other))),
    }
}

fn parse_date(key: &str, value: &str) -> JobResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| JobError::validation(key, format!("'{}' is not a YYYY-MM-DD date", value)))
}

fn parse_decimal(key: &str, value: &str) -> JobResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|_| JobError::validation(key, format!("'{}' is not a valid amount", value)))
}
