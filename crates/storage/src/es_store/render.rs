//! Lowering of predicates, boundaries and sort keys into query DSL bodies.

use chrono::Timelike;
use roster_core::clock::weekday_index;
use roster_core::{Boundary, CompareOp, FilterSet, Predicate, SortKey, Value, ValueList};
use serde_json::{Value as Json, json};

use super::documents::EsListing;

const DELETED_AT: &str = "deleted_at";

const DAY_OF_WEEK_SCRIPT: &str = "ZonedDateTime t = doc[params.field].value\
    .withZoneSameInstant(ZoneId.of(params.tz)); \
    return params.days.contains(t.getDayOfWeek().getValue() % 7);";

/// Operand as sent to the cluster. Timestamps travel as epoch milliseconds, which every
/// default `date` mapping accepts in `term`, `range` and `search_after`.
pub(crate) fn search_value(value: &Value) -> Json {
    match value {
        Value::Text(s) => json!(s),
        Value::Integer(n) => json!(n),
        Value::Timestamp(ts) => json!(ts.timestamp_millis()),
        Value::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => json!(t.format("%H:%M:%S").to_string()),
    }
}

const fn range_key(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Lt => "lt",
        CompareOp::Le => "lte",
        CompareOp::Gt => "gt",
        CompareOp::Ge | CompareOp::Eq | CompareOp::Ne => "gte",
    }
}

const fn painless_operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

fn match_none() -> Json {
    json!({ "bool": { "must_not": [{ "match_all": {} }] } })
}

fn negate(query: Json) -> Json {
    json!({ "bool": { "must_not": [query] } })
}

fn term(path: &str, value: Json) -> Json {
    json!({ "term": { path: value } })
}

fn range(path: &str, op: CompareOp, value: Json) -> Json {
    let key = range_key(op);
    json!({ "range": { path: { key: value } } })
}

fn compare(path: &str, op: CompareOp, value: Json) -> Json {
    match op {
        CompareOp::Eq => term(path, value),
        CompareOp::Ne => negate(term(path, value)),
        _ => range(path, op, value),
    }
}

fn escape_wildcard(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn predicate_query<L: EsListing>(predicate: &Predicate<L>) -> Json {
    match predicate {
        Predicate::All(children) if children.is_empty() => json!({ "match_all": {} }),
        Predicate::All(children) => {
            let filter: Vec<Json> = children.iter().map(predicate_query).collect();
            json!({ "bool": { "filter": filter } })
        },
        Predicate::Any(children) if children.is_empty() => match_none(),
        Predicate::Any(children) => {
            let should: Vec<Json> = children.iter().map(predicate_query).collect();
            json!({ "bool": { "should": should, "minimum_should_match": 1 } })
        },
        Predicate::Compare { field, op, value } => {
            compare(L::field_path(*field), *op, search_value(value))
        },
        Predicate::InSet { field, values } => {
            let values = match values {
                ValueList::Text(v) => json!(v),
                ValueList::Integer(v) => json!(v),
            };
            let path = L::field_path(*field);
            json!({ "terms": { path: values } })
        },
        Predicate::Missing { field } => {
            negate(json!({ "exists": { "field": L::field_path(*field) } }))
        },
        Predicate::Contains { field, needle } => {
            let path = L::field_path(*field);
            let pattern = format!("*{}*", escape_wildcard(needle));
            json!({ "wildcard": { path: { "value": pattern, "case_insensitive": true } } })
        },
        Predicate::LocalDayOfWeek { field, timezone, days } => {
            let days: Vec<i64> = days.iter().copied().map(weekday_index).collect();
            let params =
                json!({ "field": L::field_path(*field), "tz": timezone.name(), "days": days });
            json!({ "script": { "script": { "source": DAY_OF_WEEK_SCRIPT, "params": params } } })
        },
        Predicate::LocalTimeOfDay { field, timezone, op, time } => {
            let source = format!(
                "ZonedDateTime t = doc[params.field].value\
                 .withZoneSameInstant(ZoneId.of(params.tz)); \
                 return t.getHour() * 3600 + t.getMinute() * 60 + t.getSecond() \
                 {} params.seconds;",
                painless_operator(*op)
            );
            let seconds = time.num_seconds_from_midnight();
            let params =
                json!({ "field": L::field_path(*field), "tz": timezone.name(), "seconds": seconds });
            json!({ "script": { "script": { "source": source, "params": params } } })
        },
        Predicate::LocalDate { field, timezone, op, date } => {
            let path = L::field_path(*field);
            // `||/d` rounds to the day edge that makes each operator inclusive or exclusive
            // of the whole local day.
            let day = format!("{}||/d", date.format("%Y-%m-%d"));
            let day_range = |bounds: Json| {
                let mut bounds = bounds;
                bounds["time_zone"] = json!(timezone.name());
                json!({ "range": { path: bounds } })
            };
            match op {
                CompareOp::Eq => day_range(json!({ "gte": day, "lte": day })),
                CompareOp::Ne => negate(day_range(json!({ "gte": day, "lte": day }))),
                _ => {
                    let key = range_key(*op);
                    day_range(json!({ key: day }))
                },
            }
        },
        Predicate::PairIn { pairs, .. } if pairs.is_empty() => match_none(),
        Predicate::PairIn { first, second, pairs } => {
            let (first, second) = (L::field_path(*first), L::field_path(*second));
            let should: Vec<Json> = pairs
                .iter()
                .map(|(a, b)| {
                    json!({ "bool": { "filter": [term(first, json!(a)), term(second, json!(b))] } })
                })
                .collect();
            json!({ "bool": { "should": should, "minimum_should_match": 1 } })
        },
        Predicate::Related { relation, predicate } => {
            let inner = predicate_query(predicate);
            match L::relation_path(*relation) {
                Some(path) => json!({ "nested": { "path": path, "query": inner } }),
                None => inner,
            }
        },
    }
}

/// Records strictly beyond `boundary` under `sort_key`, as a lexicographic disjunction:
/// `f1 > v1 OR (f1 = v1 AND f2 > v2) OR ...`.
pub(crate) fn boundary_query<L: EsListing>(sort_key: &SortKey<L>, boundary: &Boundary) -> Json {
    let op = if sort_key.order().is_ascending() { CompareOp::Gt } else { CompareOp::Lt };
    let fields = sort_key.fields();
    let mut should = Vec::with_capacity(fields.len());
    for (depth, (field, value)) in fields.iter().zip(boundary.values()).enumerate() {
        let mut filter: Vec<Json> = fields
            .iter()
            .zip(boundary.values())
            .take(depth)
            .map(|(f, v)| term(L::field_path(*f), search_value(v)))
            .collect();
        filter.push(range(L::field_path(*field), op, search_value(value)));
        should.push(json!({ "bool": { "filter": filter } }));
    }
    json!({ "bool": { "should": should, "minimum_should_match": 1 } })
}

/// Live records matching `filters`, optionally restricted to those beyond `bounded`.
pub(crate) fn filtered_query<L: EsListing>(
    filters: &FilterSet<L>,
    bounded: Option<(&SortKey<L>, &Boundary)>,
) -> Json {
    let mut filter = Vec::with_capacity(2);
    if let Some(predicate) = filters.predicate() {
        filter.push(predicate_query(predicate));
    }
    if let Some((sort_key, boundary)) = bounded {
        filter.push(boundary_query(sort_key, boundary));
    }
    json!({
        "bool": {
            "filter": filter,
            "must_not": [{ "exists": { "field": DELETED_AT } }]
        }
    })
}

pub(crate) fn sort_clause<L: EsListing>(sort_key: &SortKey<L>) -> Json {
    let order = sort_key.order().as_str();
    let clauses: Vec<Json> = sort_key
        .fields()
        .iter()
        .map(|f| {
            let path = L::field_path(*f);
            json!({ path: { "order": order } })
        })
        .collect();
    json!(clauses)
}

pub(crate) fn search_after(boundary: &Boundary) -> Json {
    json!(boundary.values().iter().map(search_value).collect::<Vec<_>>())
}

/// `_search` body for one keyset window.
pub(crate) fn search_body<L: EsListing>(
    filters: &FilterSet<L>,
    sort_key: &SortKey<L>,
    boundary: Option<&Boundary>,
    limit: u32,
) -> Json {
    let mut body = json!({
        "query": filtered_query(filters, boundary.map(|b| (sort_key, b))),
        "sort": sort_clause(sort_key),
        "size": limit,
        "track_total_hits": true
    });
    if let Some(boundary) = boundary {
        body["search_after"] = search_after(boundary);
    }
    body
}

/// `_count` body.
pub(crate) fn count_body<L: EsListing>(filters: &FilterSet<L>) -> Json {
    json!({ "query": filtered_query(filters, None) })
}
