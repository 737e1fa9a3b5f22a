//! Lowering of predicates, boundaries and sort keys into a parameterized statement.
//!
//! Every operand goes through `push_bind`; only column names and operators from
//! [`PgListing`] are spliced into the SQL text.

use roster_core::clock::weekday_index;
use roster_core::{Boundary, CompareOp, FilterSet, Predicate, SortKey, Value, ValueList};
use sqlx::{Postgres, QueryBuilder};

use super::escape_like;
use super::schema::PgListing;

pub(crate) const fn sql_operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "<>",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

pub(crate) fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Integer(n) => qb.push_bind(*n),
        Value::Timestamp(ts) => qb.push_bind(*ts),
        Value::Date(d) => qb.push_bind(*d),
        Value::Time(t) => qb.push_bind(*t),
    };
}

/// ` AND <live condition> AND <filters>`, appended after `WHERE`.
pub(crate) fn push_filters<L: PgListing>(
    qb: &mut QueryBuilder<'_, Postgres>,
    filters: &FilterSet<L>,
) {
    qb.push(L::LIVE);
    if let Some(predicate) = filters.predicate() {
        qb.push(" AND ");
        push_predicate(qb, predicate);
    }
}

pub(crate) fn push_predicate<L: PgListing>(
    qb: &mut QueryBuilder<'_, Postgres>,
    predicate: &Predicate<L>,
) {
    match predicate {
        Predicate::All(children) => push_junction(qb, children, " AND ", "TRUE"),
        Predicate::Any(children) => push_junction(qb, children, " OR ", "FALSE"),
        Predicate::Compare { field, op, value } => {
            qb.push(L::column(*field)).push(" ").push(sql_operator(*op)).push(" ");
            push_value(qb, value);
        },
        Predicate::InSet { field, values } => {
            qb.push(L::column(*field)).push(" = ANY(");
            match values {
                ValueList::Text(v) => qb.push_bind(v.clone()),
                ValueList::Integer(v) => qb.push_bind(v.clone()),
            };
            qb.push(")");
        },
        Predicate::Missing { field } => {
            qb.push(L::column(*field)).push(" IS NULL");
        },
        Predicate::Contains { field, needle } => {
            qb.push("regexp_replace(").push(L::column(*field)).push(", '\\s', '', 'g') ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(needle)));
        },
        Predicate::LocalDayOfWeek { field, timezone, days } => {
            qb.push("EXTRACT(DOW FROM ").push(L::column(*field)).push(" AT TIME ZONE ");
            qb.push_bind(timezone.name()).push(")::bigint = ANY(");
            qb.push_bind(days.iter().copied().map(weekday_index).collect::<Vec<i64>>());
            qb.push(")");
        },
        Predicate::LocalTimeOfDay { field, timezone, op, time } => {
            qb.push("(").push(L::column(*field)).push(" AT TIME ZONE ");
            qb.push_bind(timezone.name()).push(")::time ").push(sql_operator(*op)).push(" ");
            qb.push_bind(*time);
        },
        Predicate::LocalDate { field, timezone, op, date } => {
            qb.push("(").push(L::column(*field)).push(" AT TIME ZONE ");
            qb.push_bind(timezone.name()).push(")::date ").push(sql_operator(*op)).push(" ");
            qb.push_bind(*date);
        },
        Predicate::PairIn { first, second, pairs } => {
            let (firsts, seconds): (Vec<String>, Vec<String>) = pairs.iter().cloned().unzip();
            qb.push("(").push(L::column(*first)).push(", ").push(L::column(*second));
            qb.push(") IN (SELECT * FROM UNNEST(").push_bind(firsts).push("::text[], ");
            qb.push_bind(seconds).push("::text[]))");
        },
        Predicate::Related { relation, predicate } => {
            let rel = L::relation(*relation);
            qb.push("EXISTS (SELECT 1 FROM ").push(rel.from).push(" WHERE ").push(rel.correlate);
            qb.push(" AND ");
            push_predicate(qb, predicate);
            qb.push(")");
        },
    }
}

fn push_junction<L: PgListing>(
    qb: &mut QueryBuilder<'_, Postgres>,
    children: &[Predicate<L>],
    separator: &str,
    identity: &str,
) {
    if children.is_empty() {
        qb.push(identity);
        return;
    }
    qb.push("(");
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, child);
    }
    qb.push(")");
}

/// Row-value comparison `(c1, c2, id) > ($1, $2, $3)`, with `<` for descending keys.
pub(crate) fn push_boundary<L: PgListing>(
    qb: &mut QueryBuilder<'_, Postgres>,
    sort_key: &SortKey<L>,
    boundary: &Boundary,
) {
    qb.push("(");
    for (i, field) in sort_key.fields().iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(L::column(*field));
    }
    qb.push(if sort_key.order().is_ascending() { ") > (" } else { ") < (" });
    for (i, value) in boundary.values().iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(qb, value);
    }
    qb.push(")");
}

pub(crate) fn push_order_by<L: PgListing>(
    qb: &mut QueryBuilder<'_, Postgres>,
    sort_key: &SortKey<L>,
) {
    let direction = if sort_key.order().is_ascending() { " ASC" } else { " DESC" };
    qb.push(" ORDER BY ");
    for (i, field) in sort_key.fields().iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(L::column(*field)).push(direction);
    }
}
