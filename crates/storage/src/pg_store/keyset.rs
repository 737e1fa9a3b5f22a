use roster_core::{Boundary, FilterSet, SortKey};
use sqlx::{Postgres, QueryBuilder, Row};

use crate::error::StorageError;
use crate::traits::{KeysetQuery, KeysetWindow};

use super::PgStore;
use super::render::{push_boundary, push_filters, push_order_by};
use super::schema::PgListing;

pub(crate) fn window_statement<L: PgListing>(
    query: &KeysetQuery<'_, L>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(L::SELECT).push(", COUNT(*) OVER () AS matched FROM ").push(L::FROM).push(" WHERE ");
    push_filters(&mut qb, query.filters);
    if let Some(boundary) = query.boundary {
        qb.push(" AND ");
        push_boundary(&mut qb, &query.sort_key, boundary);
    }
    push_order_by(&mut qb, &query.sort_key);
    qb.push(" LIMIT ").push_bind(i64::from(query.limit));
    qb
}

pub(crate) fn count_statement<L: PgListing>(
    filters: &FilterSet<L>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM ");
    qb.push(L::FROM).push(" WHERE ");
    push_filters(&mut qb, filters);
    qb
}

pub(crate) fn anchor_statement<L: PgListing>(anchor_id: &str) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(L::SELECT).push(" FROM ").push(L::FROM).push(" WHERE ").push(L::LIVE);
    qb.push(" AND ").push(L::ID_COLUMN).push(" = ").push_bind(anchor_id.to_owned());
    qb.push(" LIMIT 1");
    qb
}

pub(crate) async fn resolve_anchor<L: PgListing>(
    store: &PgStore,
    sort_key: &SortKey<L>,
    anchor_id: &str,
) -> Result<Option<Boundary>, StorageError> {
    let row = anchor_statement::<L>(anchor_id).build().fetch_optional(&store.pool).await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let record = L::from_row(&row)?;
    sort_key.boundary_of(&record).map(Some).ok_or_else(|| StorageError::NotFound {
        entity: L::NAME,
        id: format!("sort key of {anchor_id}"),
    })
}

pub(crate) async fn fetch_window<L: PgListing>(
    store: &PgStore,
    query: &KeysetQuery<'_, L>,
) -> Result<KeysetWindow<L>, StorageError> {
    let rows = window_statement(query).build().fetch_all(&store.pool).await?;
    let matched = match rows.first() {
        Some(row) => u64::try_from(row.try_get::<i64, _>("matched")?).unwrap_or(0),
        None => 0,
    };
    let items = rows.iter().map(L::from_row).collect::<Result<Vec<_>, StorageError>>()?;
    tracing::debug!(
        listing = L::NAME,
        limit = query.limit,
        bounded = query.boundary.is_some(),
        order = %query.sort_key.order(),
        fetched = items.len(),
        matched,
        "keyset window fetched"
    );
    Ok(KeysetWindow { items, matched })
}

pub(crate) async fn count<L: PgListing>(
    store: &PgStore,
    filters: &FilterSet<L>,
) -> Result<u64, StorageError> {
    let row = count_statement(filters).build().fetch_one(&store.pool).await?;
    let total: i64 = row.try_get("total")?;
    Ok(u64::try_from(total).unwrap_or(0))
}
