//! Storage layer for roster listings
//!
//! Keyset reads over PostgreSQL (sqlx) and Elasticsearch (REST via reqwest), behind the
//! `KeysetStore` and `SatelliteStore` traits so the pagination engine stays backend-neutral.

pub mod backend;
pub mod error;
pub mod es_store;
mod mapping;
pub mod pg_store;
pub mod traits;

pub use backend::StoreBackend;
pub use error::StorageError;
pub use es_store::{EsListing, EsStore};
pub use pg_store::{PgListing, PgRelation, PgStore};
pub use traits::{KeysetQuery, KeysetStore, KeysetWindow, SatelliteStore};
