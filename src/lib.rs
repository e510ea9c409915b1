//! querysift - compile MongoDB-style filter/order/pagination requests into SQL
//!
//! A `QueryDefinition` is declared once per exposed table: a map from public
//! field names to columns or to joins against other definitions. At request
//! time a JSON envelope (`where`, `order`, `limit`, `offset`, `select`) is
//! validated against that map and compiled into one parameterized statement.
//!
//! ```ignore
//! use querysift::{create_query, field, RequestEnvelope};
//! use serde_json::json;
//!
//! let translations = create_query("translations", [
//!     ("entityId", field("entity_id")),
//!     ("value", field("value")),
//! ])?;
//!
//! let products = create_query("products", [
//!     ("id", field("id").into()),
//!     ("handle", field("handle").into()),
//!     ("translation", field("id").left_join(&translations, "entityId")),
//! ])?
//! .default_limit(20)
//! .max_limit(100);
//!
//! let request = RequestEnvelope::new()
//!     .filter(json!({ "translation": { "value": { "$iLike": "%phone%" } } }))
//!     .order(["handle:asc"]);
//!
//! let statement = products.get_sql(&request)?;
//! let rows = products.execute(&connection, &request).await?;
//! ```

pub mod query_error;
pub use query_error::*;

pub mod definition;
pub use definition::*;

pub mod request;
pub use request::*;

pub mod compiler;
pub use compiler::*;

pub mod connection;
pub use connection::*;
