//! Validation, duplicate detection and merging for quiz schema files.
//!
//! A schema is a JSON document mapping subjects to themes to ordered lists of
//! questions:
//!
//! ```json
//! {"Math": {"Algebra": [
//!   {"name": "2+2?", "type": "choice", "answers": [{"name": "4", "correct": true}]},
//!   {"name": "Write four", "type": "text", "correctText": "four"}
//! ]}}
//! ```
//!
//! The core is pure and synchronous. Reading and writing files lives in
//! [`load`], printing in [`report`].
//!
//! ```
//! use quiz_schema::schema::{find_duplicates, parse_schema, validate};
//! use serde_json::json;
//!
//! let value = json!({"Redes": {
//!     "TCP": [{"name": "¿Qué es TCP?", "type": "text", "correctText": "a protocol"}],
//!     "Repaso": [{"name": "que es tcp", "type": "text", "correctText": "a protocol"}],
//! }});
//! assert!(validate(&value).is_empty());
//!
//! let schema = parse_schema(&value).unwrap();
//! assert_eq!(find_duplicates(&schema)[0].locations.len(), 2);
//! ```

pub mod config;
pub mod load;
pub mod logging;
pub mod report;
pub mod schema;
pub mod session;
pub mod text;

pub use schema::{
    find_duplicates, merge_schemas, parse_schema, schema_stats, validate, Schema,
    ValidationError,
};
pub use session::{MatchRule, Session};
pub use text::{decode_unicode, normalize};
