// Adapters layer: concrete news sources behind the `NewsSource` port.

pub mod json_source;
pub mod schema;
pub mod sqlite_source;

pub use json_source::{Dataset, JsonNewsSource};
pub use sqlite_source::{DbLocation, SqliteNewsSource};

use crate::utils::error::Result;

/// Turns transport and decode failures into an empty result at the adapter
/// boundary. Anything else is passed up to the caller.
pub(crate) fn absorb<T: Default>(source: &str, operation: &str, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.category().absorbed_by_adapter() => {
            tracing::error!(
                "❌ {} {} failed ({:?}): {}",
                source,
                operation,
                e.category(),
                e
            );
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}
