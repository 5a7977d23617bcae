//! Error types produced while binding, resolving and decoding schemas.

mod coercion;
mod constructors;
mod types;

pub use coercion::CoercionError;
pub use types::{AspError, AspResult};
