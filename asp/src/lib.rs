//! Typed configuration schemas bound to command-line flags, environment
//! variables and configuration files.
//!
//! Derive [`Schema`] for a struct, attach it to a [`clap::Command`] and
//! resolve a fresh instance after parsing. Every leaf field gets a global
//! flag and an environment variable named after the field, and values are
//! taken from the first layer that has one: flags, environment, the
//! configuration file, then the defaults instance the schema was attached
//! with.
//!
//! ```
//! use std::time::Duration;
//!
//! use asp::{Asp, Schema};
//! use clap::Command;
//!
//! #[derive(Schema, Default, Debug)]
//! struct Database {
//!     url: String,
//!     #[asp(sensitive)]
//!     password: String,
//! }
//!
//! #[derive(Schema, Default, Debug)]
//! struct Config {
//!     #[asp(short = "p", desc = "port to listen on")]
//!     port: u64,
//!     timeout: Duration,
//!     database: Database,
//! }
//!
//! let defaults = Config { port: 8080, ..Config::default() };
//! let mut command = Command::new("server");
//! let asp = Asp::<Config>::builder()
//!     .env_prefix("DOCDEMO")
//!     .attach(&mut command, &defaults)
//!     .unwrap();
//! let matches = command
//!     .try_get_matches_from(["server", "-p", "9000", "--database-url", "postgres://db"])
//!     .unwrap();
//! let config = asp.config(&matches).unwrap();
//! assert_eq!(config.port, 9000);
//! assert_eq!(config.database.url, "postgres://db");
//! assert_eq!(config.timeout, Duration::ZERO);
//! ```

extern crate self as asp;

mod attach;
mod attributes;
mod bind;
pub mod decode;
mod duration;
mod error;
mod leaf;
mod schema;
mod serialize;
mod store;
mod time;

pub use asp_macros::Schema;

pub use attach::{Asp, AspBuilder, AttachedConfig, DEFAULT_ENV_PREFIX};
pub use attributes::{Attrs, DEFAULT_DESC, Placeholders, join_field, render_description};
pub use bind::LeafBinding;
pub use decode::{DecodeHook, DecodeHooks};
pub use duration::{format_duration, parse_duration};
pub use error::{AspError, AspResult, CoercionError};
pub use leaf::{Leaf, LeafKind, LeafValue};
pub use schema::{
    FieldMeta, FieldTags, LeafSource, Schema, SchemaVisitor, assemble_leaf, assemble_nested,
};
pub use serialize::{REDACTED, serialize_flags};
pub use store::{
    KeyedValues, Layer, LayerSource, Layers, Store, default_search_paths, supported_extensions,
};
pub use time::{TimeValue, parse_time};
