//! Test helpers shared across the asp crates.
//!
//! [`env`] serialises environment mutation behind RAII guards and
//! [`figment`] wraps [`::figment::Jail`] for tests that need a scratch
//! working directory with configuration files in it.

pub mod env;
pub mod figment;

pub use self::figment::with_jail;
