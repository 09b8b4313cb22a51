//! Settings for the voting app.
//!
//! Values come from `config.toml` (see `resolve_config_path`) layered under
//! `TUNEVOTE__*` environment variables. Every section has defaults, so the
//! file is optional.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
