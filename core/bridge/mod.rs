// Copyright 2018-2025 the Deno authors. MIT license.

//! The native call bridge.
//!
//! [`Env::invoke`] is the entry from the managed side. Each native function
//! runs with a [`CallScope`], and every scope it leaves open is closed when
//! it returns, throws or panics.

mod call_scope;
mod env;

#[cfg(test)]
mod tests;

pub use call_scope::CallScope;
pub use env::DEFAULT_MAX_CALL_DEPTH;
pub use env::Env;
pub use env::EnvOptions;
