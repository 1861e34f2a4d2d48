// Copyright 2018-2025 the Deno authors. MIT license.

//! Handle scopes for native extensions.
//!
//! Native code never holds managed values directly. It holds [`Local`]
//! handles owned by the innermost open [`HandleScope`]; closing the scope
//! releases them all at once, except the single handle an escapable scope
//! promoted into its parent. [`Env`] drives native functions through that
//! discipline and returns whatever they throw unchanged.

mod bridge;
pub mod error;
mod scope;
mod status;
mod value;

pub use crate::bridge::CallScope;
pub use crate::bridge::DEFAULT_MAX_CALL_DEPTH;
pub use crate::bridge::Env;
pub use crate::bridge::EnvOptions;
pub use crate::error::Exception;
pub use crate::error::InvalidState;
pub use crate::error::ScopeError;
pub use crate::scope::DEFAULT_HANDLE_CAPACITY;
pub use crate::scope::HandleScope;
pub use crate::scope::Local;
pub use crate::scope::ScopeId;
pub use crate::scope::ScopeKind;
pub use crate::scope::ScopeStack;
pub use crate::status::Status;
pub use crate::value::Function;
pub use crate::value::FunctionCallback;
pub use crate::value::FunctionResult;
pub use crate::value::Object;
pub use crate::value::Value;
pub use crate::value::ValueType;
pub use crate::value::WeakObject;

pub use deno_error;
