// Copyright 2018-2025 the Deno authors. MIT license.

mod handle_scope;
mod slot;
mod stack;


pub use handle_scope::HandleScope;
pub use handle_scope::ScopeKind;
pub use slot::Local;
pub use slot::ScopeId;
pub use stack::DEFAULT_HANDLE_CAPACITY;
pub use stack::ScopeStack;
