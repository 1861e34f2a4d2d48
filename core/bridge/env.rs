// Copyright 2018-2025 the Deno authors. MIT license.

use super::call_scope::CallScope;
use super::call_scope::FrameGuard;
use crate::error::Exception;
use crate::scope::DEFAULT_HANDLE_CAPACITY;
use crate::scope::Local;
use crate::scope::ScopeId;
use crate::scope::ScopeStack;
use crate::value::Function;
use crate::value::Value;
use log::debug;
use log::warn;

/// Deepest nesting of native calls allowed by default.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Options for [`Env::new`].
#[derive(Debug, Clone)]
pub struct EnvOptions {
  /// Slots preallocated for every handle scope.
  pub handle_capacity: usize,

  /// Nested native calls beyond this depth throw a `RangeError` instead of
  /// running the callee.
  pub max_call_depth: usize,
}

impl Default for EnvOptions {
  fn default() -> Self {
    Self {
      handle_capacity: DEFAULT_HANDLE_CAPACITY,
      max_call_depth: DEFAULT_MAX_CALL_DEPTH,
    }
  }
}

/// The embedding side of the native call bridge.
///
/// An `Env` owns the scope stack for its thread. A root scope is opened on
/// creation and stays open for the lifetime of the `Env`; every invocation
/// runs in scopes pushed above it and popped before `invoke` returns.
pub struct Env {
  pub(super) stack: ScopeStack,
  root: ScopeId,
  pub(super) call_depth: usize,
  pub(super) max_call_depth: usize,
}

static_assertions::assert_not_impl_any!(Env: Send, Sync);

impl Default for Env {
  fn default() -> Self {
    Self::new(EnvOptions::default())
  }
}

impl Env {
  pub fn new(options: EnvOptions) -> Self {
    let mut stack = ScopeStack::with_handle_capacity(options.handle_capacity);
    let root = stack.open();
    Self {
      stack,
      root,
      call_depth: 0,
      max_call_depth: options.max_call_depth,
    }
  }

  pub fn stack(&self) -> &ScopeStack {
    &self.stack
  }

  pub fn root(&self) -> ScopeId {
    self.root
  }

  /// Number of native calls currently on the stack.
  pub fn call_depth(&self) -> usize {
    self.call_depth
  }

  /// Calls `function` from the managed side.
  ///
  /// Arguments are materialized in an entry scope that is closed before this
  /// returns, together with everything the call left behind. A thrown value
  /// is returned exactly as the callee threw it.
  pub fn invoke(
    &mut self,
    function: &Function,
    args: &[Value],
  ) -> Result<Value, Exception> {
    let entry = FrameGuard::new(self);
    let scope = entry.env.stack.open();
    let args = args
      .iter()
      .map(|arg| entry.env.stack.new_handle(scope, arg.clone()))
      .collect::<Result<Vec<_>, _>>()?;
    let local = entry.env.call(function, &args)?;
    let value = entry.env.stack.get(local)?.clone();
    entry.env.stack.close(scope)?;
    Ok(value)
  }

  /// Runs `function` in a fresh call scope and returns its result as a
  /// handle owned by the scope that was current before the call.
  pub(super) fn call(
    &mut self,
    function: &Function,
    args: &[Local],
  ) -> Result<Local, Exception> {
    debug!(
      "calling {} with {} argument(s) at depth {}",
      function.name(),
      args.len(),
      self.call_depth + 1
    );
    let mut scope = CallScope::enter(self)?;
    let result = function.call(&mut scope, args);
    scope.finish(result)
  }

  /// Pops frames until `depth` remain. Frames above `base_depth + 1` were
  /// opened by native code and never closed.
  pub(super) fn unwind_to(&mut self, depth: usize, base_depth: usize) {
    while self.stack.depth() > depth {
      let leaked = self.stack.depth() > base_depth + 1;
      let Ok(scope) = self.stack.pop() else {
        break;
      };
      if leaked {
        warn!("closed handle scope {scope} left open by native code");
      }
    }
  }
}

impl std::fmt::Debug for Env {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Env")
      .field("depth", &self.stack.depth())
      .field("live_handles", &self.stack.live_handles())
      .field("call_depth", &self.call_depth)
      .finish()
  }
}
