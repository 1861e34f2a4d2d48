// Copyright 2018-2025 the Deno authors. MIT license.

use crate::value::Value;
use std::fmt;

/// Identifies a handle scope for the lifetime of its [`ScopeStack`].
///
/// Ids increase monotonically and are never reused, so an id that outlived
/// its scope can't alias a newer one.
///
/// [`ScopeStack`]: super::ScopeStack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
  pub(crate) fn new(raw: u64) -> Self {
    Self(raw)
  }

  pub fn as_u64(self) -> u64 {
    self.0
  }
}

impl fmt::Display for ScopeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A handle to a managed value: an index into the slot arena of the scope
/// that owns it. Only valid while that scope is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Local {
  scope: ScopeId,
  index: usize,
}

impl Local {
  pub(crate) fn new(scope: ScopeId, index: usize) -> Self {
    Self { scope, index }
  }

  /// The scope that owns this handle.
  pub fn scope(&self) -> ScopeId {
    self.scope
  }

  pub(crate) fn index(&self) -> usize {
    self.index
  }
}

pub(crate) struct HandleSlot {
  value: Value,
  owning_scope: ScopeId,
}

impl HandleSlot {
  pub(crate) fn new(value: Value, owning_scope: ScopeId) -> Self {
    Self {
      value,
      owning_scope,
    }
  }

  pub(crate) fn value(&self) -> &Value {
    &self.value
  }

  pub(crate) fn owning_scope(&self) -> ScopeId {
    self.owning_scope
  }

  pub(crate) fn transfer_to(&mut self, scope: ScopeId) {
    self.owning_scope = scope;
  }
}
