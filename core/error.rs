// Copyright 2018-2025 the Deno authors. MIT license.

use crate::scope::ScopeId;
use crate::value::Object;
use crate::value::Value;
use deno_error::JsErrorBox;
use deno_error::JsErrorClass;
use std::borrow::Cow;
use std::fmt;

/// Why a scope operation was rejected. None of these leave the stack
/// modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidState {
  #[error("scope {scope} is not the current scope (current is {current})")]
  NotCurrent { scope: ScopeId, current: ScopeId },
  #[error("scope {0} is closed")]
  Closed(ScopeId),
  #[error("handle is owned by scope {owner}, not by scope {scope}")]
  ForeignHandle { scope: ScopeId, owner: ScopeId },
  #[error("handle is no longer owned by scope {0}")]
  StaleHandle(ScopeId),
  #[error("escape called twice on scope {0}")]
  EscapeCalledTwice(ScopeId),
  #[error("scope {0} is not escapable")]
  NotEscapable(ScopeId),
  #[error("scope {0} has no parent to escape into")]
  NoParent(ScopeId),
  #[error("scope {0} belongs to the call bridge")]
  BridgeOwned(ScopeId),
}

/// Structural misuse of the scope stack. These are bugs in the embedding and
/// are never retried.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, deno_error::JsError,
)]
#[class(generic)]
pub enum ScopeError {
  #[error("Invalid handle scope state: {0}")]
  InvalidState(#[from] InvalidState),
  #[error("Handle scope stack underflow")]
  Underflow,
  #[error("No handle scope is open")]
  Empty,
}

/// A value thrown by native code or by a managed callback.
///
/// The bridge hands an `Exception` back exactly as it received it, so the
/// thrown object keeps its identity and class across any number of native
/// frames.
#[derive(Clone, thiserror::Error)]
#[error("Uncaught {0}")]
pub struct Exception(Value);

impl Exception {
  pub fn new(value: impl Into<Value>) -> Self {
    Self(value.into())
  }

  /// Throws a fresh error object of `class_name`.
  pub fn error(
    class_name: impl Into<Cow<'static, str>>,
    message: impl Into<String>,
  ) -> Self {
    Self(Value::Object(Object::error(class_name, message)))
  }

  pub fn value(&self) -> &Value {
    &self.0
  }

  pub fn into_value(self) -> Value {
    self.0
  }

  /// The error class of the thrown value, if it is an error object.
  pub fn class_name(&self) -> Option<&str> {
    self
      .0
      .as_object()
      .filter(|object| object.is_error())
      .map(Object::class_name)
  }

  pub fn is_instance_of(&self, class_name: &str) -> bool {
    self.class_name() == Some(class_name)
  }

  pub fn message(&self) -> Option<String> {
    self.0.as_object().and_then(Object::message)
  }
}

impl fmt::Debug for Exception {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Exception").field(&self.0).finish()
  }
}

impl From<JsErrorBox> for Exception {
  fn from(err: JsErrorBox) -> Self {
    Self::error(err.get_class(), err.get_message())
  }
}

impl From<ScopeError> for Exception {
  fn from(err: ScopeError) -> Self {
    Self::from(JsErrorBox::from_err(err))
  }
}

impl From<InvalidState> for Exception {
  fn from(err: InvalidState) -> Self {
    Self::from(ScopeError::from(err))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use deno_error::builtin_classes::GENERIC_ERROR;
  use deno_error::builtin_classes::RANGE_ERROR;
  use pretty_assertions::assert_eq;

  #[test]
  fn exception_from_error_box_keeps_class() {
    let exception = Exception::from(JsErrorBox::range_error("too big"));
    assert!(exception.is_instance_of(RANGE_ERROR));
    assert_eq!(exception.message().as_deref(), Some("too big"));
    assert_eq!(exception.to_string(), "Uncaught RangeError: too big");
  }

  #[test]
  fn scope_errors_are_thrown_as_generic_errors() {
    let err = ScopeError::InvalidState(InvalidState::Closed(ScopeId::new(3)));
    let exception = Exception::from(err);
    assert_eq!(exception.class_name(), Some(GENERIC_ERROR));
    assert_eq!(
      exception.message().as_deref(),
      Some("Invalid handle scope state: scope #3 is closed")
    );
  }

  #[test]
  fn non_error_values_have_no_class() {
    let exception = Exception::new(42.0);
    assert_eq!(exception.class_name(), None);
    assert_eq!(exception.to_string(), "Uncaught 42");
  }
}
