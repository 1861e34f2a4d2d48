// Copyright 2018-2025 the Deno authors. MIT license.

use crate::error::Exception;
use crate::error::InvalidState;
use crate::error::ScopeError;

/// Numeric status codes for callers that speak a C-style extension ABI.
///
/// Codes match the values native addons already compare against, so they
/// must not be renumbered.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
  Ok = 0,
  InvalidArg = 1,
  ObjectExpected = 2,
  StringExpected = 3,
  NameExpected = 4,
  FunctionExpected = 5,
  NumberExpected = 6,
  BooleanExpected = 7,
  ArrayExpected = 8,
  GenericFailure = 9,
  PendingException = 10,
  Cancelled = 11,
  EscapeCalledTwice = 12,
  HandleScopeMismatch = 13,
}

impl Status {
  pub fn as_raw(self) -> i32 {
    self as i32
  }

  pub fn is_ok(self) -> bool {
    self == Status::Ok
  }
}

impl From<&ScopeError> for Status {
  fn from(err: &ScopeError) -> Self {
    match err {
      ScopeError::InvalidState(InvalidState::EscapeCalledTwice(_)) => {
        Status::EscapeCalledTwice
      }
      ScopeError::InvalidState(
        InvalidState::NotCurrent { .. }
        | InvalidState::Closed(_)
        | InvalidState::BridgeOwned(_),
      )
      | ScopeError::Underflow
      | ScopeError::Empty => Status::HandleScopeMismatch,
      ScopeError::InvalidState(
        InvalidState::ForeignHandle { .. }
        | InvalidState::StaleHandle(_)
        | InvalidState::NotEscapable(_)
        | InvalidState::NoParent(_),
      ) => Status::InvalidArg,
    }
  }
}

impl<T> From<&Result<T, ScopeError>> for Status {
  fn from(result: &Result<T, ScopeError>) -> Self {
    match result {
      Ok(_) => Status::Ok,
      Err(err) => Status::from(err),
    }
  }
}

impl<T> From<&Result<T, Exception>> for Status {
  fn from(result: &Result<T, Exception>) -> Self {
    match result {
      Ok(_) => Status::Ok,
      Err(_) => Status::PendingException,
    }
  }
}
