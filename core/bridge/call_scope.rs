// Copyright 2018-2025 the Deno authors. MIT license.

use super::env::Env;
use crate::error::Exception;
use crate::error::InvalidState;
use crate::error::ScopeError;
use crate::scope::Local;
use crate::scope::ScopeId;
use crate::scope::ScopeStack;
use crate::value::FunctionResult;
use crate::value::Object;
use crate::value::Value;
use crate::value::ValueType;
use deno_error::JsErrorBox;
use deno_error::builtin_classes::GENERIC_ERROR;
use deno_error::builtin_classes::RANGE_ERROR;
use deno_error::builtin_classes::TYPE_ERROR;
use log::error;

/// Pops every frame pushed after it was created, on drop. This is what
/// closes scopes when a call returns early or native code panics.
pub(super) struct FrameGuard<'e> {
  pub(super) env: &'e mut Env,
  base_depth: usize,
}

impl<'e> FrameGuard<'e> {
  pub(super) fn new(env: &'e mut Env) -> Self {
    let base_depth = env.stack.depth();
    Self { env, base_depth }
  }
}

impl Drop for FrameGuard<'_> {
  fn drop(&mut self) {
    self.env.unwind_to(self.base_depth, self.base_depth);
  }
}

/// The context a native function runs in.
///
/// Every call gets its own escapable scope. Handles created through a
/// `CallScope` land in whichever scope is current, so native code may open
/// and close nested scopes freely. The call scope itself belongs to the
/// bridge: it is escaped into and closed when the function returns.
pub struct CallScope<'e> {
  guard: FrameGuard<'e>,
  id: ScopeId,
}

impl<'e> CallScope<'e> {
  pub(super) fn enter(env: &'e mut Env) -> Result<Self, Exception> {
    if env.call_depth >= env.max_call_depth {
      return Err(
        JsErrorBox::range_error("Maximum call stack size exceeded").into(),
      );
    }
    env.call_depth += 1;
    let guard = FrameGuard::new(env);
    let id = guard.env.stack.open_escapable();
    Ok(Self { guard, id })
  }

  /// Hands the function's result back to the caller's scope and closes the
  /// call scope. A thrown value passes through untouched.
  pub(super) fn finish(
    self,
    result: FunctionResult,
  ) -> Result<Local, Exception> {
    let returned = result?;
    let id = self.id;
    let base_depth = self.guard.base_depth;
    let env = &mut *self.guard.env;
    env.unwind_to(base_depth + 1, base_depth);

    let stack = &mut env.stack;
    if let Some(local) = returned {
      if let Err(err) = stack.get(local) {
        error!("native function returned a dangling handle: {err}");
        return Err(err.into());
      }
    }
    let local = match returned {
      Some(local) if local.scope() != id => {
        stack.close(id)?;
        return Ok(local);
      }
      Some(local) => local,
      None => stack.new_handle(id, Value::Undefined)?,
    };
    let escaped = stack.escape(id, local)?;
    stack.close(id)?;
    Ok(escaped)
  }

  /// The bridge-owned scope of this call.
  pub fn id(&self) -> ScopeId {
    self.id
  }

  pub fn stack(&self) -> &ScopeStack {
    &self.guard.env.stack
  }

  pub fn call_depth(&self) -> usize {
    self.guard.env.call_depth
  }

  /// Creates a handle in the current scope.
  pub fn handle(
    &mut self,
    value: impl Into<Value>,
  ) -> Result<Local, ScopeError> {
    let stack = &mut self.guard.env.stack;
    let current = stack.current()?;
    stack.new_handle(current, value)
  }

  pub fn value(&self, local: Local) -> Result<&Value, ScopeError> {
    self.stack().get(local)
  }

  pub fn create_object(&mut self) -> Result<Local, ScopeError> {
    self.handle(Object::new())
  }

  pub fn create_string(&mut self, value: &str) -> Result<Local, ScopeError> {
    self.handle(value)
  }

  pub fn create_number(&mut self, value: f64) -> Result<Local, ScopeError> {
    self.handle(value)
  }

  pub fn get_boolean(&mut self, value: bool) -> Result<Local, ScopeError> {
    self.handle(value)
  }

  pub fn get_null(&mut self) -> Result<Local, ScopeError> {
    self.handle(Value::Null)
  }

  pub fn get_undefined(&mut self) -> Result<Local, ScopeError> {
    self.handle(Value::Undefined)
  }

  /// Creates an `Error`; `code`, when given, is stored as its `code`
  /// property.
  pub fn create_error(
    &mut self,
    code: Option<&str>,
    message: &str,
  ) -> Result<Local, ScopeError> {
    self.new_error(GENERIC_ERROR, code, message)
  }

  pub fn create_range_error(
    &mut self,
    code: Option<&str>,
    message: &str,
  ) -> Result<Local, ScopeError> {
    self.new_error(RANGE_ERROR, code, message)
  }

  pub fn create_type_error(
    &mut self,
    code: Option<&str>,
    message: &str,
  ) -> Result<Local, ScopeError> {
    self.new_error(TYPE_ERROR, code, message)
  }

  fn new_error(
    &mut self,
    class_name: &'static str,
    code: Option<&str>,
    message: &str,
  ) -> Result<Local, ScopeError> {
    let error = Object::error(class_name, message);
    if let Some(code) = code {
      error.set("code", code);
    }
    self.handle(error)
  }

  pub fn type_of(&self, local: Local) -> Result<ValueType, ScopeError> {
    self.value(local).map(Value::type_of)
  }

  pub fn is_error(&self, local: Local) -> Result<bool, ScopeError> {
    self.value(local).map(Value::is_error)
  }

  pub fn strict_equals(&self, a: Local, b: Local) -> Result<bool, ScopeError> {
    Ok(self.value(a)?.strict_equals(self.value(b)?))
  }

  pub fn set_named_property(
    &mut self,
    object: Local,
    key: &str,
    value: Local,
  ) -> Result<(), Exception> {
    let value = self.value(value)?.clone();
    self.object(object)?.set(key, value);
    Ok(())
  }

  /// Reads `key` into a new handle; a missing property reads as
  /// `undefined`.
  pub fn get_named_property(
    &mut self,
    object: Local,
    key: &str,
  ) -> Result<Local, Exception> {
    let value = self.object(object)?.get(key).unwrap_or(Value::Undefined);
    Ok(self.handle(value)?)
  }

  fn object(&self, local: Local) -> Result<Object, Exception> {
    match self.value(local)? {
      Value::Object(object) => Ok(object.clone()),
      other => {
        Err(JsErrorBox::type_error(format!("{other} is not an object")).into())
      }
    }
  }

  /// Calls a managed function through the bridge. The result is a handle in
  /// the current scope; a thrown value is returned as thrown.
  pub fn call_function(
    &mut self,
    function: Local,
    args: &[Local],
  ) -> Result<Local, Exception> {
    let function = match self.value(function)? {
      Value::Function(function) => function.clone(),
      other => {
        return Err(
          JsErrorBox::type_error(format!("{other} is not a function")).into(),
        );
      }
    };
    self.guard.env.call(&function, args)
  }

  /// Turns the value behind `local` into an exception, for
  /// `return Err(scope.throw(error))`.
  pub fn throw(&self, local: Local) -> Exception {
    match self.value(local) {
      Ok(value) => Exception::new(value.clone()),
      Err(err) => err.into(),
    }
  }

  pub fn open_handle_scope(&mut self) -> ScopeId {
    self.guard.env.stack.open()
  }

  pub fn open_escapable_handle_scope(&mut self) -> ScopeId {
    self.guard.env.stack.open_escapable()
  }

  pub fn close_handle_scope(
    &mut self,
    scope: ScopeId,
  ) -> Result<(), ScopeError> {
    self.check_not_bridge_owned(scope)?;
    self.guard.env.stack.close(scope)?;
    Ok(())
  }

  pub fn escape_handle(
    &mut self,
    scope: ScopeId,
    local: Local,
  ) -> Result<Local, ScopeError> {
    self.check_not_bridge_owned(scope)?;
    self.guard.env.stack.escape(scope, local)
  }

  fn check_not_bridge_owned(&self, scope: ScopeId) -> Result<(), InvalidState> {
    if scope == self.id {
      return Err(InvalidState::BridgeOwned(scope));
    }
    Ok(())
  }
}

impl Drop for CallScope<'_> {
  fn drop(&mut self) {
    self.guard.env.call_depth -= 1;
  }
}
