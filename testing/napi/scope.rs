// Copyright 2018-2025 the Deno authors. MIT license.

use handle_scope::CallScope;
use handle_scope::Function;
use handle_scope::FunctionResult;
use handle_scope::Local;
use handle_scope::Object;
use handle_scope::Status;
use handle_scope::deno_error::JsErrorBox;

fn new_scope(scope: &mut CallScope<'_>, _args: &[Local]) -> FunctionResult {
  let inner = scope.open_handle_scope();
  scope.create_object()?;
  scope.close_handle_scope(inner)?;
  Ok(None)
}

fn new_scope_escape(
  scope: &mut CallScope<'_>,
  _args: &[Local],
) -> FunctionResult {
  let inner = scope.open_escapable_handle_scope();
  let output = scope.create_object()?;
  let escapee = scope.escape_handle(inner, output)?;
  scope.close_handle_scope(inner)?;
  Ok(Some(escapee))
}

fn new_scope_escape_twice(
  scope: &mut CallScope<'_>,
  _args: &[Local],
) -> FunctionResult {
  let inner = scope.open_escapable_handle_scope();
  let output = scope.create_object()?;
  scope.escape_handle(inner, output)?;
  let second = scope.escape_handle(inner, output);
  if Status::from(&second) != Status::EscapeCalledTwice {
    return Err(JsErrorBox::generic("Escaping twice fails").into());
  }
  scope.close_handle_scope(inner)?;
  Ok(None)
}

fn new_scope_with_exception(
  scope: &mut CallScope<'_>,
  args: &[Local],
) -> FunctionResult {
  let callback = args
    .first()
    .copied()
    .ok_or_else(|| JsErrorBox::type_error("Wrong number of arguments"))?;

  let inner = scope.open_handle_scope();
  scope.create_object()?;
  let result = scope.call_function(callback, &[]);
  if Status::from(&result) != Status::PendingException {
    return Err(JsErrorBox::generic("Callback should have thrown").into());
  }

  // The scope must still close while the exception is pending.
  scope.close_handle_scope(inner)?;
  result.map(|_| None)
}

pub fn init(exports: &Object) {
  exports.set("NewScope", Function::new("NewScope", new_scope));
  exports.set(
    "NewScopeEscape",
    Function::new("NewScopeEscape", new_scope_escape),
  );
  exports.set(
    "NewScopeEscapeTwice",
    Function::new("NewScopeEscapeTwice", new_scope_escape_twice),
  );
  exports.set(
    "NewScopeWithException",
    Function::new("NewScopeWithException", new_scope_with_exception),
  );
}
