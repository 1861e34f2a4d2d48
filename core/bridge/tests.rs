// Copyright 2018-2025 the Deno authors. MIT license.

use super::*;
use crate::error::Exception;
use crate::error::InvalidState;
use crate::error::ScopeError;
use crate::value::Function;
use crate::value::Object;
use crate::value::Value;
use crate::value::ValueType;
use crate::value::WeakObject;
use deno_error::JsErrorBox;
use deno_error::builtin_classes::GENERIC_ERROR;
use deno_error::builtin_classes::RANGE_ERROR;
use deno_error::builtin_classes::TYPE_ERROR;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

fn assert_clean(env: &Env) {
  assert_eq!(env.stack().depth(), 1);
  assert_eq!(env.stack().current().unwrap(), env.root());
  assert_eq!(env.stack().live_handles(), 0);
  assert_eq!(env.call_depth(), 0);
}

#[test]
fn returned_object_escapes_into_caller() {
  let mut env = Env::default();
  let make_point = Function::new("makePoint", |scope, args| {
    let point = scope.create_object()?;
    scope.set_named_property(point, "x", args[0])?;
    let y = scope.create_number(2.0)?;
    scope.set_named_property(point, "y", y)?;
    for _ in 0..16 {
      scope.create_object()?;
    }
    Ok(Some(point))
  });

  let value = env.invoke(&make_point, &[Value::from(1.0)]).unwrap();
  let point = value.as_object().unwrap();
  assert_eq!(point.get("x").unwrap().to_string(), "1");
  assert_eq!(point.get("y").unwrap().to_string(), "2");
  assert_clean(&env);
}

#[test]
fn thrown_error_keeps_identity() {
  let mut env = Env::default();
  let thrown = Rc::new(RefCell::new(None::<Object>));
  let record = thrown.clone();
  let fail = Function::new("fail", move |scope, _| {
    let error = scope.create_range_error(None, "boom")?;
    for _ in 0..4 {
      scope.create_object()?;
    }
    if let Value::Object(object) = scope.value(error)? {
      record.replace(Some(object.clone()));
    }
    Err(scope.throw(error))
  });

  let exception = env.invoke(&fail, &[]).unwrap_err();
  assert!(exception.is_instance_of(RANGE_ERROR));
  assert_eq!(exception.message().as_deref(), Some("boom"));
  let expected = thrown.borrow().clone().unwrap();
  assert!(Object::ptr_eq(
    exception.value().as_object().unwrap(),
    &expected
  ));
  assert_clean(&env);
}

#[test]
fn error_box_is_thrown_with_its_class() {
  let mut env = Env::default();
  let fail = Function::new("fail", |scope, _| {
    scope.create_object()?;
    Err(JsErrorBox::type_error("wrong type").into())
  });

  let exception = env.invoke(&fail, &[]).unwrap_err();
  assert!(exception.is_instance_of(TYPE_ERROR));
  assert_eq!(exception.to_string(), "Uncaught TypeError: wrong type");
  assert_clean(&env);
}

#[test]
fn leaked_scopes_are_unwound() {
  let mut env = Env::default();
  let weak = Rc::new(RefCell::new(None::<WeakObject>));
  let record = weak.clone();
  let leaky = Function::new("leaky", move |scope, _| {
    scope.open_handle_scope();
    let object = scope.create_object()?;
    if let Value::Object(object) = scope.value(object)? {
      record.replace(Some(object.downgrade()));
    }
    scope.open_escapable_handle_scope();
    assert_eq!(scope.stack().depth(), 5);
    Ok(None)
  });

  let value = env.invoke(&leaky, &[]).unwrap();
  assert_eq!(value.type_of(), ValueType::Undefined);
  assert!(!weak.borrow().as_ref().unwrap().is_alive());
  assert_clean(&env);
}

#[test]
fn returning_a_closed_handle_is_a_structural_error() {
  let mut env = Env::default();
  let dangling = Function::new("dangling", |scope, _| {
    let inner = scope.open_handle_scope();
    let object = scope.create_object()?;
    scope.close_handle_scope(inner)?;
    Ok(Some(object))
  });

  let exception = env.invoke(&dangling, &[]).unwrap_err();
  assert!(exception.is_instance_of(GENERIC_ERROR));
  let message = exception.message().unwrap();
  assert!(message.starts_with("Invalid handle scope state: scope #"));
  assert!(message.ends_with("is closed"));
  assert_clean(&env);
}

#[test]
fn returning_a_handle_from_a_leaked_scope_fails() {
  let mut env = Env::default();
  let leaky = Function::new("leaky", |scope, _| {
    scope.open_handle_scope();
    Ok(Some(scope.create_object()?))
  });

  let exception = env.invoke(&leaky, &[]).unwrap_err();
  assert!(exception.is_instance_of(GENERIC_ERROR));
  assert_clean(&env);
}

#[test]
fn call_scope_belongs_to_the_bridge() {
  let mut env = Env::default();
  let probe = Function::new("probe", |scope, _| {
    let id = scope.id();
    let object = scope.create_object()?;
    assert_eq!(
      scope.close_handle_scope(id).unwrap_err(),
      ScopeError::InvalidState(InvalidState::BridgeOwned(id))
    );
    assert_eq!(
      scope.escape_handle(id, object).unwrap_err(),
      ScopeError::InvalidState(InvalidState::BridgeOwned(id))
    );
    Ok(Some(object))
  });

  assert!(env.invoke(&probe, &[]).unwrap().is_object());
  assert_clean(&env);
}

#[test]
fn returning_an_argument_preserves_identity() {
  let mut env = Env::default();
  let identity = Function::new("identity", |_, args| Ok(Some(args[0])));
  let object = Object::new();

  let value = env.invoke(&identity, &[object.clone().into()]).unwrap();
  assert!(value.strict_equals(&Value::Object(object)));
  assert_clean(&env);
}

#[test]
fn nested_call_lands_in_current_scope() {
  let mut env = Env::default();
  let double = Function::new("double", |scope, args| {
    assert_eq!(scope.call_depth(), 2);
    let n = match scope.value(args[0])? {
      Value::Number(n) => *n,
      _ => 0.0,
    };
    Ok(Some(scope.create_number(n * 2.0)?))
  });
  let outer = Function::new("outer", |scope, args| {
    let inner = scope.open_escapable_handle_scope();
    let arg = scope.create_number(21.0)?;
    let result = scope.call_function(args[0], &[arg])?;
    assert_eq!(result.scope(), inner);
    let escaped = scope.escape_handle(inner, result)?;
    scope.close_handle_scope(inner)?;
    Ok(Some(escaped))
  });

  let value = env.invoke(&outer, &[double.into()]).unwrap();
  assert!(value.strict_equals(&Value::Number(42.0)));
  assert_clean(&env);
}

#[test]
fn nested_exception_passes_through_unchanged() {
  let mut env = Env::default();
  let thrower = Function::new("thrower", |_, _| {
    Err(Exception::error("CustomError", "from callback"))
  });
  let outer = Function::new("outer", |scope, args| {
    scope.open_handle_scope();
    scope.create_object()?;
    scope.call_function(args[0], &[])?;
    unreachable!("callback should have thrown");
  });

  let exception = env.invoke(&outer, &[thrower.into()]).unwrap_err();
  assert!(exception.is_instance_of("CustomError"));
  assert_eq!(exception.message().as_deref(), Some("from callback"));
  assert_clean(&env);
}

#[test]
fn calling_a_non_function_throws_type_error() {
  let mut env = Env::default();
  let call = Function::new("call", |scope, args| {
    Ok(Some(scope.call_function(args[0], &[])?))
  });

  let exception = env.invoke(&call, &[Value::from(1.0)]).unwrap_err();
  assert!(exception.is_instance_of(TYPE_ERROR));
  assert_eq!(exception.message().as_deref(), Some("1 is not a function"));
  assert_clean(&env);
}

#[test]
fn exceeding_max_call_depth_throws_range_error() {
  let mut env = Env::new(EnvOptions {
    max_call_depth: 8,
    ..Default::default()
  });
  let deepest = Rc::new(Cell::new(0));
  let record = deepest.clone();
  let recurse = Function::new("recurse", move |scope, args| {
    record.set(record.get().max(scope.call_depth()));
    scope.call_function(args[0], args)?;
    Ok(None)
  });

  let exception = env
    .invoke(&recurse, &[recurse.clone().into()])
    .unwrap_err();
  assert!(exception.is_instance_of(RANGE_ERROR));
  assert_eq!(
    exception.message().as_deref(),
    Some("Maximum call stack size exceeded")
  );
  assert_eq!(deepest.get(), 8);
  assert_clean(&env);
}

#[test]
fn panicking_native_code_still_closes_its_scopes() {
  let mut env = Env::default();
  let panics = Function::new("panics", |scope, _| {
    scope.open_handle_scope();
    scope.create_object()?;
    panic!("native code panicked");
  });

  let result =
    std::panic::catch_unwind(AssertUnwindSafe(|| env.invoke(&panics, &[])));
  assert!(result.is_err());
  assert_clean(&env);
}

#[test]
fn value_api_reads_and_writes_through_handles() {
  let mut env = Env::default();
  let inspect = Function::new("inspect", |scope, args| {
    let object = args[0];
    assert_eq!(scope.type_of(object)?, ValueType::Object);

    let missing = scope.get_named_property(object, "missing")?;
    assert_eq!(scope.type_of(missing)?, ValueType::Undefined);

    let error = scope.create_error(Some("ERR_BAD"), "bad")?;
    assert!(scope.is_error(error)?);
    assert!(!scope.is_error(object)?);
    let code = scope.get_named_property(error, "code")?;
    assert_eq!(scope.value(code)?.to_string(), "ERR_BAD");

    let null = scope.get_null()?;
    let undefined = scope.get_undefined()?;
    assert!(!scope.strict_equals(null, undefined)?);
    assert!(scope.strict_equals(object, object)?);

    let flag = scope.get_boolean(true)?;
    assert_eq!(scope.type_of(flag)?, ValueType::Boolean);
    let number = scope.create_number(7.0)?;
    let err = scope.set_named_property(number, "x", flag).unwrap_err();
    assert!(err.is_instance_of(TYPE_ERROR));

    let greeting = scope.create_string("hello")?;
    scope.set_named_property(object, "greeting", greeting)?;
    Ok(Some(greeting))
  });
  let object = Object::new();

  let value = env.invoke(&inspect, &[object.clone().into()]).unwrap();
  assert_eq!(value.to_string(), "hello");
  assert_eq!(object.get("greeting").unwrap().to_string(), "hello");
  assert_clean(&env);
}
