// Copyright 2018-2025 the Deno authors. MIT license.

//! Opaque managed-runtime values.
//!
//! Handle scopes never look inside a [`Value`]; they only own it. Objects and
//! functions are reference counted and compared by identity, which is what
//! makes reclamation and exception identity observable from native code.

use crate::bridge::CallScope;
use crate::error::Exception;
use crate::scope::Local;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

/// What a native function or managed callback hands back to the bridge.
/// `Ok(None)` is `undefined`.
pub type FunctionResult = Result<Option<Local>, Exception>;

/// Signature shared by native functions and managed callbacks.
pub type FunctionCallback =
  dyn Fn(&mut CallScope<'_>, &[Local]) -> FunctionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
  Undefined,
  Null,
  Boolean,
  Number,
  String,
  Object,
  Function,
}

#[derive(Clone)]
pub enum Value {
  Undefined,
  Null,
  Boolean(bool),
  Number(f64),
  String(Rc<str>),
  Object(Object),
  Function(Function),
}

impl Value {
  pub fn type_of(&self) -> ValueType {
    match self {
      Value::Undefined => ValueType::Undefined,
      Value::Null => ValueType::Null,
      Value::Boolean(_) => ValueType::Boolean,
      Value::Number(_) => ValueType::Number,
      Value::String(_) => ValueType::String,
      Value::Object(_) => ValueType::Object,
      Value::Function(_) => ValueType::Function,
    }
  }

  /// Functions are objects too, as `fn instanceof Object` is in JS.
  pub fn is_object(&self) -> bool {
    matches!(self, Value::Object(_) | Value::Function(_))
  }

  pub fn is_error(&self) -> bool {
    self.as_object().is_some_and(Object::is_error)
  }

  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  pub fn as_function(&self) -> Option<&Function> {
    match self {
      Value::Function(function) => Some(function),
      _ => None,
    }
  }

  /// `===` semantics: primitives by value, objects and functions by identity.
  pub fn strict_equals(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
      (Value::Boolean(a), Value::Boolean(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => Object::ptr_eq(a, b),
      (Value::Function(a), Value::Function(b)) => Function::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Boolean(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.into())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value.into())
  }
}

impl From<Object> for Value {
  fn from(value: Object) -> Self {
    Value::Object(value)
  }
}

impl From<Function> for Value {
  fn from(value: Function) -> Self {
    Value::Function(value)
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => f.write_str("undefined"),
      Value::Null => f.write_str("null"),
      Value::Boolean(value) => write!(f, "{value}"),
      Value::Number(value) if value.is_infinite() => {
        f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
      }
      Value::Number(value) => write!(f, "{value}"),
      Value::String(value) => f.write_str(value),
      Value::Object(object) => fmt::Display::fmt(object, f),
      Value::Function(function) => {
        write!(f, "function {}() {{ [native code] }}", function.name())
      }
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::String(value) => write!(f, "{value:?}"),
      Value::Object(object) => fmt::Debug::fmt(object, f),
      Value::Function(function) => fmt::Debug::fmt(function, f),
      _ => fmt::Display::fmt(self, f),
    }
  }
}

struct ObjectData {
  class_name: Cow<'static, str>,
  is_error: bool,
  properties: RefCell<Vec<(String, Value)>>,
}

/// A reference-counted managed object.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

impl Default for Object {
  fn default() -> Self {
    Self::new()
  }
}

impl Object {
  pub fn new() -> Self {
    Self::with_class("Object")
  }

  pub fn with_class(class_name: impl Into<Cow<'static, str>>) -> Self {
    Self(Rc::new(ObjectData {
      class_name: class_name.into(),
      is_error: false,
      properties: Default::default(),
    }))
  }

  /// Creates an error object of the given class (`"RangeError"`,
  /// `"TypeError"`, ...) carrying `message` as its `message` property.
  pub fn error(
    class_name: impl Into<Cow<'static, str>>,
    message: impl Into<String>,
  ) -> Self {
    let message: String = message.into();
    Self(Rc::new(ObjectData {
      class_name: class_name.into(),
      is_error: true,
      properties: RefCell::new(vec![(
        "message".to_string(),
        Value::from(message),
      )]),
    }))
  }

  pub fn class_name(&self) -> &str {
    &self.0.class_name
  }

  pub fn is_error(&self) -> bool {
    self.0.is_error
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self
      .0
      .properties
      .borrow()
      .iter()
      .find(|(name, _)| name == key)
      .map(|(_, value)| value.clone())
  }

  pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
    let key = key.into();
    let value = value.into();
    let mut properties = self.0.properties.borrow_mut();
    match properties.iter_mut().find(|(name, _)| *name == key) {
      Some((_, slot)) => *slot = value,
      None => properties.push((key, value)),
    }
  }

  pub fn message(&self) -> Option<String> {
    match self.get("message")? {
      Value::String(message) => Some(message.to_string()),
      _ => None,
    }
  }

  pub fn ptr_eq(a: &Object, b: &Object) -> bool {
    Rc::ptr_eq(&a.0, &b.0)
  }

  pub fn downgrade(&self) -> WeakObject {
    WeakObject(Rc::downgrade(&self.0))
  }
}

impl fmt::Display for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.is_error() {
      return write!(f, "[object {}]", self.class_name());
    }
    match self.message() {
      Some(message) if !message.is_empty() => {
        write!(f, "{}: {}", self.class_name(), message)
      }
      _ => f.write_str(self.class_name()),
    }
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Object")
      .field("class_name", &self.class_name())
      .field("properties", &self.0.properties.borrow())
      .finish()
  }
}

/// Observes an [`Object`] without keeping it alive.
#[derive(Clone)]
pub struct WeakObject(Weak<ObjectData>);

impl WeakObject {
  pub fn upgrade(&self) -> Option<Object> {
    self.0.upgrade().map(Object)
  }

  pub fn is_alive(&self) -> bool {
    self.0.strong_count() > 0
  }
}

struct FunctionData {
  name: Cow<'static, str>,
  callback: Box<FunctionCallback>,
}

/// A callable value. Native functions and managed callbacks share this
/// representation; both run through the bridge in their own call scope.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
  pub fn new<F>(name: impl Into<Cow<'static, str>>, callback: F) -> Self
  where
    F: Fn(&mut CallScope<'_>, &[Local]) -> FunctionResult + 'static,
  {
    Self(Rc::new(FunctionData {
      name: name.into(),
      callback: Box::new(callback),
    }))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  pub fn ptr_eq(a: &Function, b: &Function) -> bool {
    Rc::ptr_eq(&a.0, &b.0)
  }

  pub(crate) fn call(
    &self,
    scope: &mut CallScope<'_>,
    args: &[Local],
  ) -> FunctionResult {
    (self.0.callback)(scope, args)
  }
}

impl fmt::Debug for Function {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Function").field("name", &self.name()).finish()
  }
}
