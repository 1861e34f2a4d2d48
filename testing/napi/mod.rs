// Copyright 2018-2025 the Deno authors. MIT license.

use handle_scope::Object;

mod scope;


/// Builds the addon's exports object.
pub fn init() -> Object {
  let exports = Object::new();
  scope::init(&exports);
  exports
}
