// Copyright 2018-2025 the Deno authors. MIT license.

use handle_scope::Env;
use handle_scope::Exception;
use handle_scope::Function;
use handle_scope::Object;
use handle_scope::deno_error::JsErrorBox;
use handle_scope::deno_error::builtin_classes::RANGE_ERROR;
use log::debug;

pub mod napi;

fn export(exports: &Object, name: &str) -> Result<Function, Exception> {
  exports
    .get(name)
    .and_then(|value| value.as_function().cloned())
    .ok_or_else(|| {
      JsErrorBox::type_error(format!("{name} is not a function")).into()
    })
}

/// Drives every handle scope probe once, in order, the way a managed test
/// script would.
pub fn run_handle_scope_script(env: &mut Env) -> Result<(), Exception> {
  let exports = napi::init();

  env.invoke(&export(&exports, "NewScope")?, &[])?;

  let escaped = env.invoke(&export(&exports, "NewScopeEscape")?, &[])?;
  if !escaped.is_object() {
    return Err(
      JsErrorBox::generic(format!("Expected an object, got {escaped}")).into(),
    );
  }

  env.invoke(&export(&exports, "NewScopeEscapeTwice")?, &[])?;

  let throws = Function::new("throwsRangeError", |_, _| {
    Err(Exception::error(RANGE_ERROR, ""))
  });
  let with_exception = export(&exports, "NewScopeWithException")?;
  match env.invoke(&with_exception, &[throws.into()]) {
    Err(exception) if exception.is_instance_of(RANGE_ERROR) => {
      debug!("NewScopeWithException rethrew {}", exception.value());
    }
    Err(exception) => return Err(exception),
    Ok(_) => {
      return Err(
        JsErrorBox::generic("Missing expected exception (RangeError)").into(),
      );
    }
  }
  Ok(())
}
