//! A process-wide, case-insensitive registry of host-provided CCL
//! functions, alongside the built-in aggregates and `IF` the evaluator
//! always recognizes.
use std::{collections::HashMap, sync::Arc, sync::RwLock};

use ccl_value::Value;
use once_cell::sync::Lazy;

/// A host-registered CCL function: takes the evaluated argument list,
/// returns a [`Value`] or an error message surfaced as a statement-level
/// warning.
pub type HostFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

static REGISTRY: Lazy<RwLock<HashMap<String, HostFn>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers `f` under `name`, matched case-insensitively by the evaluator.
/// Registering the same name again replaces the previous function.
pub fn register(name: &str, f: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static) {
    REGISTRY
        .write()
        .unwrap()
        .insert(name.to_ascii_uppercase(), Arc::new(f));
}

/// Removes a previously registered function. Returns `true` if one existed.
pub fn unregister(name: &str) -> bool {
    REGISTRY.write().unwrap().remove(&name.to_ascii_uppercase()).is_some()
}

pub(crate) fn lookup(name: &str) -> Option<HostFn> {
    REGISTRY.read().unwrap().get(&name.to_ascii_uppercase()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        register("double_test_fn", |args| {
            let (f, _) = ccl_value::to_float(args.first().unwrap_or(&Value::Null));
            Ok(Value::Float(f * 2.0))
        });
        assert!(lookup("DOUBLE_TEST_FN").is_some());
        assert!(lookup("double_test_fn").is_some());
        unregister("double_test_fn");
        assert!(lookup("double_test_fn").is_none());
    }
}
