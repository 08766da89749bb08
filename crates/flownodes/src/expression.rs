//! Sandboxed expression evaluation backed by rhai.

use flowcore::{ExpressionError, ExpressionEvaluator};
use rhai::{Dynamic, Engine, Scope};
use serde_json::{Map, Value};

/// Evaluates conditions and scripts with a locked-down rhai engine.
///
/// JSON bindings become rhai object maps/arrays, so `data.value > 10`
/// and `data.items.len()` work as expected.
pub struct RhaiEvaluator {
    engine: Engine,
}

impl RhaiEvaluator {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(100_000);
        engine.set_max_call_levels(32);
        engine.set_max_expr_depths(64, 32);
        engine.set_max_string_size(1 << 20);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(10_000);
        engine.disable_symbol("eval");
        Self { engine }
    }
}

impl Default for RhaiEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator for RhaiEvaluator {
    fn evaluate(&self, source: &str, bindings: &Map<String, Value>) -> Result<Value, ExpressionError> {
        let mut scope = Scope::new();
        for (name, value) in bindings {
            let dynamic = rhai::serde::to_dynamic(value).map_err(|e| ExpressionError(e.to_string()))?;
            scope.push_dynamic(name.clone(), dynamic);
        }

        let result = self
            .engine
            .eval_with_scope::<Dynamic>(&mut scope, source)
            .map_err(|e| ExpressionError(e.to_string()))?;

        rhai::serde::from_dynamic::<Value>(&result).map_err(|e| ExpressionError(e.to_string()))
    }
}
