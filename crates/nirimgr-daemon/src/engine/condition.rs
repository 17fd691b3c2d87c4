//! Guard expressions on configured actions
//!
//! Guards are Rhai expressions. The triggering notification or entity is
//! exposed to them as the constant `model`, converted field by field from its
//! serialized form, e.g. `model.urgent` or `model.app_id == "firefox"`.

use rhai::serde::to_dynamic;
use rhai::{Dynamic, Engine, Scope};
use serde::Serialize;
use thiserror::Error;

/// Name under which the context is visible to expressions
pub const MODEL_BINDING: &str = "model";

/// Operation budget for a single evaluation
const MAX_OPERATIONS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("could not expose context to condition '{expression}': {message}")]
    Context { expression: String, message: String },

    #[error("invalid condition '{expression}': {message}")]
    Compile { expression: String, message: String },

    #[error("error evaluating condition '{expression}': {message}")]
    Evaluate { expression: String, message: String },

    #[error("condition '{expression}' evaluated to {type_name}, expected a boolean")]
    NotBoolean {
        expression: String,
        type_name: String,
    },
}

/// Evaluates action guards against a context value
pub struct ConditionEvaluator {
    engine: Engine,
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        Self { engine }
    }

    /// Evaluate `expression` with `context` bound as `model`
    ///
    /// An empty expression is always true.
    pub fn evaluate<T>(&self, expression: &str, context: &T) -> Result<bool, ConditionError>
    where
        T: Serialize + ?Sized,
    {
        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(true);
        }

        let model = to_dynamic(context).map_err(|e| ConditionError::Context {
            expression: expression.to_string(),
            message: e.to_string(),
        })?;
        let mut scope = Scope::new();
        scope.push_constant_dynamic(MODEL_BINDING, model);

        let ast = self
            .engine
            .compile_expression_with_scope(&scope, expression)
            .map_err(|e| ConditionError::Compile {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|e| ConditionError::Evaluate {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        result
            .as_bool()
            .map_err(|type_name| ConditionError::NotBoolean {
                expression: expression.to_string(),
                type_name: type_name.to_string(),
            })
    }
}
