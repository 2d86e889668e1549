//! Compiled lambdas.

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, Value};
use recast_expr::{Expr, ParameterExpr};

use crate::evaluator::{Bindings, Evaluator};

/// A lambda expression prepared for repeated invocation.
///
/// Owns its body and an evaluator, so it can be moved into the lazy row
/// streams the engine hands out.
#[derive(Debug, Clone)]
pub struct CompiledLambda {
    params: Vec<ParameterExpr>,
    body: Expr,
    result_type: DataType,
    evaluator: Evaluator,
}

impl CompiledLambda {
    pub(crate) fn new(evaluator: Evaluator, expr: &Expr) -> RecastResult<Self> {
        let Expr::Lambda(lambda) = expr else {
            return Err(RecastError::type_error(format!(
                "expected a lambda expression, got {}",
                expr.kind()
            )));
        };

        Ok(Self {
            params: lambda.params().to_vec(),
            body: lambda.body().clone(),
            result_type: lambda.body().data_type()?,
            evaluator,
        })
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Static type of the body.
    pub const fn result_type(&self) -> &DataType {
        &self.result_type
    }

    /// Call the lambda with positional arguments.
    pub fn invoke(&self, args: &[Value]) -> RecastResult<Value> {
        let bindings = self.bind(args)?;
        self.evaluator.evaluate(&self.body, &bindings)
    }

    /// Call a predicate lambda; `null` counts as false.
    pub fn test(&self, args: &[Value]) -> RecastResult<bool> {
        let bindings = self.bind(args)?;
        self.evaluator.evaluate_predicate(&self.body, &bindings)
    }

    fn bind<'a>(&'a self, args: &'a [Value]) -> RecastResult<Bindings<'a>> {
        if args.len() != self.params.len() {
            return Err(RecastError::invalid_parameter(format!(
                "lambda takes {} arguments, got {}",
                self.params.len(),
                args.len()
            )));
        }

        Ok(self
            .params
            .iter()
            .zip(args)
            .fold(Bindings::new(), |bindings, (param, value)| {
                bindings.bind(param.name(), value)
            }))
    }
}

/// Compile a lambda expression with a fresh evaluator.
pub fn compile_lambda(expr: &Expr) -> RecastResult<CompiledLambda> {
    Evaluator::new().compile(expr)
}
