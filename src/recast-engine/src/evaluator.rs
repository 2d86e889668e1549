//! Scalar expression evaluation.

use std::cmp::Ordering;
use std::sync::Arc;

use common_error::{RecastError, RecastResult};
use recast_core::{DataType, MemberCache, Value};
use recast_expr::{BinaryOp, CallExpr, Expr, Method, UnaryOp};

use crate::lambda::CompiledLambda;

/// Parameter bindings visible while evaluating a lambda body.
///
/// Later bindings shadow earlier ones with the same name.
#[derive(Debug, Default, Clone)]
pub struct Bindings<'a> {
    entries: Vec<(&'a str, &'a Value)>,
}

impl<'a> Bindings<'a> {
    /// Create empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`.
    pub fn bind(mut self, name: &'a str, value: &'a Value) -> Self {
        self.entries.push((name, value));
        self
    }

    /// Look up the innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// Evaluates scalar expressions against parameter bindings.
///
/// String `==` is ordinal; the comparison mode of `StringEquals` calls is
/// honoured. Member access resolves field positions through the owned
/// [`MemberCache`].
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    cache: Arc<MemberCache>,
}

impl Evaluator {
    /// Create an evaluator with its own member cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator sharing `cache`.
    pub fn with_cache(cache: Arc<MemberCache>) -> Self {
        Self { cache }
    }

    /// The member cache used for field lookups.
    pub fn cache(&self) -> &Arc<MemberCache> {
        &self.cache
    }

    /// Compile a lambda expression into a callable.
    pub fn compile(&self, expr: &Expr) -> RecastResult<CompiledLambda> {
        CompiledLambda::new(self.clone(), expr)
    }

    /// Evaluate an expression.
    pub fn evaluate(&self, expr: &Expr, bindings: &Bindings<'_>) -> RecastResult<Value> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),

            Expr::Parameter(param) => bindings.get(param.name()).cloned().ok_or_else(|| {
                RecastError::execution(format!("unbound parameter '{}'", param.name()))
            }),

            Expr::Member { expr, member, .. } => self.eval_member(expr, member, bindings),

            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right, bindings),

            Expr::Unary { op, expr } => self.eval_unary(*op, expr, bindings),

            Expr::Call(call) => self.eval_call(call, bindings),

            Expr::Lambda(_) => Err(RecastError::execution(
                "lambda cannot be evaluated as a value",
            )),

            Expr::Source(source) => Err(RecastError::execution(format!(
                "source '{}' cannot be evaluated as a value",
                source.name()
            ))),
        }
    }

    /// Evaluate a predicate; `null` counts as false.
    pub fn evaluate_predicate(&self, expr: &Expr, bindings: &Bindings<'_>) -> RecastResult<bool> {
        match self.evaluate(expr, bindings)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(RecastError::type_error(format!(
                "predicate must evaluate to Bool, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_member(
        &self,
        expr: &Expr,
        member: &str,
        bindings: &Bindings<'_>,
    ) -> RecastResult<Value> {
        let record_type = match expr.data_type()? {
            DataType::Record(record_type) => record_type,
            other => {
                return Err(RecastError::type_error(format!(
                    "cannot access member '{member}' of {other}"
                )));
            }
        };
        let info = self.cache.lookup(&record_type, member)?;

        match self.evaluate(expr, bindings)? {
            Value::Null => Err(RecastError::execution(format!(
                "member '{member}' accessed on null {}",
                record_type.name()
            ))),
            Value::Record(record) if record.type_name() == record_type.name() => record
                .get_index(info.index)
                .cloned()
                .ok_or_else(|| {
                    RecastError::execution(format!(
                        "record {} is missing member '{member}'",
                        record.type_name()
                    ))
                }),
            other => Err(RecastError::type_error(format!(
                "expected {} record, got {}",
                record_type.name(),
                other.type_name()
            ))),
        }
    }

    fn eval_binary(
        &self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        bindings: &Bindings<'_>,
    ) -> RecastResult<Value> {
        // Short-circuit logical operators
        if op.is_logical() {
            let l = self.evaluate_predicate(left, bindings)?;
            return match (op, l) {
                (BinaryOp::And, false) => Ok(Value::Bool(false)),
                (BinaryOp::Or, true) => Ok(Value::Bool(true)),
                _ => self.evaluate_predicate(right, bindings).map(Value::Bool),
            };
        }

        let l = self.evaluate(left, bindings)?;
        let r = self.evaluate(right, bindings)?;

        if op.is_comparison() {
            return Ok(Value::Bool(compare_values(&l, op, &r)));
        }

        if op.is_arithmetic() {
            return arithmetic(&l, op, &r);
        }

        match (op, l, r) {
            (BinaryOp::Concat, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (BinaryOp::Concat, Value::Null, _) | (BinaryOp::Concat, _, Value::Null) => {
                Ok(Value::Null)
            }
            (op, l, r) => Err(RecastError::type_error(format!(
                "operator {op} cannot be applied to {} and {}",
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    fn eval_unary(&self, op: UnaryOp, expr: &Expr, bindings: &Bindings<'_>) -> RecastResult<Value> {
        let value = self.evaluate(expr, bindings)?;
        match (op, value) {
            (UnaryOp::IsNull, v) => Ok(Value::Bool(v.is_null())),
            (UnaryOp::IsNotNull, v) => Ok(Value::Bool(!v.is_null())),
            (UnaryOp::Not | UnaryOp::Neg, Value::Null) => Ok(Value::Null),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Neg, Value::Int64(i)) => i
                .checked_neg()
                .map(Value::Int64)
                .ok_or_else(|| RecastError::execution("integer overflow in negation")),
            (UnaryOp::Neg, Value::Float64(f)) => Ok(Value::Float64(-f)),
            (op, v) => Err(RecastError::type_error(format!(
                "operator {op} cannot be applied to {}",
                v.type_name()
            ))),
        }
    }

    fn eval_call(&self, call: &CallExpr, bindings: &Bindings<'_>) -> RecastResult<Value> {
        let method = call.method();
        if method.is_query_operator() {
            return Err(RecastError::execution(format!(
                "{method} cannot be evaluated inside a scalar expression"
            )));
        }

        let args = call
            .args()
            .iter()
            .map(|arg| self.evaluate(arg, bindings))
            .collect::<RecastResult<Vec<_>>>()?;

        match (method, args.as_slice()) {
            (Method::StringEquals(_), [Value::Null, Value::Null]) => Ok(Value::Bool(true)),
            (Method::StringEquals(_), [Value::Null, _] | [_, Value::Null]) => {
                Ok(Value::Bool(false))
            }
            (Method::StringEquals(comparison), [Value::String(a), Value::String(b)]) => {
                Ok(Value::Bool(comparison.equals(a, b)))
            }
            (Method::ToUpper | Method::ToLower, [Value::Null]) => Ok(Value::Null),
            (Method::ToUpper, [Value::String(s)]) => Ok(Value::String(s.to_uppercase())),
            (Method::ToLower, [Value::String(s)]) => Ok(Value::String(s.to_lowercase())),
            (Method::Contains | Method::StartsWith, [Value::Null, _] | [_, Value::Null]) => {
                Ok(Value::Bool(false))
            }
            (Method::Contains, [Value::String(s), Value::String(p)]) => {
                Ok(Value::Bool(s.contains(p.as_str())))
            }
            (Method::StartsWith, [Value::String(s), Value::String(p)]) => {
                Ok(Value::Bool(s.starts_with(p.as_str())))
            }
            (method, args) => Err(RecastError::type_error(format!(
                "{method} cannot be applied to ({})",
                args.iter()
                    .map(Value::type_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Lifted comparison: `null == null` holds, any other comparison with `null`
/// is false.
fn compare_values(l: &Value, op: BinaryOp, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => matches!(op, BinaryOp::Eq | BinaryOp::LtEq | BinaryOp::GtEq),
        (Value::Null, _) | (_, Value::Null) => op == BinaryOp::NotEq,
        _ => match l.compare(r) {
            Some(ordering) => match op {
                BinaryOp::Eq => ordering == Ordering::Equal,
                BinaryOp::NotEq => ordering != Ordering::Equal,
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                BinaryOp::GtEq => ordering != Ordering::Less,
                _ => false,
            },
            // No common order: only structural equality is meaningful
            None => match op {
                BinaryOp::Eq => l == r,
                BinaryOp::NotEq => l != r,
                _ => false,
            },
        },
    }
}

fn arithmetic(l: &Value, op: BinaryOp, r: &Value) -> RecastResult<Value> {
    match (l, r) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int64(a), Value::Int64(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Subtract => a.checked_sub(*b),
                BinaryOp::Multiply => a.checked_mul(*b),
                BinaryOp::Divide | BinaryOp::Modulo if *b == 0 => {
                    return Err(RecastError::execution("division by zero"));
                }
                BinaryOp::Divide => a.checked_div(*b),
                BinaryOp::Modulo => a.checked_rem(*b),
                _ => None,
            };
            result
                .map(Value::Int64)
                .ok_or_else(|| RecastError::execution(format!("integer overflow in {a} {op} {b}")))
        }
        _ => {
            let (Some(a), Some(b)) = (l.as_float64(), r.as_float64()) else {
                return Err(RecastError::type_error(format!(
                    "operator {op} cannot be applied to {} and {}",
                    l.type_name(),
                    r.type_name()
                )));
            };
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                _ => {
                    return Err(RecastError::internal(format!(
                        "{op} is not an arithmetic operator"
                    )));
                }
            };
            Ok(Value::Float64(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use recast_core::{Field, Record, RecordType, StringComparison};
    use recast_expr::{lit, param};

    use super::*;

    fn thing_type() -> RecordType {
        RecordType::new(
            "Thing",
            vec![
                Field::new("string1", DataType::String),
                Field::new("count", DataType::Int64),
            ],
        )
    }

    fn eval(expr: &Expr) -> Value {
        Evaluator::new().evaluate(expr, &Bindings::new()).unwrap()
    }

    #[test]
    fn test_string_equality_is_ordinal() {
        assert_eq!(eval(&lit("s1").eq(lit("s1"))), Value::Bool(true));
        assert_eq!(eval(&lit("s1").eq(lit("S1"))), Value::Bool(false));
    }

    #[test]
    fn test_string_equals_honours_comparison() {
        let ignore_case = lit("s1")
            .string_equals(lit("S1"), StringComparison::OrdinalIgnoreCase)
            .unwrap();
        assert_eq!(eval(&ignore_case), Value::Bool(true));

        let ordinal = lit("s1")
            .string_equals(lit("S1"), StringComparison::Ordinal)
            .unwrap();
        assert_eq!(eval(&ordinal), Value::Bool(false));
    }

    #[test]
    fn test_string_equals_with_nulls() {
        let s = param("s", DataType::String);
        let call = s
            .clone()
            .string_equals(lit("a"), StringComparison::OrdinalIgnoreCase)
            .unwrap();
        let null = Value::Null;
        let bindings = Bindings::new().bind("s", &null);
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&call, &bindings).unwrap(), Value::Bool(false));

        let both = s
            .clone()
            .string_equals(s, StringComparison::OrdinalIgnoreCase)
            .unwrap();
        assert_eq!(evaluator.evaluate(&both, &bindings).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_member_access() {
        let record = Value::Record(Record::new("Thing").with("string1", "a").with("count", 3i64));
        let item = param("item", DataType::Record(thing_type()));
        let expr = item.member("count").unwrap().gt(lit(2i64));

        let evaluator = Evaluator::new();
        let bindings = Bindings::new().bind("item", &record);
        assert!(evaluator.evaluate_predicate(&expr, &bindings).unwrap());
        assert_eq!(evaluator.cache().len(), 1);
    }

    #[test]
    fn test_unbound_parameter() {
        let err = Evaluator::new()
            .evaluate(&param("x", DataType::Int64), &Bindings::new())
            .unwrap_err();
        assert!(matches!(err, RecastError::ExecutionError(_)));
    }

    #[test]
    fn test_shadowing() {
        let outer = Value::Int64(1);
        let inner = Value::Int64(2);
        let bindings = Bindings::new().bind("x", &outer).bind("x", &inner);
        assert_eq!(bindings.get("x"), Some(&inner));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(&lit(2i64).add_expr(lit(3i64))), Value::Int64(5));
        assert_eq!(eval(&lit(2i64).add_expr(lit(0.5))), Value::Float64(2.5));

        let err = Evaluator::new()
            .evaluate(
                &Expr::binary(lit(1i64), BinaryOp::Divide, lit(0i64)),
                &Bindings::new(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "ExecutionError: division by zero");
    }

    #[test]
    fn test_null_comparisons() {
        let null = Expr::Constant(Value::Null);
        assert_eq!(eval(&null.clone().eq(null.clone())), Value::Bool(true));
        assert_eq!(eval(&lit("a").eq(null.clone())), Value::Bool(false));
        assert_eq!(eval(&lit("a").not_eq(null.clone())), Value::Bool(true));
        assert_eq!(eval(&lit(1i64).lt(null)), Value::Bool(false));
    }

    #[test]
    fn test_logical_short_circuit() {
        // The right side would fail if evaluated
        let unbound = param("missing", DataType::Bool);
        assert_eq!(eval(&lit(false).and(unbound.clone())), Value::Bool(false));
        assert_eq!(eval(&lit(true).or(unbound)), Value::Bool(true));
    }

    #[test]
    fn test_string_methods() {
        let upper = Expr::call(Method::ToUpper, vec![lit("abc")]).unwrap();
        assert_eq!(eval(&upper), Value::from("ABC"));

        let contains = Expr::call(Method::Contains, vec![lit("haystack"), lit("st")]).unwrap();
        assert_eq!(eval(&contains), Value::Bool(true));
    }

    #[test]
    fn test_query_operator_is_not_scalar() {
        let count = Expr::call(
            Method::Count,
            vec![Expr::source("things", DataType::Record(thing_type()))],
        )
        .unwrap();
        let err = Evaluator::new()
            .evaluate(&count, &Bindings::new())
            .unwrap_err();
        assert!(err.to_string().contains("Count"));
    }
}
