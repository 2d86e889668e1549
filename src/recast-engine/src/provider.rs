//! In-memory query provider.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use common_config::ExecutionConfig;
use common_error::{RecastError, RecastResult};
use log::debug;
use recast_core::{DataType, MemberCache, Record, RecordType, Value};
use recast_expr::{CallExpr, Expr, Method};
use recast_provider::{DynQuery, Element, Query, QueryProvider, RowStream, create_query_as};

use crate::evaluator::{Bindings, Evaluator};
use crate::operators::{self, SortKey};

/// A registered in-memory source.
#[derive(Debug, Clone)]
struct MemorySource {
    element_type: DataType,
    rows: Arc<Vec<Value>>,
}

impl MemorySource {
    fn scan(&self) -> RowStream {
        let rows = Arc::clone(&self.rows);
        Box::new((0..rows.len()).map(move |i| Ok(rows[i].clone())))
    }
}

/// Query provider over named in-memory sources.
///
/// Rows are validated against their declared type when registered. Query
/// expressions are executed directly: sequence operators stream, ordering
/// buffers, and terminal operators run through [`QueryProvider::execute`].
#[derive(Debug, Default)]
pub struct MemoryProvider {
    sources: RwLock<HashMap<String, MemorySource>>,
    evaluator: Evaluator,
    config: ExecutionConfig,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create an empty provider with the given execution config.
    pub fn with_config(config: ExecutionConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            ..Self::default()
        })
    }

    /// Create an empty provider sharing a member cache.
    pub fn with_cache(config: ExecutionConfig, cache: Arc<MemberCache>) -> Arc<Self> {
        Arc::new(Self {
            sources: RwLock::default(),
            evaluator: Evaluator::with_cache(cache),
            config,
        })
    }

    /// The evaluator used for lambda bodies.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Execution config.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Register a source of records, replacing any source with the same name.
    ///
    /// Fails with `TypeError` if any row does not conform to `record_type`.
    pub fn register_source(
        &self,
        name: impl Into<String>,
        record_type: RecordType,
        rows: Vec<Record>,
    ) -> RecastResult<()> {
        for row in &rows {
            record_type.validate(row)?;
        }
        let rows = rows.into_iter().map(Value::Record).collect();
        self.insert(name.into(), DataType::Record(record_type), rows);
        Ok(())
    }

    /// Register a source of plain values.
    pub fn register_values(
        &self,
        name: impl Into<String>,
        element_type: DataType,
        rows: Vec<Value>,
    ) -> RecastResult<()> {
        if let Some(bad) = rows
            .iter()
            .find(|v| !v.data_type().can_coerce_to(&element_type))
        {
            return Err(RecastError::type_error(format!(
                "value {bad} does not conform to {element_type}"
            )));
        }
        self.insert(name.into(), element_type, rows);
        Ok(())
    }

    fn insert(&self, name: String, element_type: DataType, rows: Vec<Value>) {
        debug!("Registering source '{name}' with {} rows", rows.len());
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name,
                MemorySource {
                    element_type,
                    rows: Arc::new(rows),
                },
            );
    }

    /// Names of all registered sources, sorted.
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn source(&self, name: &str) -> RecastResult<MemorySource> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RecastError::source_not_found(name.to_string()))
    }

    /// Root query over a registered source.
    ///
    /// Fails with `SourceNotFound` for an unknown name and `TypeError` if `T`
    /// cannot hold the source's elements.
    pub fn query<T: Element>(self: &Arc<Self>, name: &str) -> RecastResult<Query<T>> {
        let source = self.source(name)?;
        create_query_as(self, Expr::source(name, source.element_type))
    }

    /// Build the row stream for a sequence-valued expression.
    fn stream(&self, expr: &Expr) -> RecastResult<RowStream> {
        match expr {
            Expr::Source(source) => {
                let registered = self.source(source.name())?;
                if &registered.element_type != source.element_type() {
                    return Err(RecastError::type_error(format!(
                        "source '{}' holds {}, query expects {}",
                        source.name(),
                        registered.element_type,
                        source.element_type()
                    )));
                }
                debug!(
                    "Scanning source '{}' ({} rows)",
                    source.name(),
                    registered.rows.len()
                );
                Ok(registered.scan())
            }
            Expr::Call(call) => self.stream_call(call),
            other => Err(RecastError::execution(format!(
                "{} expression does not produce a sequence",
                other.kind()
            ))),
        }
    }

    fn stream_call(&self, call: &CallExpr) -> RecastResult<RowStream> {
        let args = call.args();
        match call.method() {
            Method::Where => {
                let input = self.stream(&args[0])?;
                Ok(operators::filter(input, self.evaluator.compile(&args[1])?))
            }
            Method::Select => {
                let input = self.stream(&args[0])?;
                Ok(operators::project(input, self.evaluator.compile(&args[1])?))
            }
            Method::Skip => {
                let input = self.stream(&args[0])?;
                Ok(operators::skip(input, self.count_arg(&args[1])?))
            }
            Method::Take => {
                let input = self.stream(&args[0])?;
                Ok(operators::take(input, self.count_arg(&args[1])?))
            }
            method if method.is_ordering() => {
                let (input, keys) = self.sort_keys(call)?;
                operators::sort(self.stream(input)?, &keys, self.config.max_buffered_rows)
            }
            method => Err(RecastError::execution(format!(
                "{method} does not produce a sequence"
            ))),
        }
    }

    /// Collect the keys of an `OrderBy` followed by any number of `ThenBy`,
    /// most significant first, together with the unsorted input.
    fn sort_keys<'a>(&self, call: &'a CallExpr) -> RecastResult<(&'a Expr, Vec<SortKey>)> {
        let mut keys = Vec::new();
        let mut current = call;
        loop {
            let method = current.method();
            keys.push(SortKey {
                key: self.evaluator.compile(&current.args()[1])?,
                descending: method.is_descending(),
            });

            if matches!(method, Method::OrderBy | Method::OrderByDescending) {
                keys.reverse();
                return Ok((&current.args()[0], keys));
            }

            current = current.args()[0].as_call().ok_or_else(|| {
                RecastError::execution(format!("{method} is not preceded by an ordering"))
            })?;
        }
    }

    fn count_arg(&self, expr: &Expr) -> RecastResult<i64> {
        match self.evaluator.evaluate(expr, &Bindings::new())? {
            Value::Int64(n) => Ok(n),
            other => Err(RecastError::type_error(format!(
                "count must be Int64, got {}",
                other.type_name()
            ))),
        }
    }
}

impl QueryProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn create_query(self: Arc<Self>, expression: Expr) -> RecastResult<DynQuery> {
        DynQuery::new(self, expression)
    }

    fn execute(&self, expression: &Expr) -> RecastResult<Value> {
        let Some(call) = expression.as_call() else {
            return self.evaluator.evaluate(expression, &Bindings::new());
        };

        let method = call.method();
        if !matches!(method, Method::Count | Method::Any | Method::First) {
            return self.evaluator.evaluate(expression, &Bindings::new());
        }

        let args = call.args();
        let mut input = self.stream(&args[0])?;
        if let Some(predicate) = args.get(1) {
            input = operators::filter(input, self.evaluator.compile(predicate)?);
        }

        match method {
            Method::Count => {
                let mut count: i64 = 0;
                for row in input {
                    row?;
                    count += 1;
                }
                Ok(Value::Int64(count))
            }
            Method::Any => match input.next() {
                Some(row) => row.map(|_| Value::Bool(true)),
                None => Ok(Value::Bool(false)),
            },
            _ => input
                .next()
                .unwrap_or_else(|| Err(RecastError::execution("sequence contains no elements"))),
        }
    }

    fn execute_query(&self, expression: &Expr) -> RecastResult<RowStream> {
        self.stream(expression)
    }
}
