//! Integration tests for the recast-engine crate.
//!
//! These tests run queries end to end: sources registered with a
//! `MemoryProvider`, composed through `Query`, optionally intercepted with a
//! rewrite chain, and enumerated.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common_config::{ExecutionConfig, RewriteConfig};
use common_error::RecastError;
use proptest::prelude::*;
use recast_core::{DataType, Field, MemberCache, Record, RecordType, Value};
use recast_engine::{MemoryProvider, compile_lambda};
use recast_expr::{Expr, ParameterExpr, lit, param};
use recast_provider::{InterceptingProvider, Query, QueryProvider, execute_as};
use recast_rewrite::{CaseInsensitiveEquality, ExprRewriter, FnRewriter, RewriteChain};

fn thing_type() -> RecordType {
    RecordType::new(
        "Thing",
        vec![
            Field::new("string1", DataType::String),
            Field::new("string2", DataType::String),
        ],
    )
}

fn thing(s1: &str, s2: &str) -> Record {
    Record::new("Thing").with("string1", s1).with("string2", s2)
}

/// Two records whose fields differ only by case in the second row.
fn things_provider() -> Arc<MemoryProvider> {
    let provider = MemoryProvider::new();
    provider
        .register_source(
            "things",
            thing_type(),
            vec![thing("s1", "s1"), thing("s1", "S1")],
        )
        .unwrap();
    provider
}

fn person_type() -> RecordType {
    RecordType::new(
        "Person",
        vec![
            Field::new("name", DataType::String),
            Field::new("city", DataType::String),
            Field::new("age", DataType::Int64),
        ],
    )
}

fn person(name: &str, city: &str, age: i64) -> Record {
    Record::new("Person")
        .with("name", name)
        .with("city", city)
        .with("age", age)
}

fn people_provider() -> Arc<MemoryProvider> {
    let provider = MemoryProvider::new();
    provider
        .register_source(
            "people",
            person_type(),
            vec![
                person("Alice", "Paris", 34),
                person("bob", "paris", 27),
                person("Carol", "Berlin", 41),
                person("dave", "PARIS", 19),
                person("Eve", "Berlin", 27),
            ],
        )
        .unwrap();
    provider
}

fn names(rows: &[Record]) -> Vec<String> {
    rows.iter()
        .map(|r| r.get("name").and_then(Value::as_str).unwrap().to_string())
        .collect()
}

fn fields_equal(query: &Query<Record>) -> Query<Record> {
    query
        .filter(|item| {
            Ok(item
                .clone()
                .member("string1")?
                .eq(item.member("string2")?))
        })
        .unwrap()
}

// ========== Case-insensitive interception ==========

#[test]
fn test_field_equality_one_match_without_interception() {
    let provider = things_provider();
    let query = fields_equal(&provider.query::<Record>("things").unwrap());
    assert_eq!(query.to_vec().unwrap().len(), 1);
}

#[test]
fn test_field_equality_two_matches_with_interception() {
    let provider = things_provider();
    let query = provider
        .query::<Record>("things")
        .unwrap()
        .case_insensitive()
        .unwrap();
    let query = fields_equal(&query);
    assert_eq!(query.to_vec().unwrap().len(), 2);
}

#[test]
fn test_intercept_after_filter() {
    let provider = things_provider();
    let filtered = fields_equal(&provider.query::<Record>("things").unwrap());
    let intercepted = filtered.case_insensitive().unwrap();

    assert_eq!(filtered.count().unwrap(), 1);
    assert_eq!(intercepted.count().unwrap(), 2);
}

#[test]
fn test_non_string_and_not_equal_are_unaffected() {
    let provider = people_provider();
    let plain = provider.query::<Record>("people").unwrap();
    let intercepted = plain.case_insensitive().unwrap();

    for query in [&plain, &intercepted] {
        let by_age = query
            .filter(|p| Ok(p.member("age")?.eq(lit(27i64))))
            .unwrap();
        assert_eq!(names(&by_age.to_vec().unwrap()), vec!["bob", "Eve"]);

        let not_paris = query
            .filter(|p| Ok(p.member("city")?.not_eq(lit("paris"))))
            .unwrap();
        assert_eq!(not_paris.count().unwrap(), 4);
    }
}

#[test]
fn test_field_against_constant() {
    let provider = people_provider();
    let query = provider
        .query::<Record>("people")
        .unwrap()
        .case_insensitive()
        .unwrap()
        .filter(|p| Ok(p.member("city")?.eq(lit("Paris"))))
        .unwrap();
    assert_eq!(names(&query.to_vec().unwrap()), vec!["Alice", "bob", "dave"]);
}

// ========== Deferred execution ==========

#[test]
fn test_double_enumeration_rewrites_each_time() {
    let provider = things_provider();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counting = FnRewriter::new("counting", move |expr| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(expr)
    });

    let rewriters: Vec<Arc<dyn ExprRewriter>> =
        vec![Arc::new(counting), Arc::new(CaseInsensitiveEquality)];
    let query = fields_equal(
        &provider
            .query::<Record>("things")
            .unwrap()
            .intercept(rewriters)
            .unwrap(),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let first = query.to_vec().unwrap();
    let second = query.to_vec().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_iterators_are_independent() {
    let provider = people_provider();
    let query = provider.query::<Record>("people").unwrap();
    let mut a = query.iter().unwrap();
    let mut b = query.iter().unwrap();
    a.next();
    a.next();
    let first_b = b.next().unwrap().unwrap();
    assert_eq!(first_b.get("name"), Some(&Value::from("Alice")));
    assert_eq!(a.count(), 3);
}

// ========== Runtime-typed construction ==========

#[test]
fn test_create_query_with_runtime_element_type() {
    let provider = people_provider();
    let dynamic: Arc<dyn QueryProvider> = provider;

    // The element type is only known from the expression itself.
    let expression = Expr::source("people", DataType::Record(person_type()));
    let query = Arc::clone(&dynamic).create_query(expression).unwrap();
    assert_eq!(query.element_type(), &DataType::Record(person_type()));
    assert_eq!(query.to_vec().unwrap().len(), 5);

    let names = query.select(|p| p.member("name")).unwrap();
    assert_eq!(names.element_type(), &DataType::String);
    let names: Vec<String> = names.typed::<String>().unwrap().to_vec().unwrap();
    assert_eq!(names.len(), 5);
}

#[test]
fn test_intercepted_create_query_keeps_wrapper() {
    let provider = things_provider();
    let root = provider.query::<Record>("things").unwrap();
    let intercepted = InterceptingProvider::from_config(&root, &RewriteConfig::default()).unwrap();

    let expression = fields_equal(&root).expression().clone();
    let query = Arc::clone(intercepted.provider())
        .create_query(expression)
        .unwrap();
    assert_eq!(query.provider().name(), "intercepting");
    assert_eq!(query.count().unwrap(), 2);
}

#[test]
fn test_execute_as_scalar() {
    let provider = people_provider();
    let query = provider.query::<Record>("people").unwrap();
    let count_expr = Expr::call(recast_expr::Method::Count, vec![query.expression().clone()])
        .unwrap();
    let count: i64 = execute_as(provider.as_ref(), &count_expr).unwrap();
    assert_eq!(count, 5);
}

// ========== Chained composition ==========

#[test]
fn test_chained_composition_under_interception() {
    let provider = people_provider();
    let query = provider
        .query::<Record>("people")
        .unwrap()
        .case_insensitive()
        .unwrap()
        .filter(|p| Ok(p.member("city")?.eq(lit("paris"))))
        .unwrap()
        .order_by_descending(|p| p.member("age"))
        .unwrap()
        .skip(1)
        .unwrap()
        .take(1)
        .unwrap();
    assert_eq!(names(&query.to_vec().unwrap()), vec!["bob"]);

    let projected = query
        .select_as::<String, _>(|p| p.member("name"))
        .unwrap();
    assert_eq!(projected.to_vec().unwrap(), vec!["bob".to_string()]);
}

#[test]
fn test_order_by_then_by() {
    let provider = people_provider();
    let query = provider
        .query::<Record>("people")
        .unwrap()
        .order_by(|p| p.member("age"))
        .unwrap()
        .then_by_descending(|p| p.member("name"))
        .unwrap();
    assert_eq!(
        names(&query.to_vec().unwrap()),
        vec!["dave", "bob", "Eve", "Alice", "Carol"]
    );
}

#[test]
fn test_order_by_member_and_page() {
    let provider = people_provider();
    let cache = MemberCache::new();
    let query = provider
        .query::<Record>("people")
        .unwrap()
        .order_by_member(&cache, "name", false)
        .unwrap();

    // Ordinal: uppercase names sort before lowercase ones
    assert_eq!(names(&query.page(2, 1).unwrap().to_vec().unwrap()), vec!["Alice", "Carol"]);
    assert_eq!(names(&query.page(2, 3).unwrap().to_vec().unwrap()), vec!["dave"]);
    assert_eq!(names(&query.page(2, -4).unwrap().to_vec().unwrap()), vec!["Alice", "Carol"]);
}

#[test]
fn test_terminals() {
    let provider = people_provider();
    let query = provider
        .query::<Record>("people")
        .unwrap()
        .case_insensitive()
        .unwrap();

    assert_eq!(query.count().unwrap(), 5);
    assert_eq!(
        query
            .count_where(|p| Ok(p.member("city")?.eq(lit("BERLIN"))))
            .unwrap(),
        2
    );
    assert!(query.any_where(|p| Ok(p.member("name")?.eq(lit("EVE")))).unwrap());
    assert!(!query.any_where(|p| Ok(p.member("age")?.gt(lit(90i64)))).unwrap());
    assert_eq!(
        query.first().unwrap().get("name"),
        Some(&Value::from("Alice"))
    );

    let empty = query
        .filter(|p| Ok(p.member("age")?.lt(lit(0i64))))
        .unwrap();
    assert!(!empty.any().unwrap());
    let err = empty.first().unwrap_err();
    assert_eq!(err.to_string(), "ExecutionError: sequence contains no elements");
}

#[test]
fn test_negative_skip_and_take() {
    let provider = people_provider();
    let query = provider.query::<Record>("people").unwrap();
    assert_eq!(query.skip(-3).unwrap().count().unwrap(), 5);
    assert_eq!(query.take(-3).unwrap().count().unwrap(), 0);
}

// ========== Errors ==========

#[test]
fn test_engine_errors_pass_through_unchanged() {
    let provider = things_provider();
    let dynamic: Arc<dyn QueryProvider> = provider;
    let orphan = Arc::clone(&dynamic)
        .create_query(Expr::source("missing", DataType::String))
        .unwrap();

    let direct = orphan.to_vec().unwrap_err();
    let intercepted = orphan.case_insensitive().unwrap().to_vec().unwrap_err();

    assert!(matches!(intercepted, RecastError::SourceNotFound(_)));
    assert_eq!(direct.to_string(), intercepted.to_string());
}

#[test]
fn test_unknown_member_fails_at_construction() {
    let provider = things_provider();
    let cache = MemberCache::new();
    let query = provider.query::<Record>("things").unwrap();

    let err = query.order_by_member(&cache, "string3", false).unwrap_err();
    assert!(matches!(err, RecastError::MemberNotFound(_)));
    assert!(err.is_construction_error());
}

#[test]
fn test_unknown_source() {
    let provider = things_provider();
    let err = provider.query::<Record>("nothing").unwrap_err();
    assert!(matches!(err, RecastError::SourceNotFound(_)));
}

#[test]
fn test_element_type_mismatch_fails_at_construction() {
    let provider = things_provider();
    let err = provider.query::<String>("things").unwrap_err();
    assert!(matches!(err, RecastError::TypeError(_)));
}

#[test]
fn test_invalid_rows_are_rejected() {
    let provider = MemoryProvider::new();
    let bad = Record::new("Thing").with("string1", "a").with("string2", 3i64);
    let err = provider
        .register_source("things", thing_type(), vec![bad])
        .unwrap_err();
    assert!(matches!(err, RecastError::TypeError(_)));
    assert!(provider.source_names().is_empty());
}

#[test]
fn test_sort_buffer_limit() {
    let provider = MemoryProvider::with_config(ExecutionConfig {
        max_buffered_rows: Some(3),
    });
    provider
        .register_values(
            "numbers",
            DataType::Int64,
            (1..=5).map(Value::Int64).collect(),
        )
        .unwrap();

    let query = provider.query::<i64>("numbers").unwrap();
    assert_eq!(query.take(3).unwrap().order_by(Ok).unwrap().to_vec().unwrap(), vec![1, 2, 3]);

    let err = query.order_by(Ok).unwrap().to_vec().unwrap_err();
    assert!(err.to_string().contains("ResourceExhausted"));
}

// ========== Rewrite chain ordering ==========

#[test]
fn test_chain_applies_rewriters_in_order() {
    let provider = MemoryProvider::new();
    provider
        .register_values(
            "words",
            DataType::String,
            vec![Value::from("ab"), Value::from("ba"), Value::from("b")],
        )
        .unwrap();

    // Replace the first string literal, then the result of that replacement.
    let swap = |from: &'static str, to: &'static str| {
        FnRewriter::new(format!("{from}->{to}"), move |expr| {
            replace_literal(expr, from, to)
        })
    };

    let query = provider
        .query::<String>("words")
        .unwrap()
        .filter(|w| Ok(w.eq(lit("a"))))
        .unwrap();

    let forward = RewriteChain::default()
        .with_rule(swap("a", "ab"))
        .with_rule(swap("ab", "ba"));
    let rows = InterceptingProvider::intercept_with_chain(&query, forward)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec!["ba".to_string()]);

    let backward = RewriteChain::default()
        .with_rule(swap("ab", "ba"))
        .with_rule(swap("a", "ab"));
    let rows = InterceptingProvider::intercept_with_chain(&query, backward)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec!["ab".to_string()]);
}

fn replace_literal(
    expr: Expr,
    from: &str,
    to: &str,
) -> common_error::RecastResult<Expr> {
    match expr {
        Expr::Constant(Value::String(s)) if s == from => Ok(lit(to)),
        other => other.map_children(|child| replace_literal(child, from, to)),
    }
}

#[test]
fn test_deserialized_queries() {
    let provider = things_provider();
    let filtered = fields_equal(&provider.query::<Record>("things").unwrap());
    let json = serde_json::to_string(filtered.expression()).unwrap();

    let expression: Expr = serde_json::from_str(&json).unwrap();
    let rows: Vec<_> = provider.execute_query(&expression).unwrap().collect();
    assert_eq!(rows.len(), 1);

    let things = Expr::source("things", DataType::Record(thing_type()));
    let source = serde_json::to_value(things).unwrap();
    let truncated = serde_json::json!({ "Call": { "method": "Where", "args": [source] } });
    let err = serde_json::from_value::<Expr>(truncated).unwrap_err();
    assert!(err.to_string().contains("Where expects 2 arguments"), "{err}");
}

// ========== Properties ==========

fn compiled_equality(rewritten: bool) -> recast_engine::CompiledLambda {
    let s1 = param("s1", DataType::String);
    let s2 = param("s2", DataType::String);
    let params: Vec<ParameterExpr> = vec![
        s1.as_parameter().unwrap().clone(),
        s2.as_parameter().unwrap().clone(),
    ];
    let lambda = Expr::lambda(params, s1.eq(s2));
    let lambda = if rewritten {
        CaseInsensitiveEquality.rewrite(lambda).unwrap().expr
    } else {
        lambda
    };
    compile_lambda(&lambda).unwrap()
}

#[test]
fn test_compiled_equality_before_and_after() {
    let args = [Value::from("s1"), Value::from("S1")];
    assert!(!compiled_equality(false).test(&args).unwrap());
    assert!(compiled_equality(true).test(&args).unwrap());
}

/// Character-by-character ignore-case equality over `[a-zA-Z0-9ßİı]`.
fn ignore_case_by_table(a: &str, b: &str) -> bool {
    fn upper(c: char) -> char {
        match c {
            'a'..='z' => c.to_ascii_uppercase(),
            'ı' => 'I',
            other => other,
        }
    }
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| upper(x) == upper(y))
}

#[test]
fn test_rewritten_equality_does_not_expand_case() {
    let compiled = compiled_equality(true);
    for (a, b) in [("ß", "SS"), ("straße", "STRASSE"), ("ﬁle", "FILE"), ("s1", "s1 ")] {
        let args = [Value::from(a), Value::from(b)];
        assert!(!compiled.test(&args).unwrap(), "{a:?} should not equal {b:?}");
    }
    let args = [Value::from("straße"), Value::from("STRAßE")];
    assert!(compiled.test(&args).unwrap());
}

proptest! {
    #[test]
    fn prop_rewritten_equality_ignores_case(a in "[a-zA-Z0-9ßİı]{0,8}", b in "[a-zA-Z0-9ßİı]{0,8}") {
        let expected = ignore_case_by_table(&a, &b);
        let args = [Value::from(a.as_str()), Value::from(b.as_str())];
        prop_assert_eq!(compiled_equality(true).test(&args).unwrap(), expected);
    }

    #[test]
    fn prop_case_variants_match_after_rewrite(a in "[a-zA-Z]{0,12}") {
        let args = [Value::from(a.to_lowercase()), Value::from(a.to_uppercase())];
        prop_assert!(compiled_equality(true).test(&args).unwrap());
    }

    #[test]
    fn prop_unrewritten_equality_is_ordinal(a in "[a-zA-Z]{0,8}", b in "[a-zA-Z]{0,8}") {
        let args = [Value::from(a.as_str()), Value::from(b.as_str())];
        prop_assert_eq!(compiled_equality(false).test(&args).unwrap(), a == b);
    }

    #[test]
    fn prop_integer_equality_is_unaffected(a in any::<i64>(), b in any::<i64>()) {
        let x = param("x", DataType::Int64);
        let y = param("y", DataType::Int64);
        let lambda = Expr::lambda(
            vec![x.as_parameter().unwrap().clone(), y.as_parameter().unwrap().clone()],
            x.eq(y),
        );
        let rewritten = CaseInsensitiveEquality.rewrite(lambda.clone()).unwrap();
        prop_assert!(!rewritten.changed);
        let compiled = compile_lambda(&rewritten.expr).unwrap();
        prop_assert_eq!(compiled.test(&[Value::Int64(a), Value::Int64(b)]).unwrap(), a == b);
    }
}
