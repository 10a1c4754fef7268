//! Property-based tests: integer semantics match wrapping `i64` arithmetic,
//! pure expressions are idempotent, and array bounds are exact.

use ariel_lib::builtins::Host;
use ariel_lib::environment::Environment;
use ariel_lib::interpreter::Interpreter;
use ariel_lib::run_source;
use ariel_lib::value::Value;
use proptest::prelude::*;

// Literals are non-negative in the grammar; the range keeps `-n` parseable.
fn operand() -> impl Strategy<Value = i64> {
    -1_000_000_000_000i64..1_000_000_000_000i64
}

fn eval_with(source: &str, env: &mut Environment) -> Option<Value> {
    let mut out = Vec::new();
    let mut interpreter = Interpreter::with_host(Host::with_seed(&mut out, 5));
    run_source(source, env, &mut interpreter).expect("generated source parses")
}

fn eval(source: &str) -> Option<Value> {
    eval_with(source, &mut Environment::new())
}

fn binary(a: i64, op: &str, b: i64) -> Option<Value> {
    eval(&format!("int a = {}; int b = {}; a {} b;", a, b, op))
}

proptest! {
    #[test]
    fn add_sub_mul_wrap(a in operand(), b in operand()) {
        prop_assert_eq!(binary(a, "+", b), Some(Value::Int(a.wrapping_add(b))));
        prop_assert_eq!(binary(a, "-", b), Some(Value::Int(a.wrapping_sub(b))));
        prop_assert_eq!(binary(a, "*", b), Some(Value::Int(a.wrapping_mul(b))));
    }

    #[test]
    fn division_truncates(a in operand(), b in operand()) {
        if b == 0 {
            prop_assert!(matches!(binary(a, "/", b), Some(Value::Error(_))));
            prop_assert!(matches!(binary(a, "%", b), Some(Value::Error(_))));
        } else {
            prop_assert_eq!(binary(a, "/", b), Some(Value::Int(a / b)));
            prop_assert_eq!(binary(a, "%", b), Some(Value::Int(a % b)));
        }
    }

    #[test]
    fn comparisons_agree(a in operand(), b in operand()) {
        prop_assert_eq!(binary(a, "<", b), Some(Value::Bool(a < b)));
        prop_assert_eq!(binary(a, ">=", b), Some(Value::Bool(a >= b)));
        prop_assert_eq!(binary(a, "==", b), Some(Value::Bool(a == b)));
    }

    #[test]
    fn pure_expressions_are_idempotent(a in operand(), b in operand(), c in 0i64..64) {
        let mut env = Environment::new();
        eval_with(&format!("int a = {}; int b = {}; int c = {};", a, b, c), &mut env);
        let before = env.clone();

        let expression = "(a * b + (a ^ c)) << c >= b - a;";
        let first = eval_with(expression, &mut env);
        let second = eval_with(expression, &mut env);

        prop_assert_eq!(first, second);
        prop_assert_eq!(env, before);
    }

    #[test]
    fn index_bounds_are_exact(size in 0i64..16, index in -4i64..20) {
        let source = if index < 0 {
            format!("intarr xs[{}]; xs[-{}];", size, -index)
        } else {
            format!("intarr xs[{}]; xs[{}];", size, index)
        };
        let result = eval(&source);

        if (0..size).contains(&index) {
            prop_assert_eq!(result, Some(Value::Int(0)));
        } else {
            prop_assert_eq!(
                result,
                Some(Value::Error(format!("error: array index out of bounds: xs[{}]", index)))
            );
        }
    }
}
