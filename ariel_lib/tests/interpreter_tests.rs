use ariel_lib::builtins::Host;
use ariel_lib::environment::Environment;
use ariel_lib::interpreter::Interpreter;
use ariel_lib::run_source;
use ariel_lib::value::Value;
use pretty_assertions::assert_eq;

struct Run {
    output: String,
    result: Option<Value>,
    env: Environment,
}

fn run(source: &str) -> Run {
    let mut out = Vec::new();
    let mut env = Environment::new();
    let result = {
        let mut interpreter = Interpreter::with_host(Host::with_seed(&mut out, 11));
        run_source(source, &mut env, &mut interpreter).expect("program should parse")
    };
    Run {
        output: String::from_utf8(out).expect("output is utf-8"),
        result,
        env,
    }
}

fn output_of(source: &str) -> String {
    run(source).output
}

fn result_of(source: &str) -> Option<Value> {
    run(source).result
}

fn error_of(source: &str) -> String {
    match run(source).result {
        Some(Value::Error(message)) => message,
        other => panic!("expected an error, got {:?}", other),
    }
}

#[test]
fn zero_values() {
    assert_eq!(
        output_of(
            "int i; float f; bool b; string s; char c;
             println(i, \" \", f, \" \", b, \"[\", s, \"][\", c, \"]\");"
        ),
        "0 0.000000 false[][]\n"
    );
}

#[test]
fn integer_arithmetic() {
    assert_eq!(result_of("7 / 2;"), Some(Value::Int(3)));
    assert_eq!(result_of("7 % 2;"), Some(Value::Int(1)));
    assert_eq!(result_of("-7 / 2;"), Some(Value::Int(-3)));
    assert_eq!(result_of("1 << 4 | 1;"), Some(Value::Int(17)));
    assert_eq!(result_of("9223372036854775807 + 1;"), Some(Value::Int(i64::MIN)));
}

#[test]
fn float_division_by_zero() {
    assert_eq!(error_of("1.0 / 0.0;"), "error: divide by zero error");
    assert_eq!(error_of("int z = 0; 5 % z;"), "error: divide by zero error");
}

#[test]
fn mixed_operands_are_rejected() {
    assert_eq!(error_of("1 + 1.0;"), "error: mismatched types: int + float");
    assert_eq!(error_of("true && 1;"), "error: mismatched types: bool && int");
}

#[test]
fn no_short_circuit() {
    let run = run("bool hit() { println(\"evaluated\"); return true; } false && hit();");
    assert_eq!(run.output, "evaluated\n");
    assert_eq!(run.result, Some(Value::Bool(false)));
}

#[test]
fn block_scoping() {
    let run = run("int x = 1; { x = 2; int y = 9; }");
    assert_eq!(run.env.get("x"), Some(&Value::Int(2)));
    assert!(!run.env.contains("y"));
    assert_eq!(error_of("{ int y = 9; } y;"), "error: identifier y undeclared");
}

#[test]
fn for_loop_scope() {
    let run = run("int total; for (int i = 0; i < 5; i += 1) { total += i; }");
    assert_eq!(run.env.get("total"), Some(&Value::Int(10)));
    assert!(!run.env.contains("i"));
}

#[test]
fn while_loop() {
    assert_eq!(
        output_of("int n = 3; while (n > 0) { print(n, \" \"); n -= 1; } println(\"liftoff\");"),
        "3 2 1 liftoff\n"
    );
    assert_eq!(result_of("while (false) { 1; }"), None);
}

#[test]
fn conditions_must_be_boolean() {
    assert_eq!(error_of("if (1) { }"), "error: improper if condition type: int");
    assert_eq!(error_of("while (\"x\") { }"), "error: improper while condition type: string");
    assert_eq!(
        error_of("for (int i = 0; i; i += 1) { }"),
        "error: improper for condition type: int"
    );
}

#[test]
fn if_else() {
    assert_eq!(
        output_of("int x = 5; if (x > 3) println(\"big\"); else println(\"small\");"),
        "big\n"
    );
    assert_eq!(result_of("if (false) { 1; }"), None);
}

#[test]
fn functions_are_isolated() {
    let source = "
        int secret = 42;
        int double(int n) { return n * 2; }
        int peek() { return secret; }
        double(4);
    ";
    assert_eq!(result_of(source), Some(Value::Int(8)));
    assert_eq!(
        error_of("int secret = 42; int peek() { return secret; } peek();"),
        "error: identifier secret undeclared"
    );
}

#[test]
fn sibling_functions_are_visible() {
    let source = "
        int square(int n) { return n * n; }
        int sum_squares(int a, int b) { return square(a) + square(b); }
        sum_squares(3, 4);
    ";
    assert_eq!(result_of(source), Some(Value::Int(25)));
}

#[test]
fn recursion() {
    let source = "
        int fib(int n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        fib(15);
    ";
    assert_eq!(result_of(source), Some(Value::Int(610)));
}

#[test]
fn return_ends_only_the_loop() {
    let source = "
        int find(intarr xs, int target) {
            for (int i = 0; i < 4; i += 1) {
                if (xs[i] == target) { return i; }
            }
            return -1;
        }
        intarr xs = {4, 8, 15, 16};
        println(find(xs, 15), \" \", find(xs, 23));
    ";
    assert_eq!(output_of(source), "-1 -1\n");
    assert_eq!(
        result_of("int f() { while (true) { return 1; } return 2; } f();"),
        Some(Value::Int(2))
    );
    assert_eq!(result_of("while (true) { return 3; } 4;"), Some(Value::Int(4)));
    assert_eq!(result_of("int n; while (n < 5) { n += 1; if (n == 2) { return n; } }"), Some(Value::Int(2)));
}

#[test]
fn return_from_loop_body_discards_its_writes() {
    let source = "
        int f() {
            int x = 0;
            for (int i = 0; i < 1; i += 1) { x = 5; return 1; }
            return x;
        }
        f();
    ";
    assert_eq!(result_of(source), Some(Value::Int(0)));

    let run = run("int x = 0; intarr a[2]; while (true) { x = 7; a[1] = 9; return x; }");
    assert_eq!(run.result, Some(Value::Int(7)));
    assert_eq!(run.env.get("x"), Some(&Value::Int(0)));
    assert_eq!(run.output, "");
}

#[test]
fn large_arrays_fill_in_loops() {
    let source = "
        intarr a[20000];
        for (int i = 0; i < 20000; i += 1) { a[i] = i; }
        a[0] + a[19999];
    ";
    assert_eq!(result_of(source), Some(Value::Int(19999)));
}

#[test]
fn deep_recursion() {
    let source = "
        int down(int n) {
            if (n == 0) { return 0; }
            return down(n - 1);
        }
        down(3000);
    ";
    assert_eq!(result_of(source), Some(Value::Int(0)));
}

#[test]
fn runaway_recursion_is_an_error() {
    let mut out = Vec::new();
    let mut env = Environment::new();
    let mut interpreter = Interpreter::with_host(Host::with_seed(&mut out, 3));

    let failed = run_source(
        "int forever(int n) { return forever(n + 1); } forever(0);",
        &mut env,
        &mut interpreter,
    )
    .unwrap();
    assert_eq!(
        failed,
        Some(Value::Error(format!(
            "error: call depth limit of {} exceeded in forever()",
            ariel_lib::interpreter::MAX_CALL_DEPTH
        )))
    );

    let recovered = run_source(
        "int count(int n) { if (n == 0) { return 0; } return 1 + count(n - 1); } count(100);",
        &mut env,
        &mut interpreter,
    )
    .unwrap();
    assert_eq!(recovered, Some(Value::Int(100)));
}

#[test]
fn functions_replace_same_named_parameters() {
    let source = "
        int twice(int n) { return n * 2; }
        int apply(int twice) { return twice; }
        apply(3);
    ";
    assert!(matches!(result_of(source), Some(Value::Function(_))));
}

#[test]
fn void_functions_yield_nothing() {
    assert_eq!(result_of("void greet() { println(\"hi\"); } greet();"), None);
    assert_eq!(
        error_of("void greet() { } int x = greet();"),
        "error: greet() does not produce a value"
    );
    assert_eq!(result_of("int last() { 1; 2; } last();"), Some(Value::Int(2)));
}

#[test]
fn call_checks() {
    let decl = "int add(int a, int b) { return a + b; } ";
    assert_eq!(
        error_of(&format!("{}add(1, 2, 3);", decl)),
        "error: too many arguments supplied to add()"
    );
    assert_eq!(
        error_of(&format!("{}add(1);", decl)),
        "error: not enough arguments supplied to add()"
    );
    assert_eq!(
        error_of(&format!("{}add(1, \"two\");", decl)),
        "error: mismatched types for argument 2"
    );
    assert_eq!(
        error_of("int first(intarr xs) { return xs[0]; } first(3);"),
        "error: passed non-array as array parameter"
    );
    assert_eq!(
        error_of("int first(intarr xs) { return xs[0]; } floatarr f[2]; first(f);"),
        "error: mismatched types for argument 1"
    );
    assert_eq!(error_of("nothing();"), "error: nothing is not a declared or built-in function");
    assert_eq!(error_of("int x = 1; x();"), "error: x is not a declared or built-in function");
}

#[test]
fn duplicate_declarations() {
    assert_eq!(error_of("int x; float x;"), "error: x already declared");
    assert_eq!(error_of("void f() { } int f;"), "error: f already declared");
}

#[test]
fn declaration_types() {
    assert_eq!(error_of("int x = \"one\";"), "error: mismatched types: int x = string");
    assert_eq!(error_of("double d = 1.0;"), "error: invalid declaration type: double d");
    assert_eq!(error_of("int x[3];"), "error: mismatched types: int x[] sizes a scalar type");
}

#[test]
fn array_declarations() {
    assert_eq!(output_of("intarr a[3]; println(a);"), "{ 0, 0, 0 }\n");
    assert_eq!(output_of("stringarr s = {}; println(s);"), "{}\n");
    assert_eq!(error_of("intarr a = {1, \"2\"};"), "error: heterogeneous array typings: a");
    assert_eq!(error_of("intarr a = {1.5};"), "error: illegal type in int array: float");
    assert_eq!(error_of("intarr a = 4;"), "error: mismatched types: intarr a = int");
    assert_eq!(error_of("intarr a[-1];"), "error: array size must be a non-negative integer: -1");
    assert_eq!(
        error_of("intarr a[\"3\"];"),
        "error: array size must be a non-negative integer: string"
    );
}

#[test]
fn index_bounds() {
    let setup = "intarr a[3]; ";
    assert_eq!(result_of(&format!("{}a[0];", setup)), Some(Value::Int(0)));
    assert_eq!(result_of(&format!("{}a[2];", setup)), Some(Value::Int(0)));
    assert_eq!(
        error_of(&format!("{}a[3];", setup)),
        "error: array index out of bounds: a[3]"
    );
    assert_eq!(
        error_of(&format!("{}a[-1] = 4;", setup)),
        "error: array index out of bounds: a[-1]"
    );
    assert_eq!(error_of(&format!("{}a[true];", setup)), "error: illegal array index: bool");
    assert_eq!(error_of("int n = 1; n[0];"), "error: n is not an array");
    assert_eq!(error_of("missing[0];"), "error: identifier missing undeclared");
}

#[test]
fn index_writes() {
    assert_eq!(
        output_of("intarr a[3]; a[1] = 5; a[2] += 7; a[2] <<= 1; println(a);"),
        "{ 0, 5, 14 }\n"
    );
    assert_eq!(
        error_of("intarr a[3]; a[0] = \"x\";"),
        "error: mismatched types: int[0] = string"
    );
}

#[test]
fn arrays_are_values() {
    let source = "
        intarr a = {1, 2, 3};
        intarr b = a;
        b[0] = 100;
        void bump(intarr xs) { xs[1] = 50; }
        bump(a);
        println(a, \" \", b);
    ";
    assert_eq!(output_of(source), "{ 1, 2, 3 } { 100, 2, 3 }\n");
}

#[test]
fn array_reassignment_keeps_element_type() {
    assert_eq!(output_of("intarr a[2]; a = {7, 8, 9}; println(a);"), "{ 7, 8, 9 }\n");
    assert_eq!(error_of("intarr a[2]; a = {true};"), "error: illegal type in int array: bool");
}

#[test]
fn assignments() {
    assert_eq!(error_of("x = 1;"), "error: identifier x undeclared");
    assert_eq!(error_of("int x; x = 2.5;"), "error: mismatched types: int = float");
    assert_eq!(error_of("bool b; b += true;"), "error: illegal assignment: bool += bool");
    assert_eq!(error_of("int x; x += \"s\";"), "error: mismatched types: int += string");
    assert_eq!(output_of("string s = \"ab\"; s += \"cd\"; println(s);"), "abcd\n");
}

#[test]
fn prefix_operators() {
    assert_eq!(result_of("+(-5);"), Some(Value::Int(5)));
    assert_eq!(result_of("~0;"), Some(Value::Int(-1)));
    assert_eq!(result_of("!true;"), Some(Value::Bool(false)));
    assert_eq!(error_of("!1;"), "error: illegal operation: !int");
    assert_eq!(error_of("-\"s\";"), "error: illegal operation: -string");
}

#[test]
fn strings_and_chars() {
    assert_eq!(result_of("\"abc\" < \"abd\";"), Some(Value::Bool(true)));
    assert_eq!(result_of("'a' + 'b';"), Some(Value::Str("ab".to_string())));
    assert_eq!(error_of("\"a\" - \"b\";"), "error: illegal operator: string - string");
}

#[test]
fn errors_stop_the_program() {
    let run = run("println(\"before\"); 1 / 0; println(\"after\");");
    assert_eq!(run.output, "before\n");
    assert_eq!(run.result, Some(Value::Error("error: divide by zero error".to_string())));
}

#[test]
fn top_level_return() {
    let run = run("println(\"a\"); return 7; println(\"b\");");
    assert_eq!(run.output, "a\n");
    assert_eq!(run.result, Some(Value::Int(7)));
}

#[test]
fn builtins() {
    assert_eq!(output_of("print(1, 2.5, true, 'c', \"s\", {1});"), "12.500000truecs{ 1 }");
    assert_eq!(output_of("println();"), "\n");
    assert_eq!(error_of("rand(1);"), "error: too many arguments supplied to rand()");
    assert_eq!(result_of("rand() >= 0;"), Some(Value::Bool(true)));
    assert_eq!(result_of("println;"), Some(Value::BuiltIn(ariel_lib::builtins::lookup("println").unwrap())));
}

#[test]
fn user_names_shadow_builtins() {
    assert_eq!(output_of("void print(string s) { println(\"<\", s, \">\"); } print(\"x\");"), "<x>\n");
}

#[test]
fn environment_survives_across_programs() {
    let mut out = Vec::new();
    let mut env = Environment::new();
    {
        let mut interpreter = Interpreter::with_host(Host::with_seed(&mut out, 3));
        run_source("int count = 1;", &mut env, &mut interpreter).unwrap();
        run_source("int bump(int n) { return n + 1; }", &mut env, &mut interpreter).unwrap();
        run_source("count = bump(count);", &mut env, &mut interpreter).unwrap();
        let result = run_source("count;", &mut env, &mut interpreter).unwrap();
        assert_eq!(result, Some(Value::Int(2)));

        let failed = run_source("int count;", &mut env, &mut interpreter).unwrap();
        assert_eq!(failed, Some(Value::Error("error: count already declared".to_string())));
    }
    assert_eq!(env.get("count"), Some(&Value::Int(2)));
}

#[test]
fn failed_block_leaves_session_untouched() {
    let mut out = Vec::new();
    let mut env = Environment::new();
    {
        let mut interpreter = Interpreter::with_host(Host::with_seed(&mut out, 3));
        run_source("int n = 1; intarr a[2];", &mut env, &mut interpreter).unwrap();
        let failed = run_source("{ n = 2; a[0] = 4; { n = 3; } 1 / 0; }", &mut env, &mut interpreter).unwrap();
        assert_eq!(failed, Some(Value::Error("error: divide by zero error".to_string())));
    }
    assert_eq!(env.get("n"), Some(&Value::Int(1)));
    assert_eq!(env.get("a").map(ToString::to_string), Some("{ 0, 0 }".to_string()));
}

#[test]
fn front_end_errors_are_not_values() {
    let mut out = Vec::new();
    let mut env = Environment::new();
    let mut interpreter = Interpreter::new(&mut out);
    assert!(run_source("int x = $;", &mut env, &mut interpreter).is_err());
    assert!(run_source("int x = ;", &mut env, &mut interpreter).is_err());
}
