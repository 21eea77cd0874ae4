use indoc::indoc;

use super::*;
use crate::lexer::tokenize;
use crate::parser::parse_tokens;
use crate::token::Span;

struct Run {
    env: EnvStack,
    output: String,
    result: Result<Completion, ScriptError>,
}

fn run(source: &str) -> Run {
    let types = TypeRegistry::with_builtins();
    let tokens = tokenize(source).expect("tokenize failed");
    let program = parse_tokens(tokens).expect("parse failed");
    let mut env = EnvStack::new();
    let mut output = Vec::new();
    let result = Interpreter::new(&types, &mut output).run(&program, &mut env);
    Run {
        env,
        output: String::from_utf8(output).expect("utf8 output"),
        result,
    }
}

fn run_ok(source: &str) -> Run {
    let run = run(source);
    if let Err(error) = &run.result {
        panic!("unexpected error: {error}");
    }
    run
}

fn runtime_error(source: &str) -> (RuntimeError, Option<Span>) {
    match run(source).result {
        Err(ScriptError::Runtime { error, span }) => (error, span),
        other => panic!("expected runtime error, got {other:?}"),
    }
}

fn number(run: &Run, name: &str) -> f64 {
    run.env
        .get(name)
        .expect("variable should exist")
        .as_number()
        .expect("variable should be a number")
}

#[test]
fn while_loop_counts_down() {
    let run = run_ok("var a = 0; var b = 5; while (b > 0) { b -= 1; a += 1; }");
    assert_eq!(number(&run, "a"), 5.0);
    assert_eq!(number(&run, "b"), 0.0);
}

#[test]
fn array_append_accepts_any_value() {
    let run = run_ok(r#"var arr = { 1 }; arr += "asd"; arr += 1000; arr += 0; var x = arr[1];"#);
    let x = run.env.get("x").expect("x");
    assert_eq!(x.as_string().as_deref(), Some("asd"));
    assert_eq!(run.env.get("arr").expect("arr").to_output(), "{1, asd, 1000, 0}");
}

#[test]
fn function_parameters_do_not_leak() {
    let run = run_ok("function sum(a, b) { return a + b; } var n = sum(5, 7);");
    assert_eq!(number(&run, "n"), 12.0);
    assert!(!run.env.has("a"));
    assert!(!run.env.has("b"));
}

#[test]
fn break_leaves_infinite_loop() {
    let run = run_ok("var a = 0; while (true) { a += 1; if (a == 100) { break; } }");
    assert_eq!(number(&run, "a"), 100.0);
    assert_eq!(run.env.depth(), 1);
}

#[test]
fn block_locals_disappear_on_every_exit_path() {
    let run = run_ok(indoc! {r#"
        { var inner = 1; }
        while (true) { var looped = 1; break; }
        for (var i = 0; i < 3; i++) { var body = i; continue; }
        function f() { { var hidden = 1; return hidden; } }
        var r = f();
    "#});
    for name in ["inner", "looped", "i", "body", "hidden"] {
        assert!(!run.env.has(name), "{name} leaked");
    }
    assert_eq!(number(&run, "r"), 1.0);
    assert_eq!(run.env.depth(), 1);
}

#[test]
fn functions_cannot_see_caller_locals() {
    let run = run_ok(indoc! {r#"
        var a = 100;
        function sum(a, b) { return a + b; }
        var total = 0;
        {
            var a = 1;
            var b = 2;
            total = sum(10, 20);
        }
    "#});
    assert_eq!(number(&run, "total"), 30.0);

    let (error, span) = runtime_error(indoc! {r#"
        function peek() { return local; }
        { var local = 1; peek(); }
    "#});
    assert_eq!(
        error,
        RuntimeError::UndefinedVariable {
            name: "local".to_string()
        }
    );
    assert_eq!(span, Some(Span::new(1, 19)));
}

#[test]
fn functions_see_globals() {
    let run = run_ok(indoc! {r#"
        var scale = 3;
        function scaled(x) { return x * scale; }
        var y = scaled(4);
    "#});
    assert_eq!(number(&run, "y"), 12.0);
}

#[test]
fn redeclaration_and_shadowing() {
    let (error, span) = runtime_error("var x = 1;\nvar x = 2;");
    assert_eq!(
        error,
        RuntimeError::Redeclaration {
            kind: "variable",
            name: "x".to_string()
        }
    );
    assert_eq!(span, Some(Span::new(2, 1)));

    let run = run_ok("var x = 1; { var x = 2; x = 5; }");
    assert_eq!(number(&run, "x"), 1.0);
}

#[test]
fn loops_may_redeclare_per_iteration() {
    let run = run_ok(indoc! {r#"
        var total = 0;
        var n = 0;
        while (n < 3) { var step = n * 2; total += step; n++; }
    "#});
    assert_eq!(number(&run, "total"), 6.0);
}

#[test]
fn for_loop_runs_update_after_continue() {
    let run = run_ok(indoc! {r#"
        var odd = 0;
        for (var i = 0; i < 10; i++) {
            if (i % 2 == 0) { continue; }
            odd += 1;
        }
    "#});
    assert_eq!(number(&run, "odd"), 5.0);
}

#[test]
fn exit_stops_everything_and_carries_value() {
    let run = run_ok(indoc! {r#"
        function stop(code) { while (true) { exit code; } }
        print("start");
        stop(7);
        print("unreachable");
    "#});
    assert_eq!(run.output, "start\n");
    let Ok(Completion::Exited(value)) = &run.result else {
        panic!("expected exit");
    };
    assert_eq!(value.as_number(), Some(7.0));
    assert_eq!(run.env.depth(), 1);
}

#[test]
fn exit_codes_stay_within_process_range() {
    let code = |source: &str| {
        run_ok(source)
            .result
            .map(|completion| completion.exit_code())
            .expect("completion")
    };
    assert_eq!(code("var x = 1;"), 0);
    assert_eq!(code("exit 42;"), 42);
    assert_eq!(code("exit \"done\";"), 0);
    assert_eq!(code("exit -1;"), 255);
    assert_eq!(code("exit 256;"), 255);
    assert_eq!(code("exit 2.5;"), 255);
}

#[test]
fn if_runs_first_true_branch_then_else() {
    let run = run_ok(indoc! {r#"
        for (var i = 0; i < 3; i++) {
            if (i == 0) {
                print("zero");
            } elif (i == 1) {
                print("one");
            } elif (i == 1) {
                print("shadowed");
            } else {
                print("other");
            }
        }
    "#});
    assert_eq!(run.output, "zero\none\nother\n");
}

#[test]
fn branch_locals_disappear_after_if() {
    let run = run_ok(indoc! {r#"
        var n = 1;
        if (n == 0) {
            var picked = "zero";
        } elif (n == 1) {
            var picked = "one";
            print("%s", picked);
        } else {
            var picked = "other";
        }
        var picked = 2;
    "#});
    assert_eq!(run.output, "one\n");
    assert_eq!(number(&run, "picked"), 2.0);

    let (error, span) = runtime_error(indoc! {r#"
        if (false) { } elif (true) { var inner = 1; } else { }
        print("%d", inner);
    "#});
    assert_eq!(
        error,
        RuntimeError::UndefinedVariable {
            name: "inner".to_string()
        }
    );
    assert_eq!(span, Some(Span::new(2, 1)));
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let (error, _) = runtime_error("function f(n) { return f(n + 1); } f(0);");
    assert_eq!(
        error,
        RuntimeError::StackOverflow {
            limit: MAX_CALL_DEPTH
        }
    );
    let run = run_ok(indoc! {r#"
        function depth(n) { if (n == 0) { return 0; } return depth(n - 1) + 1; }
        var reached = depth(100);
        var again = depth(100);
    "#});
    assert_eq!(number(&run, "reached"), 100.0);
    assert_eq!(number(&run, "again"), 100.0);
}

#[test]
fn bare_return_and_fall_through_yield_none() {
    let run = run_ok(indoc! {r#"
        function nothing() { }
        function early() { return; }
        var a = nothing();
        var b = early();
    "#});
    assert!(run.env.get("a").expect("a").is_none());
    assert!(run.env.get("b").expect("b").is_none());
}

#[test]
fn control_signals_outside_their_context_fail() {
    let (error, span) = runtime_error("var x = 1;\nbreak;");
    assert_eq!(error, RuntimeError::BreakOutsideLoop);
    assert_eq!(span, Some(Span::new(2, 1)));

    let (error, _) = runtime_error("if (true) { continue; }");
    assert_eq!(error, RuntimeError::ContinueOutsideLoop);

    let (error, _) = runtime_error("return 1;");
    assert_eq!(error, RuntimeError::ReturnOutsideFunction);

    let (error, span) = runtime_error("function f() { break; }\nwhile (true) { f(); }");
    assert_eq!(error, RuntimeError::BreakOutsideLoop);
    assert_eq!(span, Some(Span::new(1, 16)));
}

#[test]
fn recursion_uses_global_functions() {
    let run = run_ok(indoc! {r#"
        function fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        var f = fib(15);
    "#});
    assert_eq!(number(&run, "f"), 610.0);
}

#[test]
fn arity_is_checked() {
    let (error, _) = runtime_error("function f(a) { return a; } f(1, 2);");
    assert_eq!(
        error,
        RuntimeError::ArityMismatch {
            name: "f".to_string(),
            expected: 1,
            found: 2
        }
    );
}

#[test]
fn arguments_are_copies() {
    let run = run_ok(indoc! {r#"
        var items = { 1, 2 };
        function grow(list) { list.push(3); return list; }
        var grown = grow(items);
        var alias = items;
        alias.push(9);
    "#});
    assert_eq!(run.env.get("items").expect("items").to_output(), "{1, 2}");
    assert_eq!(run.env.get("grown").expect("grown").to_output(), "{1, 2, 3}");
    assert_eq!(run.env.get("alias").expect("alias").to_output(), "{1, 2, 9}");
}

#[test]
fn element_assignment_and_nested_mutation() {
    let run = run_ok(indoc! {r#"
        var grid = { { 0, 0 }, { 0, 0 } };
        grid[1][0] = 5;
        grid[0].push(7);
        grid[1][1] += 2;
    "#});
    assert_eq!(run.env.get("grid").expect("grid").to_output(), "{{0, 0, 7}, {5, 2}}");
}

#[test]
fn assignment_keeps_declared_type() {
    let (error, _) = runtime_error("var n = 1; n = \"one\";");
    assert_eq!(
        error,
        RuntimeError::TypeMismatch {
            expected: "Number".to_string(),
            got: "String".to_string()
        }
    );
    let run = run_ok("var later; later = \"set\";");
    assert_eq!(
        run.env.get("later").expect("later").as_string().as_deref(),
        Some("set")
    );
}

#[test]
fn increments_and_decrements() {
    let run = run_ok(indoc! {r#"
        var i = 5;
        var post = i++;
        var pre = ++i;
        var down = i--;
        --i;
    "#});
    assert_eq!(number(&run, "post"), 5.0);
    assert_eq!(number(&run, "pre"), 7.0);
    assert_eq!(number(&run, "down"), 7.0);
    assert_eq!(number(&run, "i"), 5.0);
}

#[test]
fn logical_operators_short_circuit() {
    let run = run_ok(indoc! {r#"
        var calls = 0;
        function touch() { calls += 1; return true; }
        var a = false && touch();
        var b = true || touch();
        var c = 1 && "text";
        var d = !(0 || "");
    "#});
    assert_eq!(number(&run, "calls"), 0.0);
    for (name, expected) in [("a", false), ("b", true), ("c", true), ("d", true)] {
        let value = run.env.get(name).expect("variable").as_bool();
        assert_eq!(value, Some(expected), "{name}");
    }
}

#[test]
fn print_formats_each_line() {
    let run = run_ok(indoc! {r#"
        var name = "ember";
        print("hello %s", name);
        print("%d items at %f each, paid: %b", 3.9, 2.5, true);
        print("100%%");
        print("%s", { 1, "two", { 3 } });
    "#});
    assert_eq!(
        run.output,
        "hello ember\n3 items at 2.500000 each, paid: true\n100%\n{1, two, {3}}\n"
    );
}

#[test]
fn print_argument_mismatch_is_a_runtime_error() {
    let (error, span) = runtime_error("var a = 1;\nprint(\"%d %d\", a);");
    assert_eq!(error, RuntimeError::MissingFormatArgument { specifier: 'd' });
    assert_eq!(span, Some(Span::new(2, 1)));
}

#[test]
fn members_and_constructors() {
    let run = run_ok(indoc! {r#"
        var s = new String("Hello");
        var upper = s.upper;
        var len = s.length();
        var part = s.substring(1, 4);
        var list = new Array(3, 1, 2);
        list.insert(0, 0);
        var size = list.size;
        var where = list.index_of(2);
        var rounded = (2.6).round;
        var blank = new Number();
    "#});
    assert_eq!(
        run.env.get("upper").expect("upper").as_string().as_deref(),
        Some("HELLO")
    );
    assert_eq!(number(&run, "len"), 5.0);
    assert_eq!(
        run.env.get("part").expect("part").as_string().as_deref(),
        Some("ell")
    );
    assert_eq!(number(&run, "size"), 4.0);
    assert_eq!(number(&run, "where"), 3.0);
    assert_eq!(number(&run, "rounded"), 3.0);
    assert_eq!(number(&run, "blank"), 0.0);
}

#[test]
fn unknown_members_and_operators_name_the_type() {
    let (error, _) = runtime_error("var n = 1; n.push(2);");
    assert_eq!(error.to_string(), "Unknown member 'push' for type Number");
    let (error, _) = runtime_error("var x = true + 1;");
    assert_eq!(
        error.to_string(),
        "Operator '+' is not supported between Boolean and Number"
    );
    let (error, _) = runtime_error("var x = new Widget();");
    assert_eq!(error.to_string(), "Unknown type 'Widget'");
}

#[test]
fn out_of_range_subscripts_fail() {
    let (error, _) = runtime_error("var a = { 1 }; var b = a[3];");
    assert_eq!(error, RuntimeError::IndexOutOfBounds { index: 3, len: 1 });
    let (error, _) = runtime_error("var a = { 1 }; var b = a[-1];");
    assert_eq!(error, RuntimeError::NegativeIndex { index: -1 });
}

#[test]
fn errors_are_located_at_innermost_statement() {
    let (error, span) = runtime_error(indoc! {r#"
        function f() {
            var ok = 1;
            var bad = ok / 0;
        }
        f();
    "#});
    assert_eq!(error, RuntimeError::DivisionByZero);
    assert_eq!(span, Some(Span::new(3, 5)));
}

#[test]
fn equality_compares_across_types_without_error() {
    let run = run_ok(indoc! {r#"
        var same = { 1, { 2 } } == { 1, { 2 } };
        var mixed = 1 == "1";
        var differ = { 1 } != { 1, 2 };
    "#});
    assert_eq!(run.env.get("same").expect("same").as_bool(), Some(true));
    assert_eq!(run.env.get("mixed").expect("mixed").as_bool(), Some(false));
    assert_eq!(run.env.get("differ").expect("differ").as_bool(), Some(true));
}
