//! Stepping, determinism, state snapshots and appended code

use super::{eval, run_stepwise, s};
use jsstep::{Interpreter, InterpreterConfig, JsError, Value};

fn count_steps(source: &str, config: InterpreterConfig) -> Result<usize, JsError> {
    let mut interp = Interpreter::with_config(source, config)?;
    let mut steps = 0;
    while interp.step()? {
        steps += 1;
    }
    Ok(steps)
}

const PROGRAM: &str = r#"
    function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }
    var parts = [];
    for (var i = 0; i < 8; i++) { parts.push(fib(i)); }
    parts.sort(function (a, b) { return b - a; }).join(' ')
"#;

#[test]
fn test_stepping_matches_running() {
    let expected = eval(PROGRAM);
    assert_eq!(expected, s("13 8 5 3 2 1 1 0"));
    match run_stepwise(PROGRAM) {
        Ok((value, steps)) => {
            assert_eq!(value, expected);
            assert!(steps > 100, "only {} steps", steps);
        }
        Err(e) => panic!("stepping failed: {}", e),
    }
}

#[test]
fn test_step_count_is_deterministic() {
    let first = run_stepwise(PROGRAM).map(|(_, steps)| steps).ok();
    let second = run_stepwise(PROGRAM).map(|(_, steps)| steps).ok();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_finished_interpreter_keeps_returning_false() {
    let mut interp = match Interpreter::new("1 + 1") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    assert!(matches!(interp.run(), Ok(false)));
    assert!(matches!(interp.step(), Ok(false)));
    assert!(matches!(interp.step(), Ok(false)));
    assert_eq!(interp.value(), Value::Number(2.0));
}

#[test]
fn test_empty_program() {
    assert!(matches!(run_stepwise(""), Ok((Value::Undefined, 0))));
}

#[test]
fn test_builtin_helpers_are_coalesced_into_user_steps() {
    let source = "[5, 3, 9, 1, 7, 2].sort().map(function (x) { return x + 1; }).join()";
    let coalesced = count_steps(source, InterpreterConfig::default()).ok();
    let fine = count_steps(
        source,
        InterpreterConfig {
            step_budget: 1,
            ..InterpreterConfig::default()
        },
    )
    .ok();
    match (coalesced, fine) {
        (Some(coalesced), Some(fine)) => assert!(coalesced < fine, "{} vs {}", coalesced, fine),
        other => panic!("stepping failed: {:?}", other),
    }
}

#[test]
fn test_error_surfaces_from_step() {
    let mut interp = match Interpreter::new("var a = 1; undefinedFn(); a = 2;") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    let mut outcome = Ok(true);
    while let Ok(true) = outcome {
        outcome = interp.step();
    }
    match outcome {
        Err(e) => assert!(e.to_string().contains("undefinedFn is not defined")),
        Ok(done) => panic!("expected an error, got Ok({})", done),
    }
    assert!(matches!(interp.step(), Ok(false)));
}

#[test]
fn test_append_code_continues_program() {
    let mut interp = match Interpreter::new("var total = 40;") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    assert!(matches!(interp.run(), Ok(false)));
    assert!(interp.append_code("function add(n) { return total + n; } add(2)").is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), Value::Number(42.0));
}

#[test]
fn test_append_code_syntax_error_leaves_program_intact() {
    let mut interp = match Interpreter::new("var v = 'kept';") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    assert!(matches!(interp.run(), Ok(false)));
    assert!(matches!(interp.append_code("v +"), Err(JsError::SyntaxError { .. })));
    assert!(interp.append_code("v").is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("kept"));
}

#[test]
fn test_state_stack_snapshot_replays_without_rewinding_heap() {
    let mut interp = match Interpreter::new("var log = log || []; log.push(log.length); log.join()") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    let snapshot = interp.get_state_stack();
    assert!(!snapshot.is_empty());

    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("0"));

    interp.set_state_stack(snapshot);
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("0,1"));
}

#[test]
fn test_snapshot_mid_loop_resumes() {
    let mut interp = match Interpreter::new("var n = 0; for (var i = 0; i < 50; i++) { n += i; } n") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    for _ in 0..25 {
        assert!(matches!(interp.step(), Ok(true)));
    }
    let snapshot = interp.get_state_stack();
    assert!(snapshot.len() > 1);

    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), Value::Number(1225.0));

    // The loop variable already reached its bound, so the replay only
    // finishes the iteration it was in
    interp.set_state_stack(snapshot);
    assert!(matches!(interp.run(), Ok(false)));
    assert!(matches!(interp.value(), Value::Number(_)));
}

#[test]
fn test_clearing_the_stack_ends_the_program() {
    let mut interp = match Interpreter::new("for (;;) {}") {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    };
    for _ in 0..10 {
        assert!(matches!(interp.step(), Ok(true)));
    }
    interp.set_state_stack(Vec::new());
    assert!(matches!(interp.step(), Ok(false)));
}
