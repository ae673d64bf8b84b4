//! Promises, microtask ordering, and ES modules — the embedder-facing
//! surfaces that don't fit the single-`eval()` pattern the earlier levels use.

use jsengine::{Context, ErrorKind, JsValue, Runtime};

fn ctx() -> Context {
    Runtime::new().create_context()
}

// ── promise resolution ────────────────────────────────────────────────────────

#[test]
fn promise_then_runs_after_microtasks_drain() {
    let mut e = ctx();
    e.eval(r#"
        var result = null;
        Promise.resolve(42).then(function(v) { result = v; });
    "#).unwrap();
    assert!(matches!(e.get_global("result"), JsValue::Null));
    e.run_microtasks();
    assert_eq!(e.get_global("result").to_number(), 42.0);
}

#[test]
fn promise_chain_propagates_transformed_value() {
    let mut e = ctx();
    e.eval(r#"
        var result = null;
        Promise.resolve(2)
            .then(function(v) { return v * 10; })
            .then(function(v) { result = v + 1; });
    "#).unwrap();
    e.run_microtasks();
    assert_eq!(e.get_global("result").to_number(), 21.0);
}

#[test]
fn promise_reject_is_caught() {
    let mut e = ctx();
    e.eval(r#"
        var caught = null;
        Promise.reject('bad').catch(function(e) { caught = e; });
    "#).unwrap();
    e.run_microtasks();
    assert_eq!(e.get_global("caught").to_js_string(), "bad");
}

#[test]
fn promise_all_collects_every_value() {
    let mut e = ctx();
    e.eval(r#"
        var result = null;
        Promise.all([Promise.resolve(1), Promise.resolve(2), 3]).then(function(v) { result = v; });
    "#).unwrap();
    e.run_microtasks();
    let result = e.get_global("result");
    assert_eq!(result.get_index(0).to_number(), 1.0);
    assert_eq!(result.get_index(1).to_number(), 2.0);
    assert_eq!(result.get_index(2).to_number(), 3.0);
}

// ── microtask FIFO ordering ───────────────────────────────────────────────────

#[test]
fn enqueued_microtasks_run_in_fifo_order() {
    let mut e = ctx();
    e.eval("var log = [];").unwrap();
    let push = e.eval("(function(x) { log.push(x); })").unwrap();
    e.enqueue_microtask(push.clone(), alloc_vec(&[1.0]));
    e.enqueue_microtask(push.clone(), alloc_vec(&[2.0]));
    e.enqueue_microtask(push, alloc_vec(&[3.0]));
    e.run_microtasks();
    let log = e.get_global("log");
    assert_eq!(log.get_index(0).to_number(), 1.0);
    assert_eq!(log.get_index(1).to_number(), 2.0);
    assert_eq!(log.get_index(2).to_number(), 3.0);
}

#[test]
fn a_microtask_enqueued_during_a_microtask_still_runs_this_drain() {
    let mut e = ctx();
    e.eval(r#"
        var log = [];
        Promise.resolve().then(function() {
            log.push('first');
            Promise.resolve().then(function() { log.push('nested'); });
        });
    "#).unwrap();
    e.run_microtasks();
    let log = e.get_global("log");
    assert_eq!(log.get_property("length").to_number(), 2.0);
    assert_eq!(log.get_index(0).to_js_string(), "first");
    assert_eq!(log.get_index(1).to_js_string(), "nested");
}

fn alloc_vec(nums: &[f64]) -> Vec<JsValue> {
    nums.iter().map(|n| JsValue::Number(*n)).collect()
}

// ── ES modules ────────────────────────────────────────────────────────────────

#[test]
fn eval_module_exposes_named_and_default_exports() {
    let mut e = ctx();
    let ns = e
        .eval_module(
            "export const answer = 42; export function double(x) { return x * 2; } export default 'root';",
            "main.js",
        )
        .unwrap();
    assert_eq!(ns.get_property("answer").to_number(), 42.0);
    assert!(ns.get_property("double").is_function());
    assert_eq!(ns.get_property("default").to_js_string(), "root");
}

#[test]
fn import_across_two_modules_resolves_named_bindings() {
    let mut e = ctx();
    e.set_module_loader(Box::new(|path: &str| match path {
        "main.js" => Some(String::from(
            "import { square } from './math.js'; export const nine = square(3);",
        )),
        "math.js" => Some(String::from("export function square(x) { return x * x; }")),
        _ => None,
    }));
    let ns = e.eval_module("", "main.js").unwrap();
    assert_eq!(ns.get_property("nine").to_number(), 9.0);
}

#[test]
fn missing_module_reports_a_linking_error() {
    let mut e = ctx();
    e.set_module_loader(Box::new(|path: &str| match path {
        "main.js" => Some(String::from("import { thing } from './missing.js';")),
        _ => None,
    }));
    let err = e.eval_module("", "main.js").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ModuleLinking);
}

#[test]
fn dynamic_import_resolves_to_a_settled_promise() {
    let mut e = ctx();
    e.set_module_loader(Box::new(|path: &str| match path {
        "mod.js" => Some(String::from("export const value = 7;")),
        _ => None,
    }));
    let promise = e.dynamic_import("mod.js", "");
    assert_eq!(promise.get_property("__state").to_js_string(), "fulfilled");
    let ns = promise.get_property("__value");
    assert_eq!(ns.get_property("value").to_number(), 7.0);
}

#[test]
fn dynamic_import_of_missing_module_resolves_to_a_rejected_promise() {
    let mut e = ctx();
    e.set_module_loader(Box::new(|_path: &str| None));
    let promise = e.dynamic_import("nope.js", "");
    assert_eq!(promise.get_property("__state").to_js_string(), "rejected");
}

// ── interrupt cancellation ────────────────────────────────────────────────────

#[test]
fn interrupt_stops_a_running_script() {
    let mut e = ctx();
    e.interrupt();
    let err = e.eval("var x = 0; while (true) { x++; }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Interrupted);
}

// ── embedder roots ────────────────────────────────────────────────────────────

#[test]
fn rooted_value_survives_remove_of_a_different_root() {
    let mut e = ctx();
    let kept = e.eval("({ tag: 'kept' })").unwrap();
    let discarded = e.eval("({ tag: 'discarded' })").unwrap();
    let kept_root = e.add_root(kept.clone());
    let discarded_root = e.add_root(discarded);
    e.remove_root(discarded_root);
    assert_eq!(kept.get_property("tag").to_js_string(), "kept");
    let _ = kept_root;
}
