//! Promise — executor runs synchronously (per spec), but every reaction
//! (`.then`/`.catch`/`.finally` callback) is scheduled on the VM's FIFO
//! microtask queue rather than invoked inline, so promise chains settle
//! in the same relative order as `queueMicrotask` calls interleaved with
//! them.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::value::*;
use super::{Vm, native_fn};

// ═══════════════════════════════════════════════════════════
// Promise constructor
// ═══════════════════════════════════════════════════════════

fn new_pending_promise() -> JsValue {
    let mut obj = JsObject::new();
    obj.internal_tag = Some(String::from("__promise__"));
    obj.set(String::from("__state"), JsValue::String(String::from("pending")));
    obj.set(String::from("__value"), JsValue::Undefined);
    obj.set(String::from("__then_cbs"), JsValue::new_array(Vec::new()));
    obj.set(String::from("__catch_cbs"), JsValue::new_array(Vec::new()));
    obj.set(String::from("then"), native_fn("then", promise_then));
    obj.set(String::from("catch"), native_fn("catch", promise_catch));
    obj.set(String::from("finally"), native_fn("finally", promise_finally));
    JsValue::Object(Rc::new(RefCell::new(obj)))
}

/// `new Promise(executor)` — creates a Promise and runs executor synchronously.
pub fn ctor_promise(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let executor = args.first().cloned().unwrap_or(JsValue::Undefined);
    let promise = new_pending_promise();

    if executor.is_function() {
        let promise_clone = promise.clone();
        let resolve = make_settler(vm, promise_clone.clone(), "fulfilled");
        let reject = make_settler(vm, promise_clone, "rejected");
        vm.call_value(&executor, &[resolve, reject], JsValue::Undefined);
    }

    promise
}

/// Build a one-shot native resolver/rejecter closed over its promise via
/// a hidden property on the function object (no true Rust closures over
/// `JsValue` are possible across the native-fn-pointer boundary).
fn make_settler(_vm: &mut Vm, promise: JsValue, state: &'static str) -> JsValue {
    let f = native_fn("", if state == "fulfilled" { settle_fulfilled } else { settle_rejected });
    f.set_property(String::from("__settle_target"), promise);
    f
}

fn settle_fulfilled(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let target = vm.current_this.get_property("__settle_target");
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    settle_promise(vm, &target, "fulfilled", &value);
    JsValue::Undefined
}

fn settle_rejected(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let target = vm.current_this.get_property("__settle_target");
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    settle_promise(vm, &target, "rejected", &value);
    JsValue::Undefined
}

fn settle_promise(vm: &mut Vm, promise: &JsValue, state: &str, value: &JsValue) {
    if let JsValue::Object(obj) = promise {
        {
            let mut o = obj.borrow_mut();
            let current_state = o.get("__state").to_js_string();
            if current_state != "pending" { return; }
            o.set(String::from("__state"), JsValue::String(String::from(state)));
            o.set(String::from("__value"), value.clone());
        }

        let cb_key = if state == "fulfilled" { "__then_cbs" } else { "__catch_cbs" };
        let cbs = {
            let o = obj.borrow();
            o.get(cb_key)
        };
        if let JsValue::Array(arr) = cbs {
            let callbacks = arr.borrow().elements.clone();
            for cb in &callbacks {
                vm.enqueue_microtask(cb.clone(), alloc::vec![value.clone()]);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Promise.prototype methods
// ═══════════════════════════════════════════════════════════

pub fn promise_then(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let on_fulfilled = args.first().cloned().unwrap_or(JsValue::Undefined);
    let on_rejected = args.get(1).cloned().unwrap_or(JsValue::Undefined);
    let promise = vm.current_this.clone();

    if let JsValue::Object(obj) = &promise {
        let (state, value) = {
            let o = obj.borrow();
            (o.get("__state").to_js_string(), o.get("__value"))
        };

        let new_promise = new_pending_promise();
        let resolve_new = make_settler(vm, new_promise.clone(), "fulfilled");
        let reject_new = make_settler(vm, new_promise.clone(), "rejected");

        let reaction = make_reaction(on_fulfilled.clone(), on_rejected.clone(), resolve_new, reject_new);

        match state.as_str() {
            "fulfilled" => vm.enqueue_microtask(reaction_for(&reaction, true), alloc::vec![value]),
            "rejected" => vm.enqueue_microtask(reaction_for(&reaction, false), alloc::vec![value]),
            _ => {
                let o = obj.borrow();
                if let JsValue::Array(arr) = o.get("__then_cbs") {
                    arr.borrow_mut().push(reaction_for(&reaction, true));
                }
                if let JsValue::Array(arr) = o.get("__catch_cbs") {
                    arr.borrow_mut().push(reaction_for(&reaction, false));
                }
            }
        }

        return new_promise;
    }

    JsValue::Undefined
}

/// Bundle the two user callbacks with the settlers for the chained
/// promise into one object so a single native trampoline can run
/// whichever side actually fires and propagate its result/rejection.
fn make_reaction(on_fulfilled: JsValue, on_rejected: JsValue, resolve_new: JsValue, reject_new: JsValue) -> JsValue {
    let obj = JsValue::new_object();
    obj.set_property(String::from("onFulfilled"), on_fulfilled);
    obj.set_property(String::from("onRejected"), on_rejected);
    obj.set_property(String::from("resolve"), resolve_new);
    obj.set_property(String::from("reject"), reject_new);
    obj
}

fn reaction_for(reaction: &JsValue, fulfilled: bool) -> JsValue {
    let f = native_fn("", if fulfilled { run_fulfilled_reaction } else { run_rejected_reaction });
    f.set_property(String::from("__reaction"), reaction.clone());
    f
}

fn run_fulfilled_reaction(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    run_reaction(vm, args, true)
}

fn run_rejected_reaction(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    run_reaction(vm, args, false)
}

fn run_reaction(vm: &mut Vm, args: &[JsValue], fulfilled: bool) -> JsValue {
    let reaction = vm.current_this.get_property("__reaction");
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    let handler = reaction.get_property(if fulfilled { "onFulfilled" } else { "onRejected" });
    let resolve = reaction.get_property("resolve");
    let reject = reaction.get_property("reject");

    if handler.is_function() {
        let result = vm.call_value(&handler, &[value], JsValue::Undefined);
        if vm.take_pending_exception().is_some() {
            vm.call_value(&reject, &[JsValue::Undefined], JsValue::Undefined);
        } else {
            vm.call_value(&resolve, &[result], JsValue::Undefined);
        }
    } else if fulfilled {
        vm.call_value(&resolve, &[value], JsValue::Undefined);
    } else {
        vm.call_value(&reject, &[value], JsValue::Undefined);
    }
    JsValue::Undefined
}

pub fn promise_catch(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let on_rejected = args.first().cloned().unwrap_or(JsValue::Undefined);
    promise_then(vm, &[JsValue::Undefined, on_rejected])
}

pub fn promise_finally(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let on_finally = args.first().cloned().unwrap_or(JsValue::Undefined);
    if on_finally.is_function() {
        vm.enqueue_microtask(on_finally, Vec::new());
    }
    vm.current_this.clone()
}

// ═══════════════════════════════════════════════════════════
// Promise static methods
// ═══════════════════════════════════════════════════════════

pub fn promise_resolve(_vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    if let JsValue::Object(obj) = &value {
        if obj.borrow().internal_tag.as_deref() == Some("__promise__") {
            return value;
        }
    }
    let promise = new_pending_promise();
    if let JsValue::Object(obj) = &promise {
        obj.borrow_mut().set(String::from("__state"), JsValue::String(String::from("fulfilled")));
        obj.borrow_mut().set(String::from("__value"), value);
    }
    promise
}

pub fn promise_reject(_vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    let promise = new_pending_promise();
    if let JsValue::Object(obj) = &promise {
        obj.borrow_mut().set(String::from("__state"), JsValue::String(String::from("rejected")));
        obj.borrow_mut().set(String::from("__value"), value);
    }
    promise
}

pub fn promise_all(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let iterable = args.first().cloned().unwrap_or(JsValue::Undefined);
    let promises = match &iterable {
        JsValue::Array(arr) => arr.borrow().elements.clone(),
        _ => Vec::new(),
    };

    let mut results = Vec::with_capacity(promises.len());
    for p in &promises {
        if let JsValue::Object(obj) = p {
            let o = obj.borrow();
            if o.internal_tag.as_deref() == Some("__promise__") {
                let state = o.get("__state").to_js_string();
                if state == "rejected" {
                    let value = o.get("__value");
                    drop(o);
                    return promise_reject(vm, &[value]);
                }
                results.push(o.get("__value"));
                continue;
            }
        }
        results.push(p.clone());
    }
    promise_resolve(vm, &[JsValue::new_array(results)])
}

pub fn promise_all_settled(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let iterable = args.first().cloned().unwrap_or(JsValue::Undefined);
    let promises = match &iterable {
        JsValue::Array(arr) => arr.borrow().elements.clone(),
        _ => Vec::new(),
    };

    let mut results = Vec::with_capacity(promises.len());
    for p in &promises {
        let entry = JsValue::new_object();
        if let JsValue::Object(obj) = p {
            let o = obj.borrow();
            if o.internal_tag.as_deref() == Some("__promise__") {
                let state = o.get("__state").to_js_string();
                entry.set_property(String::from("status"), JsValue::String(state.clone()));
                if state == "fulfilled" {
                    entry.set_property(String::from("value"), o.get("__value"));
                } else {
                    entry.set_property(String::from("reason"), o.get("__value"));
                }
                results.push(entry);
                continue;
            }
        }
        entry.set_property(String::from("status"), JsValue::String(String::from("fulfilled")));
        entry.set_property(String::from("value"), p.clone());
        results.push(entry);
    }
    promise_resolve(vm, &[JsValue::new_array(results)])
}

pub fn promise_race(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let iterable = args.first().cloned().unwrap_or(JsValue::Undefined);
    let promises = match &iterable {
        JsValue::Array(arr) => arr.borrow().elements.clone(),
        _ => Vec::new(),
    };
    for p in &promises {
        if let JsValue::Object(obj) = p {
            let o = obj.borrow();
            if o.internal_tag.as_deref() == Some("__promise__") {
                let state = o.get("__state").to_js_string();
                if state == "fulfilled" {
                    let val = o.get("__value");
                    drop(o);
                    return promise_resolve(vm, &[val]);
                } else if state == "rejected" {
                    let val = o.get("__value");
                    drop(o);
                    return promise_reject(vm, &[val]);
                }
            }
        }
    }
    promise_resolve(vm, &[JsValue::Undefined])
}
