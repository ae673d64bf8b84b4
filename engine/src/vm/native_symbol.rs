//! Symbol — ES6+ unique identifiers.
//!
//! Backed by `JsValue::Symbol(u32)`, an opaque id into the Vm's symbol
//! description table (see `Vm::new_symbol`). Well-known symbols
//! (Symbol.iterator, Symbol.toPrimitive, etc.) are created once at
//! startup and exposed as ordinary properties on the constructor.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use crate::value::*;
use super::{Vm, native_fn};

/// `Symbol(description)` — creates a unique symbol value. `new Symbol()`
/// is a TypeError in real JS; this constructor doesn't special-case `new`
/// the way the other built-in constructors here don't either.
pub fn ctor_symbol(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let desc = args.first().map(|v| v.to_js_string()).unwrap_or_default();
    vm.new_symbol(desc)
}

/// `Symbol.for(key)` — returns the shared symbol registered under `key`,
/// creating it on first use. The registry lives as a hidden global object
/// so it survives across calls without adding a dedicated `Vm` field.
pub fn symbol_for(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let key = args.first().map(|v| v.to_js_string()).unwrap_or_default();
    let registry = registry(vm);

    let existing = registry.borrow().get(&key);
    if let JsValue::Symbol(_) = existing {
        return existing;
    }

    let sym = vm.new_symbol(key.clone());
    registry.borrow_mut().set(key, sym.clone());
    sym
}

/// `Symbol.keyFor(sym)` — reverse lookup of `Symbol.for`. Returns
/// `undefined` for symbols that were never registered.
pub fn symbol_key_for(vm: &mut Vm, args: &[JsValue]) -> JsValue {
    let sym = match args.first() {
        Some(JsValue::Symbol(id)) => *id,
        _ => return JsValue::Undefined,
    };
    let registry = registry(vm);
    let reg = registry.borrow();
    for (key, prop) in reg.properties.iter() {
        if let JsValue::Symbol(id) = &prop.value {
            if *id == sym {
                return JsValue::String(key.clone());
            }
        }
    }
    JsValue::Undefined
}

fn registry(vm: &mut Vm) -> Rc<RefCell<JsObject>> {
    if let JsValue::Object(obj) = vm.globals.get("__symbol_registry__") {
        return obj;
    }
    let reg = Rc::new(RefCell::new(JsObject::new()));
    vm.globals.set_hidden(String::from("__symbol_registry__"), JsValue::Object(reg.clone()));
    reg
}

/// Install well-known symbols on the Symbol constructor object. Each is
/// a real `JsValue::Symbol`, created once, so `===` comparisons and use
/// as property keys behave like any other symbol.
pub fn install_well_known_symbols(vm: &mut Vm, symbol_ctor: &JsValue) {
    for name in [
        "iterator",
        "toPrimitive",
        "toStringTag",
        "hasInstance",
        "isConcatSpreadable",
        "species",
        "match",
        "replace",
        "search",
        "split",
        "unscopables",
        "asyncIterator",
    ] {
        let mut desc = String::from("Symbol.");
        desc.push_str(name);
        let sym = vm.new_symbol(desc);
        symbol_ctor.set_property(String::from(name), sym);
    }

    symbol_ctor.set_property(String::from("for"), native_fn("for", symbol_for));
    symbol_ctor.set_property(String::from("keyFor"), native_fn("keyFor", symbol_key_for));
}
