//! Iterator handling for for-of / for-in loops.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::value::*;
use super::Vm;

impl Vm {
    /// Create an iterator object from a value.
    /// Stores __items__ (array) and __index__ (number) on an internal object.
    pub fn create_iterator(&self, val: &JsValue) -> JsValue {
        let items: Vec<JsValue> = match val {
            JsValue::Array(arr) => {
                arr.borrow().elements.clone()
            }
            JsValue::String(s) => {
                s.chars().map(|c| {
                    let mut cs = String::new();
                    cs.push(c);
                    JsValue::String(cs)
                }).collect()
            }
            JsValue::Object(obj) => {
                obj.borrow().keys().into_iter().map(JsValue::String).collect()
            }
            _ => Vec::new(),
        };

        let mut iter_obj = JsObject::with_tag("__iterator__");
        iter_obj.set(
            String::from("__items__"),
            JsValue::Array(Rc::new(RefCell::new(JsArray::from_vec(items)))),
        );
        iter_obj.set(String::from("__index__"), JsValue::Number(0.0));
        iter_obj.set(String::from("__current__"), JsValue::Undefined);
        JsValue::Object(Rc::new(RefCell::new(iter_obj)))
    }

    /// Advance the iterator sitting on top of the stack, without popping
    /// it. Stores the produced value on the iterator object (read back
    /// by `iter_current_value`) and returns whether iteration is done.
    /// `Op::IterNext`/`Op::IterValue` form a two-op protocol so the
    /// compiler can branch on `done` before deciding whether to load the
    /// value at all.
    pub fn iter_advance(&mut self) -> bool {
        let iter = match self.stack.last() {
            Some(v) => v.clone(),
            None => return true,
        };

        match &iter {
            JsValue::Object(obj) => {
                let mut o = obj.borrow_mut();
                let index = match o.properties.get("__index__") {
                    Some(p) => p.value.to_number() as usize,
                    None => return true,
                };
                let items_val = match o.properties.get("__items__") {
                    Some(p) => p.value.clone(),
                    None => return true,
                };
                match &items_val {
                    JsValue::Array(arr) => {
                        let a = arr.borrow();
                        if index < a.elements.len() {
                            let val = a.elements[index].clone();
                            drop(a);
                            o.set(String::from("__index__"), JsValue::Number((index + 1) as f64));
                            o.set(String::from("__current__"), val);
                            false
                        } else {
                            true
                        }
                    }
                    _ => true,
                }
            }
            _ => true,
        }
    }

    /// Read back the value `iter_advance` last produced, without
    /// advancing the iterator further.
    pub fn iter_current_value(&self) -> JsValue {
        match self.stack.last() {
            Some(JsValue::Object(obj)) => obj.borrow().get("__current__"),
            _ => JsValue::Undefined,
        }
    }
}
