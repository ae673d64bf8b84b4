//! JavaScript virtual machine — executes bytecode.
//!
//! Stack-based VM with prototype chain support, closures,
//! reference-semantics (Rc<RefCell>) and ECMAScript-compatible semantics.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use alloc::format;

use core::cell::RefCell;

use crate::bytecode::{Chunk, Constant, Op};
use crate::error::{ErrorKind, JsError};
use crate::value::*;

pub mod call;
pub mod builtins;
pub mod native_array;
pub mod native_string;
pub mod native_object;
pub mod native_number;
pub mod native_function;
pub mod native_console;
pub mod native_error;
pub mod native_globals;
pub mod native_math;
pub mod native_json;
pub mod native_promise;
pub mod native_map;
pub mod native_date;
pub mod native_timer;
pub mod native_proxy;
pub mod native_symbol;
pub mod iter;

// ── Internal structures ──

/// Call frame for function invocations.
pub struct CallFrame {
    pub chunk: Rc<Chunk>,
    pub ip: usize,
    pub stack_base: usize,
    /// Each local lives in its own cell so a closure created inside this
    /// frame can hold the very same binding (`Op::Closure` clones the
    /// `Rc`, not the value) rather than a frozen snapshot.
    pub locals: Vec<Rc<RefCell<JsValue>>>,
    pub upvalue_cells: Vec<Rc<RefCell<JsValue>>>,
    pub this_val: JsValue,
    /// The closure this frame is executing, for `Op::LoadSelf` (a named
    /// function expression referring to itself).
    pub current_fn: JsValue,
    /// Arguments this frame was called with, for `Op::LoadArgsArray`.
    pub args: Vec<JsValue>,
}

/// Exception handler for try-catch.
pub struct TryHandler {
    pub catch_ip: usize,
    pub stack_depth: usize,
    pub frame_depth: usize,
}

// ── The VM ──

/// The JavaScript virtual machine.
pub struct Vm {
    pub stack: Vec<JsValue>,
    pub frames: Vec<CallFrame>,
    pub globals: JsObject,
    pub try_handlers: Vec<TryHandler>,
    pub console_output: Vec<String>,
    pub engine_log: Vec<String>,
    pub object_proto: Rc<RefCell<JsObject>>,
    pub array_proto: Rc<RefCell<JsObject>>,
    pub string_proto: Rc<RefCell<JsObject>>,
    pub function_proto: Rc<RefCell<JsObject>>,
    pub number_proto: Rc<RefCell<JsObject>>,
    pub error_proto: Rc<RefCell<JsObject>>,
    pub boolean_proto: Rc<RefCell<JsObject>>,
    pub step_limit: u64,
    pub steps: u64,
    pub userdata: *mut u8,
    /// Current `this` binding for the active native call.
    pub current_this: JsValue,
    /// `run()` returns once the frame stack unwinds back to this depth
    /// rather than to empty — set by `call_value` so a native builtin can
    /// re-enter the interpreter to run a callback and then resume.
    pub run_target_depth: usize,
    /// Set by `throw_error`/`Op::Throw` when no enclosing `try` block is
    /// found in the current `run()` invocation; surfaced to the embedder
    /// through `Context::hasPendingException`/`getPendingException`.
    pub pending_exception: Option<JsValue>,
    /// FIFO microtask queue: promise reactions and `queueMicrotask`
    /// callbacks, each paired with the arguments to invoke it with.
    pub microtasks: VecDeque<(JsValue, Vec<JsValue>)>,
    /// Descriptions behind each `JsValue::Symbol(id)`, indexed by id.
    pub symbol_descriptions: Vec<String>,
    /// Set by `Context::interrupt` from outside the running script; checked
    /// once per executed instruction so a stuck script can be cancelled.
    pub interrupted: Rc<core::cell::Cell<bool>>,
    /// Values the embedder has rooted with `Context::addRoot`, keeping them
    /// alive independent of the JS-reachable object graph.
    pub roots: Vec<JsValue>,
}

impl Vm {
    pub fn new() -> Self {
        let mut vm = Vm {
            stack: Vec::with_capacity(256),
            frames: Vec::new(),
            globals: JsObject::new(),
            try_handlers: Vec::new(),
            console_output: Vec::new(),
            engine_log: Vec::new(),
            object_proto: Rc::new(RefCell::new(JsObject::new())),
            array_proto: Rc::new(RefCell::new(JsObject::new())),
            string_proto: Rc::new(RefCell::new(JsObject::new())),
            function_proto: Rc::new(RefCell::new(JsObject::new())),
            number_proto: Rc::new(RefCell::new(JsObject::new())),
            error_proto: Rc::new(RefCell::new(JsObject::new())),
            boolean_proto: Rc::new(RefCell::new(JsObject::new())),
            step_limit: 10_000_000,
            steps: 0,
            userdata: core::ptr::null_mut(),
            current_this: JsValue::Undefined,
            run_target_depth: 0,
            pending_exception: None,
            microtasks: VecDeque::new(),
            symbol_descriptions: Vec::new(),
            interrupted: Rc::new(core::cell::Cell::new(false)),
            roots: Vec::new(),
        };
        vm.init_prototypes();
        vm.init_globals();
        vm.log_engine("[jsengine] VM initialized");
        vm
    }

    pub fn set_step_limit(&mut self, limit: u64) {
        self.step_limit = limit;
    }

    pub fn execute(&mut self, chunk: Chunk) -> JsValue {
        self.steps = 0;
        self.run_target_depth = 0;
        let local_count = chunk.local_count as usize;
        let frame = CallFrame {
            chunk: Rc::new(chunk),
            ip: 0,
            stack_base: self.stack.len(),
            locals: (0..local_count).map(|_| Rc::new(RefCell::new(JsValue::Undefined))).collect(),
            upvalue_cells: Vec::new(),
            this_val: JsValue::Undefined,
            current_fn: JsValue::Undefined,
            args: Vec::new(),
        };
        self.frames.push(frame);
        self.run()
    }

    pub fn set_global(&mut self, name: &str, value: JsValue) {
        self.globals.set(String::from(name), value);
    }

    pub fn get_global(&mut self, name: &str) -> JsValue {
        self.globals.get(name)
    }

    pub fn register_native(&mut self, name: &str, func: fn(&mut Vm, &[JsValue]) -> JsValue) {
        self.set_global(name, native_fn(name, func));
    }

    /// Append a diagnostic message to the engine log.
    pub fn log_engine(&mut self, msg: &str) {
        self.engine_log.push(String::from(msg));
    }

    /// Intern a symbol description, returning the `JsValue::Symbol` that
    /// uniquely identifies it.
    pub fn new_symbol(&mut self, description: String) -> JsValue {
        let id = self.symbol_descriptions.len() as u32;
        self.symbol_descriptions.push(description);
        JsValue::Symbol(id)
    }

    pub fn symbol_description(&self, id: u32) -> &str {
        self.symbol_descriptions.get(id as usize).map(|s| s.as_str()).unwrap_or("")
    }

    /// Queue a callback for the FIFO microtask checkpoint that runs after
    /// the current synchronous job (or whenever the embedder calls
    /// `Context::runMicrotasks`).
    pub fn enqueue_microtask(&mut self, callback: JsValue, args: Vec<JsValue>) {
        self.microtasks.push_back((callback, args));
    }

    /// Drain the microtask queue to completion, including microtasks
    /// enqueued by microtasks that ran earlier in the same drain.
    pub fn run_microtasks(&mut self) {
        while let Some((callback, args)) = self.microtasks.pop_front() {
            self.call_value(&callback, &args, JsValue::Undefined);
            if self.pending_exception.is_some() {
                self.log_engine("[jsengine] WARN: unhandled exception in microtask");
                self.pending_exception = None;
            }
        }
    }

    /// Build a JS `Error`-shaped object from an engine error kind and
    /// raise it as if `throw` had executed. Returns the sentinel value
    /// pushed in its place so callers like native functions can
    /// `return self.throw_error(...)` from inside a builtin.
    pub fn throw_error(&mut self, kind: ErrorKind, message: &str) -> JsValue {
        let err_val = self.make_error_value(kind, message);
        if !self.handle_exception(err_val) {
            self.pending_exception = Some(self.make_error_value(kind, message));
        }
        JsValue::Undefined
    }

    pub fn make_error_value(&self, kind: ErrorKind, message: &str) -> JsValue {
        let mut obj = JsObject::new();
        obj.prototype = Some(self.error_proto.clone());
        obj.set(String::from("name"), JsValue::String(String::from(kind.name())));
        obj.set(String::from("message"), JsValue::String(String::from(message)));
        obj.set(String::from("stack"), JsValue::String(format!("{}: {}", kind.name(), message)));
        JsValue::Object(Rc::new(RefCell::new(obj)))
    }

    pub fn throw_js_error(&mut self, err: JsError) -> JsValue {
        self.throw_error(err.kind, &err.message)
    }

    /// Keep `value` alive regardless of whether anything JS-reachable still
    /// references it. Returns the index to hand back to `remove_root`.
    pub fn add_root(&mut self, value: JsValue) -> usize {
        self.roots.push(value);
        self.roots.len() - 1
    }

    /// Release a value rooted with `add_root`. A no-op if `index` is out of
    /// range (already removed, or never valid).
    pub fn remove_root(&mut self, index: usize) {
        if index < self.roots.len() {
            self.roots[index] = JsValue::Undefined;
        }
    }

    pub fn has_pending_exception(&self) -> bool {
        self.pending_exception.is_some()
    }

    pub fn take_pending_exception(&mut self) -> Option<JsValue> {
        self.pending_exception.take()
    }

    // ── Main execution loop ──

    pub fn run(&mut self) -> JsValue {
        loop {
            self.steps += 1;
            if self.steps > self.step_limit {
                let v = self.throw_error(ErrorKind::Interrupted, "execution step limit exceeded");
                return v;
            }
            if self.interrupted.get() {
                self.interrupted.set(false);
                let v = self.throw_error(ErrorKind::Interrupted, "execution interrupted");
                return v;
            }

            if self.frames.len() <= self.run_target_depth {
                return self.stack.pop().unwrap_or(JsValue::Undefined);
            }

            let frame_idx = self.frames.len() - 1;
            let ip = self.frames[frame_idx].ip;
            if ip >= self.frames[frame_idx].chunk.code.len() {
                if self.frames.len() <= self.run_target_depth.max(1) {
                    self.frames.pop();
                    return self.stack.pop().unwrap_or(JsValue::Undefined);
                }
                self.frames.pop();
                continue;
            }

            let op = self.frames[frame_idx].chunk.code[ip].clone();
            self.frames[frame_idx].ip += 1;

            match op {
                // ── Stack operations ──
                Op::LoadConst(idx) => {
                    let val = self.load_constant(frame_idx, idx);
                    self.stack.push(val);
                }
                Op::LoadUndefined => self.stack.push(JsValue::Undefined),
                Op::LoadNull => self.stack.push(JsValue::Null),
                Op::LoadTrue => self.stack.push(JsValue::Bool(true)),
                Op::LoadFalse => self.stack.push(JsValue::Bool(false)),
                Op::Pop => { self.stack.pop(); }
                Op::Dup => {
                    if let Some(val) = self.stack.last().cloned() {
                        self.stack.push(val);
                    }
                }

                // ── Variables ──
                Op::LoadLocal(slot) => {
                    let val = self.frames[frame_idx].locals
                        .get(slot as usize)
                        .map(|cell| cell.borrow().clone())
                        .unwrap_or(JsValue::Undefined);
                    self.stack.push(val);
                }
                Op::StoreLocal(slot) => {
                    let val = self.stack.last().cloned().unwrap_or(JsValue::Undefined);
                    let locals = &mut self.frames[frame_idx].locals;
                    while locals.len() <= slot as usize {
                        locals.push(Rc::new(RefCell::new(JsValue::Undefined)));
                    }
                    *locals[slot as usize].borrow_mut() = val;
                }
                Op::LoadGlobal(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    if !self.globals.has(&name) {
                        let msg = format!("{} is not defined", name);
                        self.throw_error(ErrorKind::Reference, &msg);
                        continue;
                    }
                    let val = self.globals.get(&name);
                    self.stack.push(val);
                }
                Op::StoreGlobal(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let val = self.stack.last().cloned().unwrap_or(JsValue::Undefined);
                    self.globals.set(name, val);
                }
                Op::LoadUpvalue(idx) => {
                    let val = self.frames[frame_idx].upvalue_cells
                        .get(idx as usize)
                        .map(|cell| cell.borrow().clone())
                        .unwrap_or(JsValue::Undefined);
                    self.stack.push(val);
                }
                Op::StoreUpvalue(idx) => {
                    let val = self.stack.last().cloned().unwrap_or(JsValue::Undefined);
                    if let Some(cell) = self.frames[frame_idx].upvalue_cells.get(idx as usize) {
                        *cell.borrow_mut() = val;
                    }
                }

                // ── Arithmetic ──
                Op::Add => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    match self.op_add(&a, &b) {
                        Ok(v) => self.stack.push(v),
                        Err(e) => { self.throw_js_error(e); }
                    }
                }
                Op::Sub => self.binary_arith_op(|a, b| a - b, |a, b| a.wrapping_sub(b)),
                Op::Mul => self.binary_arith_op(|a, b| a * b, |a, b| a.wrapping_mul(b)),
                Op::Div => self.binary_arith_op(|a, b| a / b, |a, b| if b == 0 { 0 } else { a / b }),
                Op::Mod => self.binary_arith_op(|a, b| a % b, |a, b| if b == 0 { 0 } else { a % b }),
                Op::Exp => self.binary_arith_op(native_math::pow_f64, |a, b| {
                    if b < 0 { 0 } else { let mut r = 1i64; for _ in 0..b { r = r.wrapping_mul(a); } r }
                }),
                Op::Neg => {
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let JsValue::BigInt(n) = a {
                        self.stack.push(JsValue::BigInt(-n));
                    } else {
                        self.stack.push(JsValue::Number(-a.to_number()));
                    }
                }
                Op::Pos => {
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Number(a.to_number()));
                }

                // ── Bitwise ──
                Op::BitAnd => self.binary_int_op(|a, b| a & b),
                Op::BitOr  => self.binary_int_op(|a, b| a | b),
                Op::BitXor => self.binary_int_op(|a, b| a ^ b),
                Op::BitNot => {
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Number((!(a.to_number() as i32)) as f64));
                }
                Op::Shl  => self.binary_int_op(|a, b| a << (b & 31)),
                Op::Shr  => self.binary_int_op(|a, b| a >> (b & 31)),
                Op::UShr => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined).to_number() as u32;
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined).to_number() as u32;
                    self.stack.push(JsValue::Number((a >> (b & 31)) as f64));
                }

                // ── Comparison ──
                Op::Eq => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Bool(a.abstract_eq(&b)));
                }
                Op::Ne => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Bool(!a.abstract_eq(&b)));
                }
                Op::StrictEq => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Bool(a.strict_eq(&b)));
                }
                Op::StrictNe => {
                    let b = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Bool(!a.strict_eq(&b)));
                }
                Op::Lt => self.compare_op(|a, b| a < b),
                Op::Le => self.compare_op(|a, b| a <= b),
                Op::Gt => self.compare_op(|a, b| a > b),
                Op::Ge => self.compare_op(|a, b| a >= b),

                // ── Logical ──
                Op::Not => {
                    let a = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::Bool(!a.to_boolean()));
                }

                // ── Control flow ──
                Op::Jump(offset) => {
                    let ip = self.frames[frame_idx].ip as i32 + offset;
                    self.frames[frame_idx].ip = ip as usize;
                }
                Op::JumpIfTrue(offset) => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if val.to_boolean() {
                        let ip = self.frames[frame_idx].ip as i32 + offset;
                        self.frames[frame_idx].ip = ip as usize;
                    }
                }
                Op::JumpIfFalse(offset) => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if !val.to_boolean() {
                        let ip = self.frames[frame_idx].ip as i32 + offset;
                        self.frames[frame_idx].ip = ip as usize;
                    }
                }
                Op::JumpIfNullish(offset) => {
                    let val = self.stack.last().unwrap_or(&JsValue::Undefined).clone();
                    if val.is_nullish() {
                        let ip = self.frames[frame_idx].ip as i32 + offset;
                        self.frames[frame_idx].ip = ip as usize;
                    }
                }

                // ── Functions ──
                Op::Call(argc) => {
                    self.call_function(argc as usize);
                }
                Op::CallOptional(argc) => {
                    let args_start = self.stack.len().saturating_sub(argc as usize);
                    let callee_idx = args_start.saturating_sub(1);
                    if self.stack.get(callee_idx).map(|v| v.is_nullish()).unwrap_or(true) {
                        self.stack.truncate(callee_idx);
                        self.stack.push(JsValue::Undefined);
                    } else {
                        self.call_function(argc as usize);
                    }
                }
                Op::CallMethod(argc) => {
                    self.call_method(argc as usize);
                }
                Op::CallMethodOptional(argc) => {
                    let args_start = self.stack.len().saturating_sub(argc as usize);
                    let method_idx = args_start.saturating_sub(1);
                    if self.stack.get(method_idx).map(|v| v.is_nullish()).unwrap_or(true) {
                        let this_idx = method_idx.saturating_sub(1);
                        self.stack.truncate(this_idx);
                        self.stack.push(JsValue::Undefined);
                    } else {
                        self.call_method(argc as usize);
                    }
                }
                Op::CallSpread => {
                    let args_array = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let args = array_elements(&args_array);
                    let callee = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.current_this = JsValue::Undefined;
                    self.push_call(&callee, &args, JsValue::Undefined);
                }
                Op::CallMethodSpread => {
                    let args_array = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let args = array_elements(&args_array);
                    let callee = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let this_val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.current_this = this_val.clone();
                    self.push_call(&callee, &args, this_val);
                }
                Op::Return => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let frame = self.frames.pop().unwrap();
                    self.stack.truncate(frame.stack_base);
                    self.stack.push(val.clone());
                    if self.frames.len() <= self.run_target_depth {
                        return val;
                    }
                }
                Op::Closure(idx) => {
                    let chunk = match &self.frames[frame_idx].chunk.constants[idx as usize] {
                        Constant::Function(c) => Rc::new((**c).clone()),
                        _ => Rc::new(Chunk::new()),
                    };
                    let upvalue_cells: Vec<Rc<RefCell<JsValue>>> = chunk.upvalues.iter().map(|uv| {
                        if uv.is_local {
                            self.frames[frame_idx].locals
                                .get(uv.index as usize)
                                .cloned()
                                .unwrap_or_else(|| Rc::new(RefCell::new(JsValue::Undefined)))
                        } else {
                            self.frames[frame_idx].upvalue_cells
                                .get(uv.index as usize)
                                .cloned()
                                .unwrap_or_else(|| Rc::new(RefCell::new(JsValue::Undefined)))
                        }
                    }).collect();
                    let func = JsFunction {
                        name: chunk.name.clone(),
                        params: Vec::new(),
                        kind: FnKind::Bytecode(chunk),
                        this_binding: None,
                        upvalues: upvalue_cells,
                        prototype: Some(Rc::new(RefCell::new(JsObject::new()))),
                        own_props: BTreeMap::new(),
                    };
                    self.stack.push(JsValue::Function(Rc::new(RefCell::new(func))));
                }

                // ── Objects and Properties ──
                Op::GetProp => {
                    let key = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.do_get_prop(&obj, &key.to_js_string());
                }
                Op::GetPropOptional => {
                    let key = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if obj.is_nullish() {
                        self.stack.push(JsValue::Undefined);
                    } else {
                        self.do_get_prop(&obj, &key.to_js_string());
                    }
                }
                Op::SetProp => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let key = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.do_set_prop(&obj, key.to_js_string(), val);
                }
                Op::GetPropNamed(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.do_get_prop(&obj, &name);
                }
                Op::GetPropNamedOptional(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if obj.is_nullish() {
                        self.stack.push(JsValue::Undefined);
                    } else {
                        self.do_get_prop(&obj, &name);
                    }
                }
                Op::SetPropNamed(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.do_set_prop(&obj, name, val);
                }
                Op::DefineGetter(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let getter = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let JsValue::Object(o) = &obj {
                        o.borrow_mut().define_getter(name, getter);
                    }
                    self.stack.push(obj);
                }
                Op::DefineSetter(name_idx) => {
                    let name = self.get_const_string(frame_idx, name_idx);
                    let setter = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let JsValue::Object(o) = &obj {
                        o.borrow_mut().define_setter(name, setter);
                    }
                    self.stack.push(obj);
                }
                Op::NewObject => {
                    let obj = JsObject {
                        properties: BTreeMap::new(),
                        accessors: BTreeMap::new(),
                        prototype: Some(self.object_proto.clone()),
                        internal_tag: None,
                        primitive_value: None,
                        set_hook: None,
                        set_hook_data: core::ptr::null_mut(),
                    };
                    self.stack.push(JsValue::Object(Rc::new(RefCell::new(obj))));
                }
                Op::NewArray(count) => {
                    let start = self.stack.len().saturating_sub(count as usize);
                    let elements: Vec<JsValue> = self.stack.drain(start..).collect();
                    let arr = JsArray::from_vec(elements);
                    self.stack.push(JsValue::Array(Rc::new(RefCell::new(arr))));
                }
                Op::ArrayPush => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let Some(JsValue::Array(arr)) = self.stack.last() {
                        arr.borrow_mut().push(val);
                    }
                }
                Op::ObjectSpread => {
                    let source = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let Some(target) = self.stack.last().cloned() {
                        match &source {
                            JsValue::Object(src) => {
                                let keys = src.borrow().keys();
                                for k in keys {
                                    let v = src.borrow().get(&k);
                                    target.set_property(k, v);
                                }
                            }
                            JsValue::Array(src) => {
                                let arr = src.borrow();
                                for (i, v) in arr.elements.iter().enumerate() {
                                    target.set_property(format!("{}", i), v.clone());
                                }
                            }
                            _ => {}
                        }
                    }
                }

                // ── Constructors ──
                Op::New(argc) => {
                    self.new_object(argc as usize);
                }

                // ── Special operators ──
                Op::Typeof => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.stack.push(JsValue::String(String::from(val.type_of())));
                }
                Op::Void => {
                    self.stack.pop();
                    self.stack.push(JsValue::Undefined);
                }
                Op::Delete => {
                    let key = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let success = obj.delete_property(&key.to_js_string());
                    self.stack.push(JsValue::Bool(success));
                }
                Op::InstanceOf => {
                    let right = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let left = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let result = self.instance_of(&left, &right);
                    self.stack.push(JsValue::Bool(result));
                }
                Op::In => {
                    let obj = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let key = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let key_str = key.to_js_string();
                    let result = match &obj {
                        JsValue::Object(o) => o.borrow().has(&key_str),
                        JsValue::Array(a) => {
                            let arr = a.borrow();
                            if let Some(idx) = try_parse_index(&key_str) {
                                idx < arr.elements.len()
                            } else {
                                arr.properties.contains_key(&key_str)
                            }
                        }
                        _ => false,
                    };
                    self.stack.push(JsValue::Bool(result));
                }

                // ── Iteration ──
                Op::GetIterator => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    let iter_obj = self.create_iterator(&val);
                    self.stack.push(iter_obj);
                }
                Op::IterNext => {
                    let done = self.iter_advance();
                    self.stack.push(JsValue::Bool(done));
                }
                Op::IterValue => {
                    let val = self.iter_current_value();
                    self.stack.push(val);
                }

                // ── Exception handling ──
                Op::TryCatch(catch_off, _finally_off) => {
                    let catch_ip = (self.frames[frame_idx].ip as i32 + catch_off) as usize;
                    self.try_handlers.push(TryHandler {
                        catch_ip,
                        stack_depth: self.stack.len(),
                        frame_depth: self.frames.len(),
                    });
                }
                Op::TryEnd => {
                    self.try_handlers.pop();
                }
                Op::Throw => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    self.log_engine(&format!("[jsengine] exception thrown: {:?}", val));
                    if !self.handle_exception(val.clone()) {
                        self.pending_exception = Some(val);
                        return JsValue::Undefined;
                    }
                }

                // ── Inc/Dec ──
                Op::Inc => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let JsValue::BigInt(n) = val {
                        self.stack.push(JsValue::BigInt(n + 1));
                    } else {
                        self.stack.push(JsValue::Number(val.to_number() + 1.0));
                    }
                }
                Op::Dec => {
                    let val = self.stack.pop().unwrap_or(JsValue::Undefined);
                    if let JsValue::BigInt(n) = val {
                        self.stack.push(JsValue::BigInt(n - 1));
                    } else {
                        self.stack.push(JsValue::Number(val.to_number() - 1.0));
                    }
                }

                // ── This / self / arguments ──
                Op::LoadThis => {
                    let this_val = self.frames[frame_idx].this_val.clone();
                    self.stack.push(this_val);
                }
                Op::LoadSelf => {
                    let f = self.frames[frame_idx].current_fn.clone();
                    self.stack.push(f);
                }
                Op::LoadArgsArray(start) => {
                    let args = &self.frames[frame_idx].args;
                    let slice = if (start as usize) < args.len() {
                        args[start as usize..].to_vec()
                    } else {
                        Vec::new()
                    };
                    self.stack.push(JsValue::new_array(slice));
                }

                // ── Spread ──
                Op::Spread => { /* handled by the array-literal / call-site builder */ }

                // ── Generators / async ──
                Op::Yield | Op::Await => {
                    // Suspension points: without a generator/coroutine runtime
                    // the VM treats them as identity — the operand passes
                    // through unchanged and execution continues synchronously.
                    // `await` on a pending promise still resolves correctly
                    // because promise settlement already happens eagerly.
                }

                Op::Debugger | Op::Nop => {}
            }
        }
    }

    // ── Helpers ──

    fn do_get_prop(&mut self, obj: &JsValue, key: &str) {
        if obj.is_nullish() {
            let msg = format!("Cannot read properties of {} (reading '{}')", obj.to_js_string(), key);
            self.throw_error(ErrorKind::Type, &msg);
            return;
        }
        if let JsValue::Object(o) = obj {
            if let Some(accessor) = o.borrow().find_accessor(key) {
                if let Some(getter) = accessor.get {
                    let val = self.call_value(&getter, &[], obj.clone());
                    self.stack.push(val);
                    return;
                }
                self.stack.push(JsValue::Undefined);
                return;
            }
        }
        let val = self.get_property_with_proto(obj, key);
        self.stack.push(val);
    }

    fn do_set_prop(&mut self, obj: &JsValue, key: String, val: JsValue) {
        if let JsValue::Object(o) = obj {
            if let Some(accessor) = o.borrow().find_accessor(&key) {
                if let Some(setter) = accessor.set {
                    self.call_value(&setter, &[val.clone()], obj.clone());
                }
                self.stack.push(val);
                return;
            }
        }
        obj.set_property(key, val.clone());
        self.stack.push(val);
    }

    /// Push a call-site result the way `call_function`/`call_method` do,
    /// used by the `*Spread` ops which collect their arguments into an
    /// array before dispatching.
    fn push_call(&mut self, callee: &JsValue, args: &[JsValue], this_val: JsValue) {
        self.invoke_function(callee, args, this_val);
    }

    pub fn load_constant(&mut self, frame_idx: usize, idx: u16) -> JsValue {
        match &self.frames[frame_idx].chunk.constants[idx as usize] {
            Constant::Number(n) => JsValue::Number(*n),
            Constant::BigInt(n) => JsValue::BigInt(*n),
            Constant::String(s) => JsValue::String(s.clone()),
            Constant::Function(chunk) => {
                let chunk = Rc::new((**chunk).clone());
                let func = JsFunction {
                    name: chunk.name.clone(),
                    params: Vec::new(),
                    kind: FnKind::Bytecode(chunk),
                    this_binding: None,
                    upvalues: Vec::new(),
                    prototype: Some(Rc::new(RefCell::new(JsObject::new()))),
                    own_props: BTreeMap::new(),
                };
                JsValue::Function(Rc::new(RefCell::new(func)))
            }
        }
    }

    pub fn get_const_string(&self, frame_idx: usize, idx: u16) -> String {
        match &self.frames[frame_idx].chunk.constants[idx as usize] {
            Constant::String(s) => s.clone(),
            Constant::Number(n) => format_number(*n),
            Constant::BigInt(n) => format!("{}", n),
            _ => String::new(),
        }
    }

    /// Get property with prototype chain lookup. Does not invoke
    /// accessors — callers that can reach an accessor go through
    /// `do_get_prop` first.
    pub fn get_property_with_proto(&self, val: &JsValue, key: &str) -> JsValue {
        match val {
            JsValue::Object(obj) => {
                let o = obj.borrow();
                if let Some(prop) = o.properties.get(key) {
                    return prop.value.clone();
                }
                if let Some(ref proto) = o.prototype {
                    let proto_rc = proto.clone();
                    drop(o);
                    return get_proto_prop_rc(&proto_rc, key);
                }
                drop(o);
                get_proto_prop_rc(&self.object_proto, key)
            }
            JsValue::Array(arr) => {
                let a = arr.borrow();
                if key == "length" {
                    return JsValue::Number(a.elements.len() as f64);
                }
                if let Some(idx) = try_parse_index(key) {
                    return a.get(idx);
                }
                if let Some(prop) = a.properties.get(key) {
                    return prop.value.clone();
                }
                drop(a);
                get_proto_prop_rc(&self.array_proto, key)
            }
            JsValue::String(s) => {
                if key == "length" {
                    return JsValue::Number(s.chars().count() as f64);
                }
                if let Some(idx) = try_parse_index(key) {
                    if let Some(ch) = s.chars().nth(idx) {
                        let mut buf = String::new();
                        buf.push(ch);
                        return JsValue::String(buf);
                    }
                }
                get_proto_prop_rc(&self.string_proto, key)
            }
            JsValue::Number(_) | JsValue::BigInt(_) => {
                get_proto_prop_rc(&self.number_proto, key)
            }
            JsValue::Bool(_) => {
                get_proto_prop_rc(&self.boolean_proto, key)
            }
            JsValue::Symbol(id) => {
                if key == "description" {
                    return JsValue::String(String::from(self.symbol_description(*id)));
                }
                JsValue::Undefined
            }
            JsValue::Function(f) => {
                let func = f.borrow();
                if key == "name" {
                    return func.name.as_ref()
                        .map(|n| JsValue::String(n.clone()))
                        .unwrap_or(JsValue::String(String::new()));
                }
                if key == "length" {
                    return JsValue::Number(func.params.len() as f64);
                }
                if key == "prototype" {
                    if let Some(ref proto) = func.prototype {
                        return JsValue::Object(proto.clone());
                    }
                    return JsValue::Undefined;
                }
                if let Some(v) = func.own_props.get(key) {
                    return v.clone();
                }
                drop(func);
                get_proto_prop_rc(&self.function_proto, key)
            }
            _ => JsValue::Undefined,
        }
    }

    pub fn op_add(&self, a: &JsValue, b: &JsValue) -> Result<JsValue, JsError> {
        match (a, b) {
            (JsValue::BigInt(x), JsValue::BigInt(y)) => Ok(JsValue::BigInt(x.wrapping_add(*y))),
            (JsValue::BigInt(_), JsValue::Number(_)) | (JsValue::Number(_), JsValue::BigInt(_)) => {
                Err(JsError::type_error("Cannot mix BigInt and other types, use explicit conversions"))
            }
            (JsValue::String(sa), _) => {
                let mut result = sa.clone();
                result.push_str(&b.to_js_string());
                Ok(JsValue::String(result))
            }
            (_, JsValue::String(sb)) => {
                let mut result = a.to_js_string();
                result.push_str(sb);
                Ok(JsValue::String(result))
            }
            _ => Ok(JsValue::Number(a.to_number() + b.to_number())),
        }
    }

    fn binary_arith_op(&mut self, f: fn(f64, f64) -> f64, bigint_f: fn(i64, i64) -> i64) {
        let b = self.stack.pop().unwrap_or(JsValue::Undefined);
        let a = self.stack.pop().unwrap_or(JsValue::Undefined);
        match (&a, &b) {
            (JsValue::BigInt(x), JsValue::BigInt(y)) => {
                self.stack.push(JsValue::BigInt(bigint_f(*x, *y)));
            }
            (JsValue::BigInt(_), _) | (_, JsValue::BigInt(_)) => {
                self.throw_error(ErrorKind::Type, "Cannot mix BigInt and other types, use explicit conversions");
            }
            _ => {
                self.stack.push(JsValue::Number(f(a.to_number(), b.to_number())));
            }
        }
    }

    fn binary_int_op(&mut self, f: fn(i32, i32) -> i32) {
        let b = self.stack.pop().unwrap_or(JsValue::Undefined).to_number() as i32;
        let a = self.stack.pop().unwrap_or(JsValue::Undefined).to_number() as i32;
        self.stack.push(JsValue::Number(f(a, b) as f64));
    }

    fn compare_op(&mut self, f: fn(f64, f64) -> bool) {
        let b = self.stack.pop().unwrap_or(JsValue::Undefined);
        let a = self.stack.pop().unwrap_or(JsValue::Undefined);
        if let (JsValue::String(sa), JsValue::String(sb)) = (&a, &b) {
            let cmp = if *sa < *sb { -1.0 } else if *sa > *sb { 1.0 } else { 0.0 };
            self.stack.push(JsValue::Bool(f(cmp, 0.0)));
        } else {
            self.stack.push(JsValue::Bool(f(a.to_number(), b.to_number())));
        }
    }

    fn handle_exception(&mut self, val: JsValue) -> bool {
        if let Some(handler) = self.try_handlers.pop() {
            self.stack.truncate(handler.stack_depth);
            while self.frames.len() > handler.frame_depth {
                self.frames.pop();
            }
            if let Some(frame) = self.frames.last_mut() {
                frame.ip = handler.catch_ip;
            }
            self.stack.push(val);
            true
        } else {
            self.log_engine("[jsengine] WARN: unhandled exception");
            false
        }
    }
}

// ── Free functions ──

/// Walk prototype chain (free function to avoid borrow conflicts on Vm).
pub fn get_proto_prop_rc(proto: &Rc<RefCell<JsObject>>, key: &str) -> JsValue {
    let p = proto.borrow();
    if let Some(prop) = p.properties.get(key) {
        return prop.value.clone();
    }
    if let Some(ref parent) = p.prototype {
        let parent_clone = parent.clone();
        drop(p);
        return get_proto_prop_rc(&parent_clone, key);
    }
    JsValue::Undefined
}

pub fn try_parse_index(s: &str) -> Option<usize> {
    if s.is_empty() { return None; }
    let mut n: usize = 0;
    for b in s.bytes() {
        if b < b'0' || b > b'9' { return None; }
        n = n.checked_mul(10)?.checked_add((b - b'0') as usize)?;
    }
    Some(n)
}

pub fn array_elements(val: &JsValue) -> Vec<JsValue> {
    match val {
        JsValue::Array(a) => a.borrow().elements.clone(),
        _ => Vec::new(),
    }
}

/// Helper to create a native JsValue::Function.
pub fn native_fn(name: &str, f: fn(&mut Vm, &[JsValue]) -> JsValue) -> JsValue {
    JsValue::Function(Rc::new(RefCell::new(JsFunction {
        name: Some(String::from(name)),
        params: Vec::new(),
        kind: FnKind::Native(f),
        this_binding: None,
        upvalues: Vec::new(),
        prototype: None,
        own_props: BTreeMap::new(),
    })))
}
