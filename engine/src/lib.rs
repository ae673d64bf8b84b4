//! jsengine — an embeddable JavaScript engine.
//!
//! A complete ECMAScript-compatible JavaScript engine with:
//! - Lexer/tokenizer
//! - Recursive descent parser (full ES2020+ syntax)
//! - AST (Abstract Syntax Tree) representation
//! - Bytecode compiler (AST → opcodes) with a binary dump/load format
//! - Stack-based virtual machine with prototype chains, closures and a
//!   FIFO microtask queue
//! - Built-in objects: Object, Array, String, Number, Boolean, Math, JSON,
//!   Map, Set, Date, Promise, Proxy, Symbol, console
//! - An ES module loader (`Load` → `Link` → `Evaluate`)
//!
//! # Usage
//! ```rust
//! use jsengine::Runtime;
//!
//! let runtime = Runtime::new();
//! let mut cx = runtime.create_context();
//! let result = cx.eval("1 + 2").unwrap();
//! assert_eq!(result.to_number(), 3.0);
//! ```

#![no_std]

extern crate alloc;

pub mod atom;
pub mod ast;
pub mod buffer;
pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod token;
pub mod unicode;
pub mod value;
pub mod vm;

use alloc::string::String;
use alloc::vec::Vec;

pub use atom::AtomTable;
pub use bytecode::Chunk;
pub use error::{ErrorKind, JsError};
pub use module::ModuleRegistry;
pub use value::JsValue;
pub use vm::Vm;

/// Compiled JavaScript, ready to hand to a `Context` or serialize for an
/// AOT-compiled artifact (the `jsengine-cli qjsc` tool's output format).
#[derive(Debug, Clone)]
pub struct Bytecode(pub Chunk);

impl Bytecode {
    /// Serialize to the `JSC1` binary format. The embedded atom table is
    /// freshly built and empty — property/global names already live in the
    /// chunk's own constant pool, so the pool only matters for format
    /// fidelity on round trip (see `Chunk::dump`'s doc comment).
    pub fn dump(&self) -> Vec<u8> {
        self.0.dump(&AtomTable::new())
    }

    pub fn load(bytes: &[u8]) -> Option<Bytecode> {
        Chunk::load(bytes).map(Bytecode)
    }
}

/// Factory for `Context`s. Each `Context` owns an independent VM; nothing
/// is currently shared between contexts created from the same `Runtime`,
/// but it is the seam an embedder compiles against so a future shared-heap
/// implementation doesn't change call sites.
pub struct Runtime;

impl Runtime {
    pub fn new() -> Self {
        Runtime
    }

    pub fn create_context(&self) -> Context {
        Context::new()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// One JavaScript execution context: a VM plus its module registry.
pub struct Context {
    vm: Vm,
    modules: ModuleRegistry,
}

impl Context {
    pub fn new() -> Self {
        Context { vm: Vm::new(), modules: ModuleRegistry::new() }
    }

    /// Install the callback used to resolve bare and relative module
    /// specifiers to source text (see `module::HostLoader`).
    pub fn set_module_loader(&mut self, loader: module::HostLoader) {
        self.modules.set_loader(loader);
    }

    /// Compile `source` as a script without executing it.
    pub fn compile(&mut self, source: &str) -> Result<Bytecode, JsError> {
        let tokens = lexer::Lexer::tokenize(source).map_err(JsError::from)?;
        let program = parser::Parser::new(tokens).parse_program()?;
        let chunk = compiler::Compiler::new().compile(&program)?;
        Ok(Bytecode(chunk))
    }

    /// Run previously compiled bytecode.
    pub fn execute(&mut self, bytecode: &Bytecode) -> JsValue {
        self.vm.execute(bytecode.0.clone())
    }

    /// Compile and run `source` as a script, surfacing both compile-time
    /// syntax errors and uncaught runtime exceptions as a `JsError`.
    pub fn eval(&mut self, source: &str) -> Result<JsValue, JsError> {
        let bytecode = self.compile(source)?;
        let result = self.execute(&bytecode);
        self.check_pending_exception(result)
    }

    /// Load, link and evaluate `source` as an ES module and return its
    /// exported namespace. `specifier` names the module for diagnostics
    /// and as the base relative imports resolve against; pass a loader via
    /// `set_module_loader` to resolve any imports it has.
    pub fn eval_module(&mut self, source: &str, specifier: &str) -> Result<JsValue, JsError> {
        let resolved = String::from(specifier);
        self.modules.set_entry_source(&resolved, source);
        let ns = self.modules.import(&resolved, "", &mut self.vm)?;
        Ok(ns)
    }

    /// `import()` — resolves the module graph for `specifier` (relative to
    /// `referrer`) and returns an already-settled `Promise` wrapping its
    /// namespace, or a rejected one on failure.
    pub fn dynamic_import(&mut self, specifier: &str, referrer: &str) -> JsValue {
        self.modules.dynamic_import(specifier, referrer, &mut self.vm)
    }

    fn check_pending_exception(&mut self, result: JsValue) -> Result<JsValue, JsError> {
        if let Some(exc) = self.vm.take_pending_exception() {
            return Err(exception_to_js_error(&exc));
        }
        Ok(result)
    }

    // ── Globals and native functions ──

    pub fn set_global(&mut self, name: &str, value: JsValue) {
        self.vm.set_global(name, value);
    }

    pub fn get_global(&mut self, name: &str) -> JsValue {
        self.vm.get_global(name)
    }

    pub fn register_native_function(&mut self, name: &str, func: fn(&mut Vm, &[JsValue]) -> JsValue) {
        self.vm.register_native(name, func);
    }

    // ── Microtasks ──

    pub fn enqueue_microtask(&mut self, callback: JsValue, args: Vec<JsValue>) {
        self.vm.enqueue_microtask(callback, args);
    }

    pub fn run_microtasks(&mut self) {
        self.vm.run_microtasks();
    }

    // ── Roots and cancellation ──

    /// Keep `value` alive independent of the JS-reachable object graph
    /// until the matching `remove_root` call.
    pub fn add_root(&mut self, value: JsValue) -> usize {
        self.vm.add_root(value)
    }

    pub fn remove_root(&mut self, index: usize) {
        self.vm.remove_root(index);
    }

    /// Request that the currently running (or next) script stop at the next
    /// instruction boundary with an `Interrupted` exception. Safe to call
    /// from a native callback invoked by the running script itself; this
    /// engine has no threads, so there is no cross-thread signaling here.
    pub fn interrupt(&self) {
        self.vm.interrupted.set(true);
    }

    // ── Pending exception surface ──

    pub fn has_pending_exception(&self) -> bool {
        self.vm.has_pending_exception()
    }

    pub fn get_pending_exception(&mut self) -> Option<JsValue> {
        self.vm.take_pending_exception()
    }

    pub fn clear_pending_exception(&mut self) {
        self.vm.take_pending_exception();
    }

    pub fn throw_error(&mut self, kind: ErrorKind, message: &str) -> JsValue {
        self.vm.throw_error(kind, message)
    }

    // ── Diagnostics ──

    pub fn console_output(&self) -> &[String] {
        &self.vm.console_output
    }

    pub fn clear_console(&mut self) {
        self.vm.console_output.clear();
    }

    pub fn set_step_limit(&mut self, limit: u64) {
        self.vm.set_step_limit(limit);
    }

    /// Access the underlying VM directly for anything not exposed above.
    pub fn vm(&mut self) -> &mut Vm {
        &mut self.vm
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

fn exception_to_js_error(exc: &JsValue) -> JsError {
    if let JsValue::Object(obj) = exc {
        let o = obj.borrow();
        let name = o.get("name").to_js_string();
        let message = o.get("message").to_js_string();
        let kind = ErrorKind::from_name(&name);
        return JsError::new(kind, alloc::format!("{}: {}", name, message));
    }
    JsError::new(ErrorKind::Eval, exc.to_js_string())
}
