//! ES module loading, linking and evaluation.
//!
//! Three phases per module, matching the host-agnostic module record model:
//! Load (resolve a specifier to source text and parse it), Link (resolve
//! and recursively link every dependency) and Evaluate (run dependencies
//! before self, populate the exported namespace). Every module in the
//! registry shares the engine's single `Vm::globals` object — a module's
//! top-level `var`/`function`/`class` bindings are `StoreGlobal`s like any
//! top-level script, so two unrelated modules declaring the same top-level
//! name will collide. A full environment-record-per-module implementation
//! would thread a distinct lexical scope through `LoadGlobal`/`StoreGlobal`;
//! out of scope here.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use alloc::format;

use crate::ast::{ExportDeclaration, ImportDeclaration, Program, Stmt, StmtKind};
use crate::bytecode::Chunk;
use crate::compiler::Compiler;
use crate::error::{ErrorKind, JsError};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::JsValue;
use crate::vm::{native_promise, Vm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Unlinked,
    Linking,
    Linked,
    Evaluating,
    Evaluated,
}

/// One loaded module: its source, compiled form, dependency specifiers and
/// (once evaluated) its exported bindings.
pub struct ModuleRecord {
    pub specifier: String,
    pub status: ModuleStatus,
    pub program: Program,
    pub chunk: Option<Rc<Chunk>>,
    /// Specifiers this module depends on, in source order: `import`
    /// declarations plus `export ... from` re-exports.
    pub dependencies: Vec<String>,
    pub exports: BTreeMap<String, JsValue>,
}

/// Resolves bare specifiers (anything not starting with `.`, `..` or `/`)
/// to source text. Relative and absolute specifiers are resolved by the
/// registry itself and read through this same callback, keyed by the
/// resolved path, so a single host hook covers both cases.
pub type HostLoader = Box<dyn Fn(&str) -> Option<String>>;

pub struct ModuleRegistry {
    records: BTreeMap<String, ModuleRecord>,
    loader: Option<HostLoader>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry { records: BTreeMap::new(), loader: None }
    }

    pub fn set_loader(&mut self, loader: HostLoader) {
        self.loader = Some(loader);
    }

    /// Seed the registry with `source` as the in-memory body of `specifier`,
    /// falling back to whatever loader was already configured for every
    /// other specifier. This is what lets a one-off `Context::eval_module`
    /// entry point still resolve relative imports through a host loader the
    /// embedder set up earlier, instead of silently replacing it.
    pub fn set_entry_source(&mut self, specifier: &str, source: &str) {
        let specifier = String::from(specifier);
        let source = String::from(source);
        let previous = self.loader.take();
        self.loader = Some(Box::new(move |path: &str| {
            if path == specifier {
                Some(source.clone())
            } else {
                previous.as_ref().and_then(|load| load(path))
            }
        }));
    }

    pub fn get(&self, specifier: &str) -> Option<&ModuleRecord> {
        self.records.get(specifier)
    }

    /// Resolve `specifier` against `referrer` (the specifier of the module
    /// doing the importing, or `""` at the top level) into an absolute
    /// path used as the cache key. Relative specifiers are joined against
    /// the referrer's directory; bare and absolute specifiers pass through
    /// unchanged (the host loader is expected to make sense of them).
    pub fn resolve(&self, specifier: &str, referrer: &str) -> String {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            join_path(referrer, specifier)
        } else {
            String::from(specifier)
        }
    }

    /// Phase 1: fetch source text for `resolved` (via host loader or, for
    /// relative/absolute specifiers, probing `.js`/`.mjs` extensions) and
    /// parse it into a cached, Unlinked `ModuleRecord`. A no-op if the
    /// specifier is already cached.
    pub fn load(&mut self, resolved: &str) -> Result<(), JsError> {
        if self.records.contains_key(resolved) {
            return Ok(());
        }
        let source = self.fetch_source(resolved).ok_or_else(|| {
            JsError::new(ErrorKind::ModuleLinking, format!("module not found: {}", resolved))
        })?;

        let tokens = Lexer::tokenize(&source).map_err(JsError::from)?;
        let program = Parser::new(tokens).parse_module()?;
        let dependencies = module_dependencies(&program, resolved, self);

        self.records.insert(String::from(resolved), ModuleRecord {
            specifier: String::from(resolved),
            status: ModuleStatus::Unlinked,
            program,
            chunk: None,
            dependencies,
            exports: BTreeMap::new(),
        });
        Ok(())
    }

    fn fetch_source(&self, resolved: &str) -> Option<String> {
        if let Some(loader) = &self.loader {
            if let Some(src) = loader(resolved) {
                return Some(src);
            }
        }
        for ext in [".js", ".mjs", ""] {
            let candidate = format!("{}{}", resolved, ext);
            if let Some(loader) = &self.loader {
                if let Some(src) = loader(&candidate) {
                    return Some(src);
                }
            }
        }
        None
    }

    /// Phase 2: recursively load and link every dependency, then compile
    /// this module's own chunk. Tolerant of import cycles — a module whose
    /// status is already `Linking` is skipped rather than re-entered.
    pub fn link(&mut self, resolved: &str) -> Result<(), JsError> {
        let status = match self.records.get(resolved) {
            Some(r) => r.status,
            None => return Err(JsError::new(ErrorKind::ModuleLinking, format!("unknown module: {}", resolved))),
        };
        if status != ModuleStatus::Unlinked {
            return Ok(());
        }
        self.set_status(resolved, ModuleStatus::Linking);

        let deps = self.records.get(resolved).map(|r| r.dependencies.clone()).unwrap_or_default();
        for dep in &deps {
            if let Err(e) = self.load(dep).and_then(|_| self.link(dep)) {
                self.set_status(resolved, ModuleStatus::Unlinked);
                return Err(e);
            }
        }

        let program = match self.records.get(resolved) {
            Some(r) => r.program.clone(),
            None => return Err(JsError::new(ErrorKind::ModuleLinking, format!("unknown module: {}", resolved))),
        };
        let chunk = match Compiler::new().compile(&program) {
            Ok(c) => c,
            Err(e) => {
                self.set_status(resolved, ModuleStatus::Unlinked);
                return Err(e);
            }
        };
        if let Some(r) = self.records.get_mut(resolved) {
            r.chunk = Some(Rc::new(chunk));
            r.status = ModuleStatus::Linked;
        }
        Ok(())
    }

    /// Phase 3: run dependencies (DFS) before this module's own chunk, seed
    /// the imported bindings into `vm.globals`, execute, then populate and
    /// seal this module's namespace. Cycles resolve missing bindings to
    /// `undefined` rather than failing. A pending exception left by the
    /// module's own code surfaces as a `ModuleEvaluationError` and reverts
    /// this module's status back to `Linked`.
    pub fn evaluate(&mut self, resolved: &str, vm: &mut Vm) -> Result<(), JsError> {
        let status = match self.records.get(resolved) {
            Some(r) => r.status,
            None => return Err(JsError::new(ErrorKind::ModuleEvaluation, format!("unknown module: {}", resolved))),
        };
        match status {
            ModuleStatus::Evaluated | ModuleStatus::Evaluating => return Ok(()),
            ModuleStatus::Linked => {}
            _ => return Err(JsError::new(ErrorKind::ModuleEvaluation, format!("module not linked: {}", resolved))),
        }
        self.set_status(resolved, ModuleStatus::Evaluating);

        let deps = self.records.get(resolved).map(|r| r.dependencies.clone()).unwrap_or_default();
        for dep in &deps {
            // A dependency still `Evaluating` here means a cycle; leave it
            // be and let binding installation below fall back to undefined
            // for any name it hasn't exported yet.
            if matches!(self.records.get(dep).map(|r| r.status), Some(ModuleStatus::Linked)) {
                self.evaluate(dep, vm)?;
            }
        }

        self.install_import_bindings(resolved, vm);

        let chunk = self.records.get(resolved).and_then(|r| r.chunk.clone())
            .ok_or_else(|| JsError::new(ErrorKind::ModuleEvaluation, format!("module has no chunk: {}", resolved)))?;
        let result = vm.execute((*chunk).clone());
        if vm.has_pending_exception() {
            let exc = vm.take_pending_exception().unwrap_or(JsValue::Undefined);
            self.set_status(resolved, ModuleStatus::Linked);
            return Err(JsError::new(ErrorKind::ModuleEvaluation, format!(
                "module evaluation failed: {}", exc.to_js_string()
            )));
        }
        let _ = result;

        self.populate_namespace(resolved, vm);
        self.set_status(resolved, ModuleStatus::Evaluated);
        Ok(())
    }

    /// Pull the already-exported names of every import this module declares
    /// into `vm.globals`, since `StmtKind::Import` compiles to a no-op and
    /// expects the bindings to exist before the chunk runs.
    fn install_import_bindings(&self, resolved: &str, vm: &mut Vm) {
        let body = match self.records.get(resolved) {
            Some(r) => r.program.body.clone(),
            None => return,
        };
        for stmt in &body {
            if let StmtKind::Import(decl) = &stmt.kind {
                let dep = self.resolve(&decl.specifier, resolved);
                let exported = self.records.get(&dep).map(|r| r.exports.clone()).unwrap_or_default();
                self.bind_import(decl, &exported, vm);
            }
        }
    }

    fn bind_import(&self, decl: &ImportDeclaration, exported: &BTreeMap<String, JsValue>, vm: &mut Vm) {
        if let Some(default_name) = &decl.default {
            let v = exported.get("default").cloned().unwrap_or(JsValue::Undefined);
            vm.set_global(default_name, v);
        }
        if let Some(ns_name) = &decl.namespace {
            let ns = JsValue::new_object();
            if let JsValue::Object(obj) = &ns {
                for (k, v) in exported.iter() {
                    obj.borrow_mut().set(k.clone(), v.clone());
                }
            }
            vm.set_global(ns_name, ns);
        }
        for spec in &decl.named {
            let v = exported.get(&spec.imported).cloned().unwrap_or(JsValue::Undefined);
            vm.set_global(&spec.local, v);
        }
    }

    /// Snapshot every name this module exports out of `vm.globals` (or, for
    /// re-exports, out of the dependency's own namespace) once the chunk has
    /// finished running.
    fn populate_namespace(&mut self, resolved: &str, vm: &mut Vm) {
        let body = match self.records.get(resolved) {
            Some(r) => r.program.body.clone(),
            None => return,
        };
        let mut exports = BTreeMap::new();
        for stmt in &body {
            if let StmtKind::Export(decl) = &stmt.kind {
                self.collect_export(decl, resolved, vm, &mut exports);
            }
        }
        if let Some(r) = self.records.get_mut(resolved) {
            r.exports = exports;
        }
    }

    fn collect_export(&self, decl: &ExportDeclaration, resolved: &str, vm: &mut Vm, out: &mut BTreeMap<String, JsValue>) {
        match decl {
            ExportDeclaration::Default(_) => {
                out.insert(String::from("default"), vm.get_global("default"));
            }
            ExportDeclaration::Declaration(stmt) => {
                for name in declared_names(stmt) {
                    let v = vm.get_global(&name);
                    out.insert(name, v);
                }
            }
            ExportDeclaration::Named { specifiers, from } => {
                match from {
                    Some(spec) => {
                        let dep = self.resolve(spec, resolved);
                        let dep_exports = self.records.get(&dep).map(|r| r.exports.clone()).unwrap_or_default();
                        for s in specifiers {
                            let v = dep_exports.get(&s.local).cloned().unwrap_or(JsValue::Undefined);
                            out.insert(s.exported.clone(), v);
                        }
                    }
                    None => {
                        for s in specifiers {
                            let v = vm.get_global(&s.local);
                            out.insert(s.exported.clone(), v);
                        }
                    }
                }
            }
            ExportDeclaration::All { from, as_name } => {
                let dep = self.resolve(from, resolved);
                let dep_exports = self.records.get(&dep).map(|r| r.exports.clone()).unwrap_or_default();
                match as_name {
                    Some(name) => {
                        let ns = JsValue::new_object();
                        if let JsValue::Object(obj) = &ns {
                            for (k, v) in dep_exports.iter() {
                                obj.borrow_mut().set(k.clone(), v.clone());
                            }
                        }
                        out.insert(name.clone(), ns);
                    }
                    None => {
                        for (k, v) in dep_exports.iter() {
                            if k != "default" {
                                out.insert(k.clone(), v.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    fn set_status(&mut self, resolved: &str, status: ModuleStatus) {
        if let Some(r) = self.records.get_mut(resolved) {
            r.status = status;
        }
    }

    /// Load, link and evaluate a module graph rooted at `specifier`,
    /// returning its exported namespace as a plain object.
    pub fn import(&mut self, specifier: &str, referrer: &str, vm: &mut Vm) -> Result<JsValue, JsError> {
        let resolved = self.resolve(specifier, referrer);
        self.load(&resolved)?;
        self.link(&resolved)?;
        self.evaluate(&resolved, vm)?;
        let exports = self.records.get(&resolved).map(|r| r.exports.clone()).unwrap_or_default();
        let ns = JsValue::new_object();
        if let JsValue::Object(obj) = &ns {
            for (k, v) in exports {
                obj.borrow_mut().set(k, v);
            }
        }
        Ok(ns)
    }

    /// `import()` dynamic import, exposed through the embedder rather than
    /// as `import(...)` call syntax (the parser has no expression form for
    /// it). The module graph is resolved eagerly; the returned value is
    /// still an already-settled `Promise` so `.then()`-style consumers work
    /// the same as a deferred one would.
    pub fn dynamic_import(&mut self, specifier: &str, referrer: &str, vm: &mut Vm) -> JsValue {
        match self.import(specifier, referrer, vm) {
            Ok(ns) => native_promise::promise_resolve(vm, &[ns]),
            Err(e) => {
                let err_val = vm.make_error_value(e.kind, &e.message);
                native_promise::promise_reject(vm, &[err_val])
            }
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn declared_names(stmt: &Stmt) -> Vec<String> {
    match &stmt.kind {
        StmtKind::FunctionDecl { name, .. } => alloc::vec![name.clone()],
        StmtKind::ClassDecl { name, .. } => alloc::vec![name.clone()],
        StmtKind::VarDecl { decls, .. } => {
            let mut names = Vec::new();
            for d in decls {
                pattern_names(&d.name, &mut names);
            }
            names
        }
        _ => Vec::new(),
    }
}

fn pattern_names(pattern: &crate::ast::Pattern, out: &mut Vec<String>) {
    use crate::ast::Pattern;
    match pattern {
        Pattern::Ident(name) => out.push(name.clone()),
        Pattern::Array(items) => {
            for item in items.iter().flatten() {
                pattern_names(item, out);
            }
        }
        Pattern::Object(props) => {
            for p in props {
                pattern_names(&p.value, out);
            }
        }
        Pattern::Assign(inner, _) => pattern_names(inner, out),
        Pattern::Rest(inner) => pattern_names(inner, out),
    }
}

fn module_dependencies(program: &Program, resolved: &str, registry: &ModuleRegistry) -> Vec<String> {
    let mut deps = Vec::new();
    for stmt in &program.body {
        match &stmt.kind {
            StmtKind::Import(decl) => {
                deps.push(registry.resolve(&decl.specifier, resolved));
            }
            StmtKind::Export(ExportDeclaration::Named { from: Some(spec), .. }) => {
                deps.push(registry.resolve(spec, resolved));
            }
            StmtKind::Export(ExportDeclaration::All { from, .. }) => {
                deps.push(registry.resolve(from, resolved));
            }
            _ => {}
        }
    }
    deps
}

/// Join a relative specifier (`./x`, `../x`) against the directory of
/// `referrer`, collapsing `.`/`..` segments. Pure string manipulation — no
/// filesystem access, since module specifiers need not map onto real paths.
fn join_path(referrer: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = referrer.split('/').collect();
    segments.pop(); // drop the referrer's own file name
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => { segments.pop(); }
            seg => segments.push(seg),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_specifiers_against_referrer_directory() {
        let reg = ModuleRegistry::new();
        assert_eq!(reg.resolve("./util.js", "src/main.js"), "src/util.js");
        assert_eq!(reg.resolve("../lib/a.js", "src/sub/main.js"), "src/lib/a.js");
    }

    #[test]
    fn bare_specifiers_pass_through_for_the_host_loader() {
        let reg = ModuleRegistry::new();
        assert_eq!(reg.resolve("some-package", "src/main.js"), "some-package");
    }

    #[test]
    fn load_link_evaluate_round_trip_without_dependencies() {
        let mut vm = Vm::new();
        let mut reg = ModuleRegistry::new();
        reg.set_loader(Box::new(|path: &str| {
            if path == "main.js" {
                Some(String::from("export const answer = 42;"))
            } else {
                None
            }
        }));
        let ns = reg.import("main.js", "", &mut vm).expect("module graph should resolve");
        if let JsValue::Object(obj) = ns {
            assert_eq!(obj.borrow().get("answer").to_number(), 42.0);
        } else {
            panic!("expected namespace object");
        }
    }

    #[test]
    fn missing_module_reports_module_linking_error() {
        let mut vm = Vm::new();
        let mut reg = ModuleRegistry::new();
        let err = reg.import("missing.js", "", &mut vm).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModuleLinking);
    }
}
