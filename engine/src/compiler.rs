//! Compiles JavaScript AST into bytecode.

use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use alloc::boxed::Box;

use crate::ast::*;
use crate::bytecode::{Chunk, Constant, Op, UpvalueRef};
use crate::error::JsError;

/// How a name was resolved during compilation.
enum NameLookup {
    Local(u16),
    Upvalue(u16),
    Global,
}

/// Descriptor for a variable captured from an enclosing function scope.
struct UpvalueDesc {
    name: String,
    is_local: bool,
    index: u16,
}

struct Local {
    name: String,
    depth: u32,
}

/// Compiler state for a single scope/function.
struct Scope {
    chunk: Chunk,
    locals: Vec<Local>,
    upvalues: Vec<UpvalueDesc>,
    break_jumps: Vec<usize>,
    continue_jumps: Vec<usize>,
    continue_target: Option<usize>,
    scope_depth: u32,
}

impl Scope {
    fn new() -> Self {
        Scope {
            chunk: Chunk::new(),
            locals: Vec::new(),
            upvalues: Vec::new(),
            break_jumps: Vec::new(),
            continue_jumps: Vec::new(),
            continue_target: None,
            scope_depth: 0,
        }
    }

    fn resolve_local(&self, name: &str) -> Option<u16> {
        for (i, local) in self.locals.iter().enumerate().rev() {
            if local.name == name {
                return Some(i as u16);
            }
        }
        None
    }

    fn add_local(&mut self, name: String) -> u16 {
        let idx = self.locals.len() as u16;
        self.locals.push(Local { name, depth: self.scope_depth });
        if idx + 1 > self.chunk.local_count {
            self.chunk.local_count = idx + 1;
        }
        idx
    }
}

pub struct Compiler {
    scopes: Vec<Scope>,
    binding_is_global: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler { scopes: Vec::new(), binding_is_global: false }
    }

    fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    fn bind_ident(&mut self, name: &str) {
        if self.binding_is_global {
            let ci = self.add_const(Constant::String(name.to_string()));
            self.emit(Op::StoreGlobal(ci));
            self.emit(Op::Pop);
        } else {
            let slot = self.scope_mut().add_local(name.to_string());
            self.emit(Op::StoreLocal(slot));
            self.emit(Op::Pop);
        }
    }

    /// Compile a script into a top-level chunk. `JsError` surfaces only for
    /// conditions the parser cannot catch on its own (there are none today;
    /// the `Result` return keeps the embedder API uniform with `eval`).
    pub fn compile(&mut self, program: &Program) -> Result<Chunk, JsError> {
        self.scopes.push(Scope::new());
        for stmt in &program.body {
            self.compile_stmt(stmt);
        }
        self.emit(Op::LoadUndefined);
        self.emit(Op::Return);
        Ok(self.scopes.pop().unwrap().chunk)
    }

    fn scope(&self) -> &Scope {
        self.scopes.last().unwrap()
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().unwrap()
    }

    fn emit(&mut self, op: Op) -> usize {
        self.scope_mut().chunk.emit(op)
    }

    fn add_const(&mut self, c: Constant) -> u16 {
        self.scope_mut().chunk.add_const(c)
    }

    fn offset(&self) -> usize {
        self.scope().chunk.offset()
    }

    fn patch_jump(&mut self, idx: usize) {
        self.scope_mut().chunk.patch_jump(idx);
    }

    fn patch_jump_to_pos(&mut self, idx: usize, pos: usize) {
        self.scope_mut().chunk.patch_jump_to_pos(idx, pos);
    }

    // ── Upvalue resolution ──

    fn resolve_upvalue_in_scope(&mut self, scope_idx: usize, name: &str) -> Option<u16> {
        if scope_idx == 0 {
            return None;
        }
        if let Some(local_slot) = self.scopes[scope_idx - 1].resolve_local(name) {
            return Some(self.add_upvalue(scope_idx, name, true, local_slot));
        }
        if let Some(outer_uv) = self.resolve_upvalue_in_scope(scope_idx - 1, name) {
            return Some(self.add_upvalue(scope_idx, name, false, outer_uv));
        }
        None
    }

    fn add_upvalue(&mut self, scope_idx: usize, name: &str, is_local: bool, index: u16) -> u16 {
        for (i, uv) in self.scopes[scope_idx].upvalues.iter().enumerate() {
            if uv.name == name {
                return i as u16;
            }
        }
        let idx = self.scopes[scope_idx].upvalues.len() as u16;
        self.scopes[scope_idx].upvalues.push(UpvalueDesc { name: String::from(name), is_local, index });
        idx
    }

    fn resolve_name(&mut self, name: &str) -> NameLookup {
        if let Some(slot) = self.scopes.last().unwrap().resolve_local(name) {
            return NameLookup::Local(slot);
        }
        let current = self.scopes.len() - 1;
        if current >= 1 {
            if let Some(uv_idx) = self.resolve_upvalue_in_scope(current, name) {
                return NameLookup::Upvalue(uv_idx);
            }
        }
        NameLookup::Global
    }

    fn emit_load_name(&mut self, name: &str) {
        match self.resolve_name(name) {
            NameLookup::Local(slot) => { self.emit(Op::LoadLocal(slot)); }
            NameLookup::Upvalue(idx) => { self.emit(Op::LoadUpvalue(idx)); }
            NameLookup::Global => {
                let ci = self.add_const(Constant::String(name.to_string()));
                self.emit(Op::LoadGlobal(ci));
            }
        }
    }

    /// Writes the value on top of the stack into `name`'s binding. `Store*`
    /// ops peek rather than pop, so the written value stays on the stack as
    /// the assignment expression's result; callers that don't need it (plain
    /// declarations, statement-position assignments) emit an explicit `Pop`.
    fn emit_store_name(&mut self, name: &str) {
        match self.resolve_name(name) {
            NameLookup::Local(slot) => { self.emit(Op::StoreLocal(slot)); }
            NameLookup::Upvalue(idx) => { self.emit(Op::StoreUpvalue(idx)); }
            NameLookup::Global => {
                let ci = self.add_const(Constant::String(name.to_string()));
                self.emit(Op::StoreGlobal(ci));
            }
        }
    }

    // ── Statements ──

    fn compile_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.compile_expr(expr);
                self.emit(Op::Pop);
            }
            StmtKind::VarDecl { kind, decls } => {
                let is_global = *kind == VarKind::Var && self.is_global_scope();
                for decl in decls {
                    self.compile_var_decl(decl, is_global);
                }
            }
            StmtKind::Block(stmts) => {
                self.begin_scope();
                for s in stmts {
                    self.compile_stmt(s);
                }
                self.end_scope();
            }
            StmtKind::If { condition, consequent, alternate } => {
                self.compile_expr(condition);
                let else_jump = self.emit(Op::JumpIfFalse(0));
                self.compile_stmt(consequent);
                if let Some(alt) = alternate {
                    let end_jump = self.emit(Op::Jump(0));
                    self.patch_jump(else_jump);
                    self.compile_stmt(alt);
                    self.patch_jump(end_jump);
                } else {
                    self.patch_jump(else_jump);
                }
            }
            StmtKind::While { condition, body } => {
                let loop_start = self.offset();
                let old_continue = self.scope_mut().continue_target.take();
                self.scope_mut().continue_target = Some(loop_start);
                let old_breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);

                self.compile_expr(condition);
                let exit_jump = self.emit(Op::JumpIfFalse(0));
                self.compile_stmt(body);
                let back = loop_start as i32 - self.offset() as i32 - 1;
                self.emit(Op::Jump(back));
                self.patch_jump(exit_jump);

                let breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
                for b in breaks { self.patch_jump(b); }
                self.scope_mut().break_jumps = old_breaks;
                self.scope_mut().continue_target = old_continue;
            }
            StmtKind::DoWhile { body, condition } => {
                let loop_start = self.offset();
                let old_continue = self.scope_mut().continue_target.take();
                let old_breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);

                self.compile_stmt(body);
                let cond_pos = self.offset();
                self.scope_mut().continue_target = Some(cond_pos);

                self.compile_expr(condition);
                let back = loop_start as i32 - self.offset() as i32 - 1;
                self.emit(Op::JumpIfTrue(back));

                let breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
                for b in breaks { self.patch_jump(b); }
                self.scope_mut().break_jumps = old_breaks;
                self.scope_mut().continue_target = old_continue;
            }
            StmtKind::For { init, test, update, body } => {
                self.begin_scope();
                if let Some(init) = init {
                    match init.as_ref() {
                        ForInit::VarDecl { kind, decls } => {
                            let is_global = *kind == VarKind::Var && self.is_global_scope();
                            for d in decls { self.compile_var_decl(d, is_global); }
                        }
                        ForInit::Expr(e) => {
                            self.compile_expr(e);
                            self.emit(Op::Pop);
                        }
                    }
                }

                let loop_start = self.offset();
                let old_continue = self.scope_mut().continue_target.take();
                let old_continue_jumps = core::mem::take(&mut self.scope_mut().continue_jumps);
                let old_breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);

                let exit_jump = if let Some(test) = test {
                    self.compile_expr(test);
                    Some(self.emit(Op::JumpIfFalse(0)))
                } else {
                    None
                };

                self.compile_stmt(body);

                let continue_pos = self.offset();
                let cont_jumps = core::mem::take(&mut self.scope_mut().continue_jumps);
                for cj in &cont_jumps {
                    self.patch_jump_to_pos(*cj, continue_pos);
                }

                if let Some(update) = update {
                    self.compile_expr(update);
                    self.emit(Op::Pop);
                }

                let back = loop_start as i32 - self.offset() as i32 - 1;
                self.emit(Op::Jump(back));

                if let Some(ej) = exit_jump { self.patch_jump(ej); }

                let breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
                for b in breaks { self.patch_jump(b); }
                self.scope_mut().break_jumps = old_breaks;
                self.scope_mut().continue_jumps = old_continue_jumps;
                self.scope_mut().continue_target = old_continue;
                self.end_scope();
            }
            StmtKind::ForIn { left, right, body } => {
                self.compile_for_in_of(left, right, body, false);
            }
            StmtKind::ForOf { left, right, body, .. } => {
                self.compile_for_in_of(left, right, body, true);
            }
            StmtKind::Return(val) => {
                if let Some(v) = val {
                    self.compile_expr(v);
                } else {
                    self.emit(Op::LoadUndefined);
                }
                self.emit(Op::Return);
            }
            StmtKind::Break(_label) => {
                let idx = self.emit(Op::Jump(0));
                self.scope_mut().break_jumps.push(idx);
            }
            StmtKind::Continue(_label) => {
                if let Some(target) = self.scope().continue_target {
                    let back = target as i32 - self.offset() as i32 - 1;
                    self.emit(Op::Jump(back));
                } else {
                    let idx = self.emit(Op::Jump(0));
                    self.scope_mut().continue_jumps.push(idx);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.compile_switch(discriminant, cases);
            }
            StmtKind::Throw(expr) => {
                self.compile_expr(expr);
                self.emit(Op::Throw);
            }
            StmtKind::Try { block, catch, finally } => {
                self.compile_try(block, catch, finally);
            }
            StmtKind::FunctionDecl { name, params, body, is_async, is_generator } => {
                self.compile_function(Some(name), params, body, *is_async, *is_generator);
                if self.is_global_scope() {
                    let ci = self.add_const(Constant::String(name.clone()));
                    self.emit(Op::StoreGlobal(ci));
                    self.emit(Op::Pop);
                } else {
                    let slot = self.scope_mut().add_local(name.clone());
                    self.emit(Op::StoreLocal(slot));
                    self.emit(Op::Pop);
                }
            }
            StmtKind::ClassDecl { name, super_class, body } => {
                self.compile_class(Some(name), super_class, body);
                if self.is_global_scope() {
                    let ci = self.add_const(Constant::String(name.clone()));
                    self.emit(Op::StoreGlobal(ci));
                    self.emit(Op::Pop);
                } else {
                    let slot = self.scope_mut().add_local(name.clone());
                    self.emit(Op::StoreLocal(slot));
                    self.emit(Op::Pop);
                }
            }
            StmtKind::Labeled { label: _, body } => {
                self.compile_stmt(body);
            }
            StmtKind::Empty | StmtKind::Debugger => {
                self.emit(Op::Nop);
            }
            StmtKind::Import(_decl) => {
                // Bindings are installed by the module linker before this
                // chunk runs; the statement itself compiles to nothing.
                self.emit(Op::Nop);
            }
            StmtKind::Export(decl) => {
                self.compile_export(decl);
            }
        }
    }

    fn compile_export(&mut self, decl: &ExportDeclaration) {
        match decl {
            ExportDeclaration::Default(expr) => {
                self.compile_expr(expr);
                let ci = self.add_const(Constant::String(String::from("default")));
                self.emit(Op::StoreGlobal(ci));
                self.emit(Op::Pop);
            }
            ExportDeclaration::Declaration(stmt) => {
                self.compile_stmt(stmt);
            }
            ExportDeclaration::Named { .. } | ExportDeclaration::All { .. } => {
                // Re-exports are resolved entirely by the module linker
                // against already-evaluated module namespaces.
                self.emit(Op::Nop);
            }
        }
    }

    fn compile_var_decl(&mut self, decl: &VarDeclarator, is_global_var: bool) {
        let prev = self.binding_is_global;
        self.binding_is_global = is_global_var;
        if let Some(init) = &decl.init {
            self.compile_expr(init);
        } else {
            self.emit(Op::LoadUndefined);
        }
        self.compile_pattern_binding(&decl.name);
        self.binding_is_global = prev;
    }

    fn compile_array_destructure(&mut self, elements: &[Option<Pattern>]) {
        for (i, elem) in elements.iter().enumerate() {
            if let Some(pat) = elem {
                self.emit(Op::Dup);
                let idx = self.add_const(Constant::Number(i as f64));
                self.emit(Op::LoadConst(idx));
                self.emit(Op::GetProp);
                self.compile_pattern_binding(pat);
            }
        }
        self.emit(Op::Pop);
    }

    fn compile_object_destructure(&mut self, props: &[ObjPatProp]) {
        for prop in props {
            self.emit(Op::Dup);
            let name_idx = self.add_const(Constant::String(prop.key.clone()));
            self.emit(Op::GetPropNamed(name_idx));
            self.compile_pattern_binding(&prop.value);
        }
        self.emit(Op::Pop);
    }

    fn compile_pattern_binding(&mut self, pat: &Pattern) {
        match pat {
            Pattern::Ident(name) => {
                let name_clone = name.clone();
                self.bind_ident(&name_clone);
            }
            Pattern::Assign(inner, default) => {
                self.emit(Op::Dup);
                self.emit(Op::LoadUndefined);
                self.emit(Op::StrictEq);
                let skip = self.emit(Op::JumpIfFalse(0));
                self.emit(Op::Pop);
                self.compile_expr(default);
                self.patch_jump(skip);
                self.compile_pattern_binding(inner);
            }
            Pattern::Array(elems) => {
                self.compile_array_destructure(elems);
            }
            Pattern::Object(props) => {
                self.compile_object_destructure(props);
            }
            Pattern::Rest(inner) => {
                self.compile_pattern_binding(inner);
            }
        }
    }

    fn compile_for_in_of(&mut self, left: &ForInit, right: &Expr, body: &Stmt, _is_of: bool) {
        self.begin_scope();
        self.compile_expr(right);
        self.emit(Op::GetIterator);

        let loop_start = self.offset();
        let old_breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
        let old_continue = self.scope_mut().continue_target.take();

        self.emit(Op::Dup);
        self.emit(Op::IterNext);
        let exit_jump = self.emit(Op::JumpIfTrue(0));
        self.emit(Op::IterValue);

        match left {
            ForInit::VarDecl { kind, decls } => {
                if let Some(decl) = decls.first() {
                    let is_global = *kind == VarKind::Var && self.is_global_scope();
                    let prev = self.binding_is_global;
                    self.binding_is_global = is_global;
                    self.compile_pattern_binding(&decl.name);
                    self.binding_is_global = prev;
                } else {
                    self.emit(Op::Pop);
                }
            }
            ForInit::Expr(e) => {
                if let ExprKind::Ident(name) = &e.kind {
                    if let Some(slot) = self.scope().resolve_local(name.as_str()) {
                        self.emit(Op::StoreLocal(slot));
                        self.emit(Op::Pop);
                    } else {
                        let ci = self.add_const(Constant::String(name.clone()));
                        self.emit(Op::StoreGlobal(ci));
                        self.emit(Op::Pop);
                    }
                } else {
                    self.emit(Op::Pop);
                }
            }
        }

        self.scope_mut().continue_target = Some(loop_start);
        self.compile_stmt(body);

        let back = loop_start as i32 - self.offset() as i32 - 1;
        self.emit(Op::Jump(back));
        self.patch_jump(exit_jump);
        self.emit(Op::Pop);

        let breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
        for b in breaks { self.patch_jump(b); }
        self.scope_mut().break_jumps = old_breaks;
        self.scope_mut().continue_target = old_continue;
        self.end_scope();
    }

    fn compile_switch(&mut self, discriminant: &Expr, cases: &[SwitchCase]) {
        self.compile_expr(discriminant);
        let old_breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);

        let mut case_jumps: Vec<Option<usize>> = Vec::new();
        let mut default_idx: Option<usize> = None;

        for (i, case) in cases.iter().enumerate() {
            if let Some(ref test) = case.test {
                self.emit(Op::Dup);
                self.compile_expr(test);
                self.emit(Op::StrictEq);
                let j = self.emit(Op::JumpIfTrue(0));
                case_jumps.push(Some(j));
            } else {
                default_idx = Some(i);
                case_jumps.push(None);
            }
        }

        let no_match_jump = self.emit(Op::Jump(0));

        let mut body_positions: Vec<usize> = Vec::new();
        for (i, case) in cases.iter().enumerate() {
            body_positions.push(self.offset());
            if let Some(j) = case_jumps[i] { self.patch_jump(j); }
            for s in &case.consequent { self.compile_stmt(s); }
        }

        if let Some(di) = default_idx {
            self.patch_jump_to_pos(no_match_jump, body_positions[di]);
        } else {
            self.patch_jump(no_match_jump);
        }

        self.emit(Op::Pop);

        let breaks: Vec<usize> = core::mem::take(&mut self.scope_mut().break_jumps);
        for b in breaks { self.patch_jump(b); }
        self.scope_mut().break_jumps = old_breaks;
    }

    fn compile_try(&mut self, block: &[Stmt], catch: &Option<CatchClause>, finally: &Option<Vec<Stmt>>) {
        let catch_offset_slot = self.emit(Op::TryCatch(0, 0));

        for s in block { self.compile_stmt(s); }
        let try_end_jump = self.emit(Op::Jump(0));

        let catch_pos = self.offset();
        let catch_off = catch_pos as i32 - catch_offset_slot as i32 - 1;
        if let Op::TryCatch(ref mut co, _) = self.scope_mut().chunk.code[catch_offset_slot] {
            *co = catch_off;
        }

        if let Some(cc) = catch {
            self.begin_scope();
            if let Some(ref param) = cc.param {
                self.compile_pattern_binding(param);
            } else {
                self.emit(Op::Pop);
            }
            for s in &cc.body { self.compile_stmt(s); }
            self.end_scope();
        } else {
            self.emit(Op::Pop);
        }

        self.patch_jump(try_end_jump);
        self.emit(Op::TryEnd);

        if let Some(fin) = finally {
            for s in fin { self.compile_stmt(s); }
        }
    }

    fn compile_function(&mut self, name: Option<&String>, params: &[Param], body: &[Stmt], is_async: bool, is_generator: bool) {
        self.compile_function_impl(name, params, body, is_async, is_generator, false);
    }

    fn compile_function_named_expr(&mut self, name: Option<&String>, params: &[Param], body: &[Stmt], is_async: bool, is_generator: bool) {
        self.compile_function_impl(name, params, body, is_async, is_generator, true);
    }

    fn compile_function_impl(&mut self, name: Option<&String>, params: &[Param], body: &[Stmt], is_async: bool, is_generator: bool, named_expr: bool) {
        let outer_binding_is_global = self.binding_is_global;
        self.binding_is_global = false;

        let mut func_scope = Scope::new();
        func_scope.chunk.name = name.cloned();
        func_scope.chunk.param_count = params.len() as u16;
        func_scope.chunk.is_async = is_async;
        func_scope.chunk.is_generator = is_generator;

        let rest_param_idx = params.iter().position(|p| p.is_rest);

        for param in params {
            if param.is_rest { continue; }
            if let Pattern::Ident(ref n) = param.pattern {
                func_scope.add_local(n.clone());
            } else {
                func_scope.add_local(String::from("$$param$$"));
            }
        }

        let rest_slot: Option<u16> = rest_param_idx.map(|ri| {
            let n = match &params[ri].pattern {
                Pattern::Ident(n) => n.clone(),
                _ => String::from("$$rest$$"),
            };
            func_scope.add_local(n)
        });

        let arguments_slot = func_scope.add_local(String::from("arguments"));

        let self_name_slot: Option<u16> = if named_expr {
            name.map(|n| func_scope.add_local(n.clone()))
        } else {
            None
        };

        self.scopes.push(func_scope);

        let rest_start = rest_param_idx.unwrap_or(params.len()) as u16;
        self.emit(Op::LoadArgsArray(0));
        self.emit(Op::StoreLocal(arguments_slot));
        self.emit(Op::Pop);

        if let Some(slot) = rest_slot {
            self.emit(Op::LoadArgsArray(rest_start));
            self.emit(Op::StoreLocal(slot));
            self.emit(Op::Pop);
        }

        if let Some(slot) = self_name_slot {
            self.emit(Op::LoadSelf);
            self.emit(Op::StoreLocal(slot));
            self.emit(Op::Pop);
        }

        for (i, param) in params.iter().filter(|p| !p.is_rest).enumerate() {
            if let Some(ref default) = param.default {
                self.emit(Op::LoadLocal(i as u16));
                self.emit(Op::LoadUndefined);
                self.emit(Op::StrictEq);
                let skip = self.emit(Op::JumpIfFalse(0));
                self.compile_expr(default);
                self.emit(Op::StoreLocal(i as u16));
                self.emit(Op::Pop);
                self.patch_jump(skip);
            }
            if !matches!(param.pattern, Pattern::Ident(_)) {
                self.emit(Op::LoadLocal(i as u16));
                self.compile_pattern_binding(&param.pattern);
            }
        }

        for s in body {
            self.compile_stmt(s);
        }

        self.emit(Op::LoadUndefined);
        self.emit(Op::Return);

        let func_scope = self.scopes.pop().unwrap();
        let mut func_chunk = func_scope.chunk;
        func_chunk.upvalues = func_scope.upvalues.iter().map(|uv| UpvalueRef { is_local: uv.is_local, index: uv.index }).collect();
        let ci = self.add_const(Constant::Function(Box::new(func_chunk)));
        self.emit(Op::Closure(ci));

        self.binding_is_global = outer_binding_is_global;
    }

    fn compile_class(&mut self, name: Option<&String>, super_class: &Option<Expr>, body: &[ClassMember]) {
        let super_local: Option<u16> = if let Some(ref super_expr) = super_class {
            self.compile_expr(super_expr);
            let slot = self.scope_mut().add_local(String::from("$$super$$"));
            self.emit(Op::StoreLocal(slot));
            self.emit(Op::Pop);
            Some(slot)
        } else {
            None
        };

        let ctor = body.iter().find(|m| matches!(m.kind, ClassMemberKind::Constructor { .. }));
        if let Some(ctor_member) = ctor {
            if let ClassMemberKind::Constructor { ref params, ref body } = ctor_member.kind {
                self.compile_function(name, params, body, false, false);
            }
        } else {
            self.compile_function(name, &[], &[], false, false);
        }

        if let Some(super_slot) = super_local {
            self.emit(Op::Dup);
            let proto_idx = self.add_const(Constant::String(String::from("prototype")));
            self.emit(Op::GetPropNamed(proto_idx));
            self.emit(Op::LoadLocal(super_slot));
            let proto_idx2 = self.add_const(Constant::String(String::from("prototype")));
            self.emit(Op::GetPropNamed(proto_idx2));
            let proto_key_idx = self.add_const(Constant::String(String::from("__proto__")));
            self.emit(Op::SetPropNamed(proto_key_idx));
            self.emit(Op::Pop);
        }

        for member in body {
            if matches!(member.kind, ClassMemberKind::Constructor { .. }) {
                continue;
            }
            let key_name = match &member.key {
                PropKey::Ident(s) | PropKey::String(s) => s.clone(),
                PropKey::Private(s) => alloc::format!("#{}", s),
                _ => String::from("_member_"),
            };
            if member.is_static {
                match &member.kind {
                    ClassMemberKind::Method { params, body, is_async, is_generator, prop_kind } => {
                        self.emit(Op::Dup);
                        self.compile_function(Some(&key_name), params, body, *is_async, *is_generator);
                        let ki = self.add_const(Constant::String(key_name));
                        self.emit(accessor_op(*prop_kind, ki));
                        self.emit(Op::Pop);
                    }
                    ClassMemberKind::Property { value } => {
                        self.emit(Op::Dup);
                        if let Some(v) = value { self.compile_expr(v); } else { self.emit(Op::LoadUndefined); }
                        let ki = self.add_const(Constant::String(key_name));
                        self.emit(Op::SetPropNamed(ki));
                        self.emit(Op::Pop);
                    }
                    _ => {}
                }
            } else if let ClassMemberKind::Method { params, body, is_async, is_generator, prop_kind } = &member.kind {
                self.emit(Op::Dup);
                let proto_idx = self.add_const(Constant::String(String::from("prototype")));
                self.emit(Op::GetPropNamed(proto_idx));
                self.compile_function(Some(&key_name), params, body, *is_async, *is_generator);
                let ki = self.add_const(Constant::String(key_name));
                self.emit(accessor_op(*prop_kind, ki));
                self.emit(Op::Pop);
            }
        }
    }

    // ── Expressions ──

    fn compile_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(n) => {
                let ci = self.add_const(Constant::Number(*n));
                self.emit(Op::LoadConst(ci));
            }
            ExprKind::BigInt(n) => {
                let ci = self.add_const(Constant::BigInt(*n));
                self.emit(Op::LoadConst(ci));
            }
            ExprKind::String(s) => {
                let ci = self.add_const(Constant::String(s.clone()));
                self.emit(Op::LoadConst(ci));
            }
            ExprKind::Template { quasis, exprs } => {
                self.compile_template(quasis, exprs);
            }
            ExprKind::TaggedTemplate { tag, quasis, exprs } => {
                self.compile_expr(tag);
                self.emit(Op::NewArray(0));
                for q in quasis {
                    let ci = self.add_const(Constant::String(q.clone()));
                    self.emit(Op::LoadConst(ci));
                    self.emit(Op::ArrayPush);
                }
                for e in exprs {
                    self.compile_expr(e);
                }
                self.emit(Op::Call(1 + exprs.len() as u8));
            }
            ExprKind::Regex { pattern, flags } => {
                let p = self.add_const(Constant::String(pattern.clone()));
                let f = self.add_const(Constant::String(flags.clone()));
                self.emit(Op::LoadConst(p));
                self.emit(Op::LoadConst(f));
                let ci = self.add_const(Constant::String(String::from("RegExp")));
                self.emit(Op::LoadGlobal(ci));
                self.emit(Op::New(2));
            }
            ExprKind::Bool(true) => { self.emit(Op::LoadTrue); }
            ExprKind::Bool(false) => { self.emit(Op::LoadFalse); }
            ExprKind::Null => { self.emit(Op::LoadNull); }
            ExprKind::Undefined => { self.emit(Op::LoadUndefined); }
            ExprKind::This => { self.emit(Op::LoadThis); }
            ExprKind::Super => { self.emit_load_name("$$super$$"); }
            ExprKind::PrivateName(n) => {
                let ci = self.add_const(Constant::String(alloc::format!("#{}", n)));
                self.emit(Op::LoadConst(ci));
            }
            ExprKind::Ident(name) => {
                let name = name.clone();
                self.emit_load_name(&name);
            }
            ExprKind::Array(elements) => {
                let has_spread = elements.iter().any(|e| matches!(e.as_ref().map(|x| &x.kind), Some(ExprKind::Spread(_))));
                if has_spread {
                    self.emit(Op::NewArray(0));
                    for elem in elements {
                        match elem {
                            Some(e) if matches!(e.kind, ExprKind::Spread(_)) => {
                                if let ExprKind::Spread(inner) = &e.kind {
                                    self.compile_expr(inner);
                                    self.emit(Op::Spread);
                                }
                            }
                            Some(e) => {
                                self.compile_expr(e);
                                self.emit(Op::ArrayPush);
                            }
                            None => {
                                self.emit(Op::LoadUndefined);
                                self.emit(Op::ArrayPush);
                            }
                        }
                    }
                } else {
                    for elem in elements {
                        if let Some(e) = elem {
                            self.compile_expr(e);
                        } else {
                            self.emit(Op::LoadUndefined);
                        }
                    }
                    self.emit(Op::NewArray(elements.len() as u16));
                }
            }
            ExprKind::Object(props) => {
                self.emit(Op::NewObject);
                for prop in props {
                    if let ExprKind::Spread(inner) = &prop.value.kind {
                        self.emit(Op::Dup);
                        self.compile_expr(inner);
                        self.emit(Op::ObjectSpread);
                        continue;
                    }
                    match &prop.key {
                        PropKey::Ident(name) | PropKey::String(name) => {
                            self.emit(Op::Dup);
                            self.compile_expr(&prop.value);
                            let ci = self.add_const(Constant::String(name.clone()));
                            match prop.kind {
                                PropKind::Get => { self.emit(Op::DefineGetter(ci)); }
                                PropKind::Set => { self.emit(Op::DefineSetter(ci)); }
                                PropKind::Init | PropKind::Method => { self.emit(Op::SetPropNamed(ci)); }
                            }
                            self.emit(Op::Pop);
                        }
                        PropKey::Private(name) => {
                            self.emit(Op::Dup);
                            self.compile_expr(&prop.value);
                            let ci = self.add_const(Constant::String(alloc::format!("#{}", name)));
                            self.emit(Op::SetPropNamed(ci));
                            self.emit(Op::Pop);
                        }
                        PropKey::Number(n) => {
                            self.emit(Op::Dup);
                            let key_ci = self.add_const(Constant::Number(*n));
                            self.emit(Op::LoadConst(key_ci));
                            self.compile_expr(&prop.value);
                            self.emit(Op::SetProp);
                            self.emit(Op::Pop);
                        }
                        PropKey::Computed(key) => {
                            self.emit(Op::Dup);
                            self.compile_expr(key);
                            self.compile_expr(&prop.value);
                            self.emit(Op::SetProp);
                            self.emit(Op::Pop);
                        }
                    }
                }
            }
            ExprKind::Member { object, property, optional, .. } => {
                self.compile_expr(object);
                let ci = self.add_const(Constant::String(property.clone()));
                if *optional {
                    self.emit(Op::GetPropNamedOptional(ci));
                } else {
                    self.emit(Op::GetPropNamed(ci));
                }
            }
            ExprKind::Index { object, index, optional } => {
                self.compile_expr(object);
                self.compile_expr(index);
                if *optional {
                    self.emit(Op::GetPropOptional);
                } else {
                    self.emit(Op::GetProp);
                }
            }
            ExprKind::Call { callee, arguments, optional } => {
                self.compile_call(callee, arguments, *optional);
            }
            ExprKind::New { callee, arguments } => {
                self.compile_expr(callee);
                for arg in arguments { self.compile_expr(arg); }
                self.emit(Op::New(arguments.len() as u8));
            }
            ExprKind::Unary { op, argument, .. } => {
                match op {
                    UnaryOp::Delete => self.compile_delete(argument),
                    _ => {
                        self.compile_expr(argument);
                        match op {
                            UnaryOp::Neg => { self.emit(Op::Neg); }
                            UnaryOp::Pos => { self.emit(Op::Pos); }
                            UnaryOp::Not => { self.emit(Op::Not); }
                            UnaryOp::BitNot => { self.emit(Op::BitNot); }
                            UnaryOp::Typeof => { self.emit(Op::Typeof); }
                            UnaryOp::Void => { self.emit(Op::Void); }
                            UnaryOp::Delete => unreachable!(),
                        }
                    }
                }
            }
            ExprKind::Update { op, argument, prefix } => {
                self.compile_update(op, argument, *prefix);
            }
            ExprKind::Binary { op, left, right } => {
                self.compile_expr(left);
                self.compile_expr(right);
                self.emit(binop_to_op(*op));
            }
            ExprKind::Logical { op, left, right } => {
                self.compile_expr(left);
                match op {
                    LogicalOp::And => {
                        self.emit(Op::Dup);
                        let skip = self.emit(Op::JumpIfFalse(0));
                        self.emit(Op::Pop);
                        self.compile_expr(right);
                        self.patch_jump(skip);
                    }
                    LogicalOp::Or => {
                        self.emit(Op::Dup);
                        let skip = self.emit(Op::JumpIfTrue(0));
                        self.emit(Op::Pop);
                        self.compile_expr(right);
                        self.patch_jump(skip);
                    }
                    LogicalOp::NullishCoalesce => {
                        self.emit(Op::Dup);
                        let skip = self.emit_short_circuit_test(LogicalOp::NullishCoalesce);
                        self.emit(Op::Pop);
                        self.compile_expr(right);
                        self.patch_jump(skip);
                    }
                }
            }
            ExprKind::Assign { op, left, right } => {
                self.compile_assignment(op, left, right);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.compile_expr(test);
                let else_jump = self.emit(Op::JumpIfFalse(0));
                self.compile_expr(consequent);
                let end_jump = self.emit(Op::Jump(0));
                self.patch_jump(else_jump);
                self.compile_expr(alternate);
                self.patch_jump(end_jump);
            }
            ExprKind::Sequence(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    self.compile_expr(e);
                    if i + 1 < exprs.len() { self.emit(Op::Pop); }
                }
            }
            ExprKind::FunctionExpr { name, params, body, is_async, is_generator } => {
                if name.is_some() {
                    self.compile_function_named_expr(name.as_ref(), params, body, *is_async, *is_generator);
                } else {
                    self.compile_function(name.as_ref(), params, body, *is_async, *is_generator);
                }
            }
            ExprKind::Arrow { params, body, is_async } => {
                match body {
                    ArrowBody::Block(stmts) => {
                        self.compile_function(None, params, stmts, *is_async, false);
                    }
                    ArrowBody::Expr(inner) => {
                        let return_stmt = Stmt::new(StmtKind::Return(Some(inner.as_ref().clone())), inner.span);
                        self.compile_function(None, params, core::slice::from_ref(&return_stmt), *is_async, false);
                    }
                }
            }
            ExprKind::Spread(inner) => {
                self.compile_expr(inner);
                self.emit(Op::Spread);
            }
            ExprKind::Yield { argument, delegate: _ } => {
                if let Some(v) = argument {
                    self.compile_expr(v);
                } else {
                    self.emit(Op::LoadUndefined);
                }
                self.emit(Op::Yield);
            }
            ExprKind::Await(inner) => {
                self.compile_expr(inner);
                self.emit(Op::Await);
            }
            ExprKind::ClassExpr { name, super_class, body } => {
                let sc = super_class.as_ref().map(|b| b.as_ref().clone());
                self.compile_class(name.as_ref(), &sc, body);
            }
        }
    }

    fn compile_delete(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Member { object, property, .. } => {
                self.compile_expr(object);
                let ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::LoadConst(ci));
                self.emit(Op::Delete);
            }
            ExprKind::Index { object, index, .. } => {
                self.compile_expr(object);
                self.compile_expr(index);
                self.emit(Op::Delete);
            }
            _ => {
                self.emit(Op::LoadTrue);
            }
        }
    }

    fn compile_template(&mut self, quasis: &[String], exprs: &[Expr]) {
        let empty_ci = self.add_const(Constant::String(String::new()));
        self.emit(Op::LoadConst(empty_ci));
        for (i, q) in quasis.iter().enumerate() {
            if !q.is_empty() {
                let ci = self.add_const(Constant::String(q.clone()));
                self.emit(Op::LoadConst(ci));
                self.emit(Op::Add);
            }
            if let Some(e) = exprs.get(i) {
                self.compile_expr(e);
                self.emit(Op::Add);
            }
        }
    }

    fn compile_call(&mut self, callee: &Expr, arguments: &[Expr], optional: bool) {
        match &callee.kind {
            ExprKind::Super => {
                self.emit(Op::LoadThis);
                self.emit_load_name("$$super$$");
                for arg in arguments { self.compile_expr(arg); }
                self.emit(Op::CallMethod(arguments.len() as u8));
            }
            ExprKind::Member { object, property, .. } if matches!(object.kind, ExprKind::Super) => {
                self.emit(Op::LoadThis);
                self.emit_load_name("$$super$$");
                let proto_ci = self.add_const(Constant::String(String::from("prototype")));
                self.emit(Op::GetPropNamed(proto_ci));
                let method_ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::GetPropNamed(method_ci));
                for arg in arguments { self.compile_expr(arg); }
                self.emit(Op::CallMethod(arguments.len() as u8));
            }
            ExprKind::Member { object, property, .. } => {
                self.compile_expr(object);
                self.emit(Op::Dup);
                let ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::GetPropNamed(ci));
                if Self::args_have_spread(arguments) {
                    self.compile_args_as_array(arguments);
                    self.emit(Op::CallMethodSpread);
                } else {
                    for arg in arguments { self.compile_expr(arg); }
                    if optional { self.emit(Op::CallMethodOptional(arguments.len() as u8)); } else { self.emit(Op::CallMethod(arguments.len() as u8)); }
                }
            }
            ExprKind::Index { object, index, .. } => {
                self.compile_expr(object);
                self.emit(Op::Dup);
                self.compile_expr(index);
                self.emit(Op::GetProp);
                if Self::args_have_spread(arguments) {
                    self.compile_args_as_array(arguments);
                    self.emit(Op::CallMethodSpread);
                } else {
                    for arg in arguments { self.compile_expr(arg); }
                    if optional { self.emit(Op::CallMethodOptional(arguments.len() as u8)); } else { self.emit(Op::CallMethod(arguments.len() as u8)); }
                }
            }
            _ => {
                self.compile_expr(callee);
                if Self::args_have_spread(arguments) {
                    self.compile_args_as_array(arguments);
                    self.emit(Op::CallSpread);
                } else {
                    for arg in arguments { self.compile_expr(arg); }
                    if optional { self.emit(Op::CallOptional(arguments.len() as u8)); } else { self.emit(Op::Call(arguments.len() as u8)); }
                }
            }
        }
    }

    fn compile_assignment(&mut self, op: &AssignOp, left: &Expr, right: &Expr) {
        if let Some(logical) = logical_assign_kind(op) {
            self.compile_logical_assignment(logical, left, right);
            return;
        }

        match &left.kind {
            ExprKind::Ident(name) => {
                let name = name.clone();
                if *op != AssignOp::Assign {
                    self.emit_load_name(&name);
                    self.compile_expr(right);
                    self.emit_compound_op(op);
                } else {
                    self.compile_expr(right);
                }
                self.emit_store_name(&name);
            }
            ExprKind::Member { object, property, .. } => {
                self.compile_expr(object);
                if *op != AssignOp::Assign {
                    self.emit(Op::Dup);
                    let ci = self.add_const(Constant::String(property.clone()));
                    self.emit(Op::GetPropNamed(ci));
                    self.compile_expr(right);
                    self.emit_compound_op(op);
                } else {
                    self.compile_expr(right);
                }
                let ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::SetPropNamed(ci));
            }
            ExprKind::Index { object, index, .. } => {
                if *op != AssignOp::Assign {
                    // `GetProp`/`SetProp` each consume the object+key pair,
                    // so the non-commutative read-then-write needs both
                    // stashed rather than duplicated off a single Dup.
                    self.compile_expr(object);
                    let obj_slot = self.scope_mut().add_local(String::from("$$idx_obj$$"));
                    self.emit(Op::StoreLocal(obj_slot));
                    self.emit(Op::Pop);

                    self.compile_expr(index);
                    let key_slot = self.scope_mut().add_local(String::from("$$idx_key$$"));
                    self.emit(Op::StoreLocal(key_slot));
                    self.emit(Op::Pop);

                    self.emit(Op::LoadLocal(obj_slot));
                    self.emit(Op::LoadLocal(key_slot));
                    self.emit(Op::GetProp);
                    self.compile_expr(right);
                    self.emit_compound_op(op);

                    let val_slot = self.scope_mut().add_local(String::from("$$idx_val$$"));
                    self.emit(Op::StoreLocal(val_slot));
                    self.emit(Op::Pop);

                    self.emit(Op::LoadLocal(obj_slot));
                    self.emit(Op::LoadLocal(key_slot));
                    self.emit(Op::LoadLocal(val_slot));
                } else {
                    self.compile_expr(object);
                    self.compile_expr(index);
                    self.compile_expr(right);
                }
                self.emit(Op::SetProp);
            }
            _ => {
                self.compile_expr(right);
            }
        }
    }

    fn emit_compound_op(&mut self, op: &AssignOp) {
        match op {
            AssignOp::AddAssign => { self.emit(Op::Add); }
            AssignOp::SubAssign => { self.emit(Op::Sub); }
            AssignOp::MulAssign => { self.emit(Op::Mul); }
            AssignOp::DivAssign => { self.emit(Op::Div); }
            AssignOp::ModAssign => { self.emit(Op::Mod); }
            AssignOp::ExpAssign => { self.emit(Op::Exp); }
            AssignOp::BitAndAssign => { self.emit(Op::BitAnd); }
            AssignOp::BitOrAssign => { self.emit(Op::BitOr); }
            AssignOp::BitXorAssign => { self.emit(Op::BitXor); }
            AssignOp::ShlAssign => { self.emit(Op::Shl); }
            AssignOp::ShrAssign => { self.emit(Op::Shr); }
            AssignOp::UShrAssign => { self.emit(Op::UShr); }
            _ => {}
        }
    }

    /// `a &&= b` / `a ||= b` / `a ??= b`: `b` is compiled and assigned only
    /// when the short-circuit test passes; the current value of `a` is the
    /// result otherwise. Shares the read/write slot-stashing used by the
    /// `Index` compound-assignment case so the target is evaluated once.
    fn compile_logical_assignment(&mut self, kind: LogicalOp, left: &Expr, right: &Expr) {
        match &left.kind {
            ExprKind::Ident(name) => {
                let name = name.clone();
                self.emit_load_name(&name);
                self.emit(Op::Dup);
                let skip = self.emit_short_circuit_test(kind);
                self.emit(Op::Pop);
                self.compile_expr(right);
                self.emit_store_name(&name);
                let end = self.emit(Op::Jump(0));
                self.patch_jump(skip);
                self.patch_jump(end);
            }
            ExprKind::Member { object, property, .. } => {
                self.compile_expr(object);
                let obj_slot = self.scope_mut().add_local(String::from("$$la_obj$$"));
                self.emit(Op::StoreLocal(obj_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                let ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::GetPropNamed(ci));
                self.emit(Op::Dup);
                let skip = self.emit_short_circuit_test(kind);
                self.emit(Op::Pop);
                self.emit(Op::LoadLocal(obj_slot));
                self.compile_expr(right);
                let ci2 = self.add_const(Constant::String(property.clone()));
                self.emit(Op::SetPropNamed(ci2));
                let end = self.emit(Op::Jump(0));
                self.patch_jump(skip);
                self.patch_jump(end);
            }
            ExprKind::Index { object, index, .. } => {
                self.compile_expr(object);
                let obj_slot = self.scope_mut().add_local(String::from("$$la_obj$$"));
                self.emit(Op::StoreLocal(obj_slot));
                self.emit(Op::Pop);
                self.compile_expr(index);
                let key_slot = self.scope_mut().add_local(String::from("$$la_key$$"));
                self.emit(Op::StoreLocal(key_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                self.emit(Op::LoadLocal(key_slot));
                self.emit(Op::GetProp);
                self.emit(Op::Dup);
                let skip = self.emit_short_circuit_test(kind);
                self.emit(Op::Pop);
                self.emit(Op::LoadLocal(obj_slot));
                self.emit(Op::LoadLocal(key_slot));
                self.compile_expr(right);
                self.emit(Op::SetProp);
                let end = self.emit(Op::Jump(0));
                self.patch_jump(skip);
                self.patch_jump(end);
            }
            _ => {
                self.compile_expr(right);
            }
        }
    }

    /// Emits the jump whose target is "keep the current value, skip the
    /// right-hand assignment"; returns its patch index. Consumes the `Dup`'d
    /// test copy from the stack in both branches.
    fn emit_short_circuit_test(&mut self, kind: LogicalOp) -> usize {
        match kind {
            LogicalOp::And => self.emit(Op::JumpIfFalse(0)),
            LogicalOp::Or => self.emit(Op::JumpIfTrue(0)),
            LogicalOp::NullishCoalesce => {
                // Only JumpIfNullish exists, so invert: jump *into* the
                // assignment path on nullish, and jump past it otherwise.
                let to_assign = self.emit(Op::JumpIfNullish(0));
                let to_skip = self.emit(Op::Jump(0));
                self.patch_jump(to_assign);
                to_skip
            }
        }
    }

    fn compile_update(&mut self, op: &UpdateOp, argument: &Expr, prefix: bool) {
        match &argument.kind {
            ExprKind::Ident(name) => {
                let name = name.clone();
                let lookup = self.resolve_name(&name);
                let (load_op, store_op): (fn(u16) -> Op, fn(u16) -> Op) = match lookup {
                    NameLookup::Local(_) => (Op::LoadLocal, Op::StoreLocal),
                    NameLookup::Upvalue(_) => (Op::LoadUpvalue, Op::StoreUpvalue),
                    NameLookup::Global => (Op::LoadGlobal, Op::StoreGlobal),
                };
                let slot = match lookup {
                    NameLookup::Local(s) | NameLookup::Upvalue(s) => s,
                    NameLookup::Global => self.add_const(Constant::String(name.clone())),
                };
                if !prefix { self.emit(load_op(slot)); }
                self.emit(load_op(slot));
                match op {
                    UpdateOp::Inc => { self.emit(Op::Inc); }
                    UpdateOp::Dec => { self.emit(Op::Dec); }
                }
                // `store_op` peeks rather than pops, so it already leaves the
                // new value on the stack for the prefix case.
                self.emit(store_op(slot));
                if !prefix {
                    self.emit(Op::Pop);
                }
            }
            ExprKind::Member { object, property, .. } => {
                self.compile_expr(object);
                let obj_slot = self.scope_mut().add_local(String::from("$$upd_obj$$"));
                self.emit(Op::StoreLocal(obj_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                let ci = self.add_const(Constant::String(property.clone()));
                self.emit(Op::GetPropNamed(ci));
                let old_slot = self.scope_mut().add_local(String::from("$$upd_old$$"));
                self.emit(Op::StoreLocal(old_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(old_slot));
                match op {
                    UpdateOp::Inc => { self.emit(Op::Inc); }
                    UpdateOp::Dec => { self.emit(Op::Dec); }
                }
                let new_slot = self.scope_mut().add_local(String::from("$$upd_new$$"));
                self.emit(Op::StoreLocal(new_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                self.emit(Op::LoadLocal(new_slot));
                let ci2 = self.add_const(Constant::String(property.clone()));
                self.emit(Op::SetPropNamed(ci2));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(if prefix { new_slot } else { old_slot }));
            }
            ExprKind::Index { object, index, .. } => {
                self.compile_expr(object);
                let obj_slot = self.scope_mut().add_local(String::from("$$upd_obj$$"));
                self.emit(Op::StoreLocal(obj_slot));
                self.emit(Op::Pop);
                self.compile_expr(index);
                let key_slot = self.scope_mut().add_local(String::from("$$upd_key$$"));
                self.emit(Op::StoreLocal(key_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                self.emit(Op::LoadLocal(key_slot));
                self.emit(Op::GetProp);
                let old_slot = self.scope_mut().add_local(String::from("$$upd_old$$"));
                self.emit(Op::StoreLocal(old_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(old_slot));
                match op {
                    UpdateOp::Inc => { self.emit(Op::Inc); }
                    UpdateOp::Dec => { self.emit(Op::Dec); }
                }
                let new_slot = self.scope_mut().add_local(String::from("$$upd_new$$"));
                self.emit(Op::StoreLocal(new_slot));
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(obj_slot));
                self.emit(Op::LoadLocal(key_slot));
                self.emit(Op::LoadLocal(new_slot));
                self.emit(Op::SetProp);
                self.emit(Op::Pop);

                self.emit(Op::LoadLocal(if prefix { new_slot } else { old_slot }));
            }
            _ => {
                self.compile_expr(argument);
                match op {
                    UpdateOp::Inc => { self.emit(Op::Inc); }
                    UpdateOp::Dec => { self.emit(Op::Dec); }
                }
            }
        }
    }

    fn args_have_spread(args: &[Expr]) -> bool {
        args.iter().any(|a| matches!(a.kind, ExprKind::Spread(_)))
    }

    fn compile_args_as_array(&mut self, args: &[Expr]) {
        self.emit(Op::NewArray(0));
        for arg in args {
            if let ExprKind::Spread(inner) = &arg.kind {
                self.compile_expr(inner);
                self.emit(Op::Spread);
            } else {
                self.compile_expr(arg);
                self.emit(Op::ArrayPush);
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scope_mut().scope_depth += 1;
    }

    fn end_scope(&mut self) {
        let depth = self.scope().scope_depth;
        while self.scope().locals.last().map(|l| l.depth) == Some(depth) {
            self.scope_mut().locals.pop();
        }
        self.scope_mut().scope_depth -= 1;
    }
}

fn accessor_op(kind: PropKind, name_const: u16) -> Op {
    match kind {
        PropKind::Get => Op::DefineGetter(name_const),
        PropKind::Set => Op::DefineSetter(name_const),
        PropKind::Init | PropKind::Method => Op::SetPropNamed(name_const),
    }
}

fn logical_assign_kind(op: &AssignOp) -> Option<LogicalOp> {
    match op {
        AssignOp::AndAssign => Some(LogicalOp::And),
        AssignOp::OrAssign => Some(LogicalOp::Or),
        AssignOp::NullishAssign => Some(LogicalOp::NullishCoalesce),
        _ => None,
    }
}

fn binop_to_op(op: BinaryOp) -> Op {
    match op {
        BinaryOp::Add => Op::Add,
        BinaryOp::Sub => Op::Sub,
        BinaryOp::Mul => Op::Mul,
        BinaryOp::Div => Op::Div,
        BinaryOp::Mod => Op::Mod,
        BinaryOp::Exp => Op::Exp,
        BinaryOp::Eq => Op::Eq,
        BinaryOp::Ne => Op::Ne,
        BinaryOp::StrictEq => Op::StrictEq,
        BinaryOp::StrictNe => Op::StrictNe,
        BinaryOp::Lt => Op::Lt,
        BinaryOp::Le => Op::Le,
        BinaryOp::Gt => Op::Gt,
        BinaryOp::Ge => Op::Ge,
        BinaryOp::BitAnd => Op::BitAnd,
        BinaryOp::BitOr => Op::BitOr,
        BinaryOp::BitXor => Op::BitXor,
        BinaryOp::Shl => Op::Shl,
        BinaryOp::Shr => Op::Shr,
        BinaryOp::UShr => Op::UShr,
        BinaryOp::In => Op::In,
        BinaryOp::InstanceOf => Op::InstanceOf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(src: &str) -> Chunk {
        let tokens = Lexer::tokenize(src).unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        Compiler::new().compile(&program).unwrap()
    }

    #[test]
    fn compiles_arithmetic() {
        let chunk = compile("1 + 2 * 3;");
        assert!(chunk.code.iter().any(|op| matches!(op, Op::Mul)));
        assert!(chunk.code.iter().any(|op| matches!(op, Op::Add)));
    }

    #[test]
    fn compiles_closures_with_upvalues() {
        let chunk = compile("function outer() { let x = 1; return function() { return x; }; }");
        let has_closure = chunk.code.iter().any(|op| matches!(op, Op::Closure(_)));
        assert!(has_closure);
    }

    #[test]
    fn compiles_try_finally() {
        let chunk = compile("try { 1; } finally { 2; }");
        assert!(chunk.code.iter().any(|op| matches!(op, Op::TryCatch(_, _))));
    }
}
