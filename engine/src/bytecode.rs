//! Bytecode definitions for the stack-based virtual machine, plus a
//! self-describing binary serialization (`dump`/`load`) so a compiled
//! [`Chunk`] can be written to a file and reloaded without recompiling —
//! this is what the `qjsc`/`exec` CLI subcommands operate on.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::boxed::Box;

use crate::atom::AtomTable;
use crate::buffer::DynamicBuffer;

/// A single bytecode instruction.
#[derive(Debug, Clone)]
pub enum Op {
    LoadConst(u16),
    LoadUndefined,
    LoadNull,
    LoadTrue,
    LoadFalse,
    Pop,
    Dup,

    LoadLocal(u16),
    StoreLocal(u16),
    LoadGlobal(u16),
    StoreGlobal(u16),
    LoadUpvalue(u16),
    StoreUpvalue(u16),

    Add, Sub, Mul, Div, Mod, Exp, Neg, Pos,
    BitAnd, BitOr, BitXor, BitNot, Shl, Shr, UShr,
    Eq, Ne, StrictEq, StrictNe, Lt, Le, Gt, Ge,
    Not,

    Jump(i32),
    JumpIfTrue(i32),
    JumpIfFalse(i32),
    JumpIfNullish(i32),

    /// Call a function: `Call(arg_count)`. Callee is below args on stack.
    Call(u8),
    /// `Call(arg_count)` that yields `undefined` instead of throwing when
    /// the callee is nullish (`a?.()`).
    CallOptional(u8),
    CallMethod(u8),
    CallMethodOptional(u8),
    Return,
    Closure(u16),

    GetProp,
    SetProp,
    GetPropOptional,
    GetPropNamed(u16),
    SetPropNamed(u16),
    GetPropNamedOptional(u16),
    /// Define an accessor property: pops `[object, function]`, installs the
    /// getter/setter on `object`, pushes `object` back.
    DefineGetter(u16),
    DefineSetter(u16),
    NewObject,
    NewArray(u16),

    New(u8),

    Typeof,
    Void,
    Delete,
    InstanceOf,
    In,

    GetIterator,
    /// Pop the peeked iterator copy, advance it, push `done` as a bool.
    IterNext,
    /// Push the value produced by the most recent `IterNext` without
    /// popping the iterator still beneath it on the stack.
    IterValue,

    /// `TryCatch(catch_offset, finally_offset)`, offsets relative to current
    /// position; 0 means absent.
    TryCatch(i32, i32),
    TryEnd,
    Throw,

    Inc,
    Dec,

    LoadThis,

    Spread,

    /// Suspend the running generator/async frame, yielding top of stack.
    Yield,
    Await,

    /// Push `arguments[start..]` as a new array (used for both the full
    /// `arguments` object, `start=0`, and a rest parameter's trailing slice).
    LoadArgsArray(u16),
    /// Push the closure currently executing (named function expression
    /// self-reference).
    LoadSelf,
    /// Pop a value and push it onto the array currently below it on the
    /// stack (`[..., array, value] -> [..., array]`).
    ArrayPush,
    /// Pop a source object and copy its own enumerable properties onto the
    /// object below it (`[..., target, source] -> [..., target]`).
    ObjectSpread,
    /// Call with arguments already collected into a single array
    /// (`[..., callee, argsArray] -> [..., result]`).
    CallSpread,
    CallMethodSpread,

    Debugger,
    Nop,
}

/// Describes how a closure captures a variable from an enclosing scope.
#[derive(Debug, Clone, Copy)]
pub struct UpvalueRef {
    pub is_local: bool,
    pub index: u16,
}

/// A compiled function / code block.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub code: Vec<Op>,
    pub constants: Vec<Constant>,
    pub local_count: u16,
    pub param_count: u16,
    pub name: Option<String>,
    pub is_generator: bool,
    pub is_async: bool,
    /// `(instruction index, source line)` pairs, monotonic in both fields;
    /// used for stack-trace line numbers. Only populated on debug builds.
    pub line_table: Vec<(u32, u32)>,
    /// Upvalue capture descriptors, in the order the VM's closure-creation
    /// step should read them.
    pub upvalues: Vec<UpvalueRef>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk {
            code: Vec::new(),
            constants: Vec::new(),
            local_count: 0,
            param_count: 0,
            name: None,
            is_generator: false,
            is_async: false,
            line_table: Vec::new(),
            upvalues: Vec::new(),
        }
    }

    pub fn add_const(&mut self, c: Constant) -> u16 {
        for (i, existing) in self.constants.iter().enumerate() {
            if existing.eq_value(&c) {
                return i as u16;
            }
        }
        let idx = self.constants.len() as u16;
        self.constants.push(c);
        idx
    }

    pub fn emit(&mut self, op: Op) -> usize {
        let idx = self.code.len();
        self.code.push(op);
        idx
    }

    pub fn mark_line(&mut self, line: u32) {
        let pc = self.code.len() as u32;
        if self.line_table.last().map(|(_, l)| *l) != Some(line) {
            self.line_table.push((pc, line));
        }
    }

    pub fn offset(&self) -> usize {
        self.code.len()
    }

    /// Patch a jump instruction at `idx` to jump to the current offset.
    pub fn patch_jump(&mut self, idx: usize) {
        let target = self.code.len() as i32 - idx as i32 - 1;
        match &mut self.code[idx] {
            Op::Jump(ref mut off) => *off = target,
            Op::JumpIfTrue(ref mut off) => *off = target,
            Op::JumpIfFalse(ref mut off) => *off = target,
            Op::JumpIfNullish(ref mut off) => *off = target,
            _ => {}
        }
    }

    /// Patch a jump instruction at `idx` to jump to an explicit target offset
    /// (used when the target was computed separately from "current offset",
    /// e.g. patching a `for` loop's forward continue-jumps to the update
    /// expression's position).
    pub fn patch_jump_to_pos(&mut self, idx: usize, pos: usize) {
        let target = pos as i32 - idx as i32 - 1;
        match &mut self.code[idx] {
            Op::Jump(ref mut off) => *off = target,
            Op::JumpIfTrue(ref mut off) => *off = target,
            Op::JumpIfFalse(ref mut off) => *off = target,
            Op::JumpIfNullish(ref mut off) => *off = target,
            _ => {}
        }
    }

    /// Serialize to the self-describing binary chunk format: a small header
    /// followed by the constant pool, atom pool, and opcode stream. Every
    /// multi-byte operand is written big-endian.
    pub fn dump(&self, atoms: &AtomTable) -> Vec<u8> {
        let mut buf = DynamicBuffer::new();
        buf.append(b"JSC1");
        buf.push_u8(if self.is_generator { 1 } else { 0 });
        buf.push_u8(if self.is_async { 1 } else { 0 });
        buf.append(&self.local_count.to_be_bytes());
        buf.append(&self.param_count.to_be_bytes());

        buf.append(&(self.upvalues.len() as u32).to_be_bytes());
        for uv in &self.upvalues {
            buf.push_u8(if uv.is_local { 1 } else { 0 });
            buf.append(&uv.index.to_be_bytes());
        }

        buf.append(&(self.constants.len() as u32).to_be_bytes());
        for c in &self.constants {
            c.write(&mut buf, atoms);
        }

        let atom_slice = atoms.as_slice();
        buf.append(&(atom_slice.len() as u32).to_be_bytes());
        for s in atom_slice {
            write_str(&mut buf, s);
        }

        buf.append(&(self.code.len() as u32).to_be_bytes());
        for op in &self.code {
            write_op(&mut buf, op);
        }
        buf.to_byte_array()
    }

    pub fn load(bytes: &[u8]) -> Option<Chunk> {
        let mut r = Reader::new(bytes);
        if r.take(4)? != b"JSC1" {
            return None;
        }
        let is_generator = r.u8()? != 0;
        let is_async = r.u8()? != 0;
        let local_count = r.u16()?;
        let param_count = r.u16()?;

        let upvalue_count = r.u32()?;
        let mut upvalues = Vec::with_capacity(upvalue_count as usize);
        for _ in 0..upvalue_count {
            let is_local = r.u8()? != 0;
            let index = r.u16()?;
            upvalues.push(UpvalueRef { is_local, index });
        }

        let const_count = r.u32()?;
        let mut constants = Vec::with_capacity(const_count as usize);
        for _ in 0..const_count {
            constants.push(Constant::read(&mut r)?);
        }

        let atom_count = r.u32()?;
        let mut atoms = Vec::with_capacity(atom_count as usize);
        for _ in 0..atom_count {
            atoms.push(read_str(&mut r)?);
        }

        let op_count = r.u32()?;
        let mut code = Vec::with_capacity(op_count as usize);
        for _ in 0..op_count {
            code.push(read_op(&mut r)?);
        }

        // The atom pool is carried for format fidelity; a reloaded chunk's
        // property/global names live in its own constant pool, and the
        // interning side of the atom table is rebuilt by the owning
        // `Context`, not by the chunk itself.
        let _ = atoms;

        Some(Chunk {
            code,
            constants,
            local_count,
            param_count,
            name: None,
            is_generator,
            is_async,
            line_table: Vec::new(),
            upvalues,
        })
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant pool entry.
#[derive(Debug, Clone)]
pub enum Constant {
    Number(f64),
    BigInt(i64),
    String(String),
    Function(Box<Chunk>),
}

impl Constant {
    fn eq_value(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Number(a), Constant::Number(b)) => a.to_bits() == b.to_bits(),
            (Constant::BigInt(a), Constant::BigInt(b)) => a == b,
            (Constant::String(a), Constant::String(b)) => a == b,
            _ => false,
        }
    }

    fn write(&self, buf: &mut DynamicBuffer, atoms: &AtomTable) {
        match self {
            Constant::Number(n) => {
                buf.push_u8(0);
                buf.append(&n.to_be_bytes());
            }
            Constant::BigInt(n) => {
                buf.push_u8(1);
                buf.append(&n.to_be_bytes());
            }
            Constant::String(s) => {
                buf.push_u8(2);
                write_str(buf, s);
            }
            Constant::Function(chunk) => {
                buf.push_u8(3);
                let inner = chunk.dump(atoms);
                buf.append(&(inner.len() as u32).to_be_bytes());
                buf.append(&inner);
            }
        }
    }

    fn read(r: &mut Reader) -> Option<Constant> {
        match r.u8()? {
            0 => Some(Constant::Number(f64::from_be_bytes(r.take(8)?.try_into().ok()?))),
            1 => Some(Constant::BigInt(i64::from_be_bytes(r.take(8)?.try_into().ok()?))),
            2 => Some(Constant::String(read_str(r)?)),
            3 => {
                let len = r.u32()? as usize;
                let inner = r.take(len)?;
                Chunk::load(inner).map(|c| Constant::Function(Box::new(c)))
            }
            _ => None,
        }
    }
}

fn write_str(buf: &mut DynamicBuffer, s: &str) {
    buf.append(&(s.len() as u32).to_be_bytes());
    buf.append(s.as_bytes());
}

fn read_str(r: &mut Reader) -> Option<String> {
    let len = r.u32()? as usize;
    let bytes = r.take(len)?;
    core::str::from_utf8(bytes).ok().map(String::from)
}

macro_rules! opcode_table {
    ($($tag:expr => $variant:ident $( ( $($field:ident : $fty:ty),* ) )? ),* $(,)?) => {
        fn write_op(buf: &mut DynamicBuffer, op: &Op) {
            match op {
                $(
                    Op::$variant $( ( $($field),* ) )? => {
                        buf.push_u8($tag);
                        $( $( write_operand(buf, *$field); )* )?
                    }
                )*
            }
        }

        fn read_op(r: &mut Reader) -> Option<Op> {
            let tag = r.u8()?;
            match tag {
                $(
                    $tag => Some(Op::$variant $( ( $(read_operand::<$fty>(r)?),* ) )?),
                )*
                _ => None,
            }
        }
    };
}

trait Operand: Copy {
    fn write(self, buf: &mut DynamicBuffer);
    fn read(r: &mut Reader) -> Option<Self>;
}
impl Operand for u8 {
    fn write(self, buf: &mut DynamicBuffer) { buf.push_u8(self); }
    fn read(r: &mut Reader) -> Option<Self> { r.u8() }
}
impl Operand for u16 {
    fn write(self, buf: &mut DynamicBuffer) { buf.append(&self.to_be_bytes()); }
    fn read(r: &mut Reader) -> Option<Self> { r.u16() }
}
impl Operand for i32 {
    fn write(self, buf: &mut DynamicBuffer) { buf.append(&self.to_be_bytes()); }
    fn read(r: &mut Reader) -> Option<Self> { r.i32() }
}

fn write_operand<T: Operand>(buf: &mut DynamicBuffer, v: T) {
    v.write(buf);
}
fn read_operand<T: Operand>(r: &mut Reader) -> Option<T> {
    T::read(r)
}

opcode_table! {
    0x00 => LoadConst(a: u16),
    0x01 => LoadUndefined,
    0x02 => LoadNull,
    0x03 => LoadTrue,
    0x04 => LoadFalse,
    0x05 => Pop,
    0x06 => Dup,
    0x07 => LoadLocal(a: u16),
    0x08 => StoreLocal(a: u16),
    0x09 => LoadGlobal(a: u16),
    0x0a => StoreGlobal(a: u16),
    0x0b => LoadUpvalue(a: u16),
    0x0c => StoreUpvalue(a: u16),
    0x0d => Add,
    0x0e => Sub,
    0x0f => Mul,
    0x10 => Div,
    0x11 => Mod,
    0x12 => Exp,
    0x13 => Neg,
    0x14 => Pos,
    0x15 => BitAnd,
    0x16 => BitOr,
    0x17 => BitXor,
    0x18 => BitNot,
    0x19 => Shl,
    0x1a => Shr,
    0x1b => UShr,
    0x1c => Eq,
    0x1d => Ne,
    0x1e => StrictEq,
    0x1f => StrictNe,
    0x20 => Lt,
    0x21 => Le,
    0x22 => Gt,
    0x23 => Ge,
    0x24 => Not,
    0x25 => Jump(a: i32),
    0x26 => JumpIfTrue(a: i32),
    0x27 => JumpIfFalse(a: i32),
    0x28 => JumpIfNullish(a: i32),
    0x29 => Call(a: u8),
    0x2a => CallOptional(a: u8),
    0x2b => CallMethod(a: u8),
    0x2c => CallMethodOptional(a: u8),
    0x2d => Return,
    0x2e => Closure(a: u16),
    0x2f => GetProp,
    0x30 => SetProp,
    0x31 => GetPropOptional,
    0x32 => GetPropNamed(a: u16),
    0x33 => SetPropNamed(a: u16),
    0x34 => GetPropNamedOptional(a: u16),
    0x35 => NewObject,
    0x36 => NewArray(a: u16),
    0x37 => New(a: u8),
    0x38 => Typeof,
    0x39 => Void,
    0x3a => Delete,
    0x3b => InstanceOf,
    0x3c => In,
    0x3d => GetIterator,
    0x3e => IterNext,
    0x52 => IterValue,
    0x53 => DefineGetter(a: u16),
    0x54 => DefineSetter(a: u16),
    0x3f => TryCatch(a: i32, b: i32),
    0x40 => TryEnd,
    0x41 => Throw,
    0x42 => Inc,
    0x43 => Dec,
    0x44 => LoadThis,
    0x46 => Spread,
    0x47 => Yield,
    0x48 => Await,
    0x4a => Debugger,
    0x4b => Nop,
    0x4c => LoadArgsArray(a: u16),
    0x4d => LoadSelf,
    0x4e => ArrayPush,
    0x4f => ObjectSpread,
    0x50 => CallSpread,
    0x51 => CallMethodSpread,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.pos + n > self.bytes.len() { return None; }
        let s = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Some(s)
    }
    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }
    fn u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }
    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
    fn i32(&mut self) -> Option<i32> {
        self.u32().map(|v| v as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_dump_and_load() {
        let mut atoms = AtomTable::new();
        let name_atom = atoms.intern("x");
        let mut chunk = Chunk::new();
        let idx = chunk.add_const(Constant::Number(42.0));
        chunk.emit(Op::LoadConst(idx));
        chunk.emit(Op::StoreGlobal(name_atom.0 as u16));
        chunk.emit(Op::Return);

        let bytes = chunk.dump(&atoms);
        let reloaded = Chunk::load(&bytes).unwrap();
        assert_eq!(reloaded.code.len(), chunk.code.len());
        assert_eq!(reloaded.constants.len(), chunk.constants.len());
    }

    #[test]
    fn jump_patching_computes_relative_offset() {
        let mut chunk = Chunk::new();
        let j = chunk.emit(Op::JumpIfFalse(0));
        chunk.emit(Op::LoadTrue);
        chunk.patch_jump(j);
        match chunk.code[j] {
            Op::JumpIfFalse(off) => assert_eq!(off, 1),
            _ => panic!("wrong opcode"),
        }
    }
}
