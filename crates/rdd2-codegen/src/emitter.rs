//! C emitter for linearised functions
//!
//! Every function is emitted with the calling convention
//!
//! ```text
//! int name(const rdd2_real** arg, rdd2_real** res, rdd2_int* iw, rdd2_real* w, int mem)
//! ```
//!
//! One tape instruction becomes one assignment to a work slot `a[k]`. Slots
//! live in the caller's `w` when `avoid_stack` is set and in a local array
//! otherwise. A null `arg[i]` reads as zeros and a null `res[i]` is skipped.

use std::fmt::Write;

use rdd2_core::sym::{BinaryOp, Function, Instruction, UnaryOp};

use crate::error::CodegenError;
use crate::options::CodegenOptions;

pub const REAL: &str = "rdd2_real";
pub const INT: &str = "rdd2_int";
pub const EXPORT: &str = "RDD2_SYMBOL_EXPORT";

/// Type macros shared by the source and the header
pub fn preamble(out: &mut String, options: &CodegenOptions) -> Result<(), CodegenError> {
    writeln!(out, "#ifndef {REAL}")?;
    writeln!(out, "#define {REAL} {}", options.real_type)?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {INT}")?;
    writeln!(out, "#define {INT} long long int")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;

    if options.with_export {
        writeln!(out, "#ifndef {EXPORT}")?;
        writeln!(out, "#if defined(_WIN32) || defined(__WIN32__) || defined(__CYGWIN__)")?;
        writeln!(out, "#define {EXPORT} __declspec(dllexport)")?;
        writeln!(out, "#elif defined(__GNUC__)")?;
        writeln!(out, "#define {EXPORT} __attribute__ ((visibility (\"default\")))")?;
        writeln!(out, "#else")?;
        writeln!(out, "#define {EXPORT}")?;
        writeln!(out, "#endif")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Prototypes of the entry point and its metadata functions
pub struct Prototypes {
    pub entry: String,
    pub work: String,
    pub n_in: String,
    pub n_out: String,
    pub name_in: String,
    pub name_out: String,
}

impl Prototypes {
    pub fn new(function: &Function, options: &CodegenOptions) -> Self {
        let name = function.name();
        let export = if options.with_export {
            format!("{EXPORT} ")
        } else {
            String::new()
        };
        Self {
            entry: format!(
                "{export}int {name}(const {REAL}** arg, {REAL}** res, {INT}* iw, {REAL}* w, int mem)"
            ),
            work: format!(
                "{export}int {name}_work({INT}* sz_arg, {INT}* sz_res, {INT}* sz_iw, {INT}* sz_w)"
            ),
            n_in: format!("{export}{INT} {name}_n_in(void)"),
            n_out: format!("{export}{INT} {name}_n_out(void)"),
            name_in: format!("{export}const char* {name}_name_in({INT} i)"),
            name_out: format!("{export}const char* {name}_name_out({INT} i)"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.entry,
            &self.work,
            &self.n_in,
            &self.n_out,
            &self.name_in,
            &self.name_out,
        ]
        .into_iter()
        .map(String::as_str)
    }
}

/// Header declarations for `function`
pub fn declarations(
    out: &mut String,
    function: &Function,
    options: &CodegenOptions,
) -> Result<(), CodegenError> {
    for prototype in Prototypes::new(function, options).iter() {
        writeln!(out, "{prototype};")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Full definition of `function` and its metadata functions
pub fn definition(
    out: &mut String,
    function: &Function,
    options: &CodegenOptions,
) -> Result<(), CodegenError> {
    let prototypes = Prototypes::new(function, options);
    let tape = function.tape();

    if options.verbose {
        writeln!(out, "/* {} */", describe(function))?;
    }
    writeln!(out, "{} {{", prototypes.entry)?;
    if options.avoid_stack {
        writeln!(out, "  {REAL}* a = w;")?;
    } else {
        writeln!(out, "  {REAL} a[{}];", tape.len())?;
        writeln!(out, "  (void)w;")?;
    }
    writeln!(out, "  (void)iw;")?;
    writeln!(out, "  (void)mem;")?;

    for (slot, instruction) in tape.instructions().iter().enumerate() {
        write!(out, "  a[{slot}] = {};", expression(function, instruction)?)?;
        if options.verbose {
            write!(out, " /* {} */", comment(function, instruction))?;
        }
        writeln!(out)?;
    }

    for (port, output) in function.outputs().iter().enumerate() {
        if options.verbose {
            writeln!(out, "  /* output {} */", output.name)?;
        }
        writeln!(out, "  if (res[{port}] != 0) {{")?;
        for (index, slot) in tape.output_slots(port).iter().enumerate() {
            writeln!(out, "    res[{port}][{index}] = a[{slot}];")?;
        }
        writeln!(out, "  }}")?;
    }
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    let work_size = if options.avoid_stack { tape.len() } else { 0 };
    writeln!(out, "{} {{", prototypes.work)?;
    writeln!(out, "  if (sz_arg) *sz_arg = {};", function.n_in())?;
    writeln!(out, "  if (sz_res) *sz_res = {};", function.n_out())?;
    writeln!(out, "  if (sz_iw) *sz_iw = 0;")?;
    writeln!(out, "  if (sz_w) *sz_w = {work_size};")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "{} {{ return {}; }}", prototypes.n_in, function.n_in())?;
    writeln!(out)?;
    writeln!(out, "{} {{ return {}; }}", prototypes.n_out, function.n_out())?;
    writeln!(out)?;

    name_switch(out, &prototypes.name_in, function.inputs().iter().map(|p| p.name.as_str()))?;
    name_switch(out, &prototypes.name_out, function.outputs().iter().map(|p| p.name.as_str()))?;
    Ok(())
}

fn name_switch<'a>(
    out: &mut String,
    prototype: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CodegenError> {
    writeln!(out, "{prototype} {{")?;
    writeln!(out, "  switch (i) {{")?;
    for (i, name) in names.enumerate() {
        writeln!(out, "    case {i}: return \"{name}\";")?;
    }
    writeln!(out, "    default: return 0;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// `name:(q[4],q_r[4])->(omega[3])`
fn describe(function: &Function) -> String {
    let ports = |ports: &[rdd2_core::sym::Port]| {
        ports
            .iter()
            .map(|p| format!("{}[{}]", p.name, p.size))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "{}:({})->({})",
        function.name(),
        ports(function.inputs()),
        ports(function.outputs())
    )
}

/// Right-hand side of the assignment for one instruction
fn expression(function: &Function, instruction: &Instruction) -> Result<String, CodegenError> {
    let text = match *instruction {
        Instruction::Constant(value) => {
            if !value.is_finite() {
                return Err(CodegenError::NonFiniteConstant {
                    function: function.name().to_string(),
                    value,
                });
            }
            format!("{value:e}")
        }
        Instruction::Input { port, index } => format!("arg[{port}] ? arg[{port}][{index}] : 0"),
        Instruction::Unary(op, a) => format!("{}(a[{a}])", unary(op)),
        Instruction::Binary(op, a, b) => match binary(op) {
            Binary::Infix(symbol) => format!("a[{a}] {symbol} a[{b}]"),
            Binary::Call(name) => format!("{name}(a[{a}], a[{b}])"),
        },
        Instruction::Select {
            condition,
            if_true,
            if_false,
        } => format!("a[{condition}] ? a[{if_true}] : a[{if_false}]"),
    };
    Ok(text)
}

fn comment(function: &Function, instruction: &Instruction) -> String {
    match *instruction {
        Instruction::Constant(_) => "const".to_string(),
        Instruction::Input { port, index } => {
            format!("{}[{index}]", function.inputs()[port].name)
        }
        Instruction::Unary(op, _) => format!("{op:?}").to_lowercase(),
        Instruction::Binary(op, _, _) => format!("{op:?}").to_lowercase(),
        Instruction::Select { .. } => "select".to_string(),
    }
}

/// Prefix operator or libm function applied to one operand
fn unary(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::Sqrt => "sqrt",
        UnaryOp::Sin => "sin",
        UnaryOp::Cos => "cos",
        UnaryOp::Tan => "tan",
        UnaryOp::Asin => "asin",
        UnaryOp::Acos => "acos",
        UnaryOp::Atan => "atan",
        UnaryOp::Abs => "fabs",
    }
}

enum Binary {
    Infix(&'static str),
    Call(&'static str),
}

fn binary(op: BinaryOp) -> Binary {
    match op {
        BinaryOp::Add => Binary::Infix("+"),
        BinaryOp::Sub => Binary::Infix("-"),
        BinaryOp::Mul => Binary::Infix("*"),
        BinaryOp::Div => Binary::Infix("/"),
        BinaryOp::Lt => Binary::Infix("<"),
        BinaryOp::Le => Binary::Infix("<="),
        BinaryOp::Gt => Binary::Infix(">"),
        BinaryOp::Ge => Binary::Infix(">="),
        BinaryOp::Eq => Binary::Infix("=="),
        BinaryOp::And => Binary::Infix("&&"),
        BinaryOp::Or => Binary::Infix("||"),
        BinaryOp::Atan2 => Binary::Call("atan2"),
        BinaryOp::Min => Binary::Call("fmin"),
        BinaryOp::Max => Binary::Call("fmax"),
    }
}
