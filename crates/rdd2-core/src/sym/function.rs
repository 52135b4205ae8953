//! Named functions
//!
//! A [`Function`] binds a name, ordered named inputs and ordered named outputs
//! to an expression graph. On construction the graph is linearised into a
//! [`Tape`]: one instruction per distinct node, in dependency order. The tape
//! is what both the numeric evaluator and the code generator consume, so the
//! two share one semantics.

use std::collections::{HashMap, HashSet};

use super::expr::{BinaryOp, Expr, Node, SymbolId, UnaryOp};
use super::vector::Elements;
use crate::error::GraphError;

/// Named, ordered list of scalar expressions
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
    elements: Vec<Expr>,
}

impl Signal {
    pub fn new<T: Elements + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        Self {
            name: name.into(),
            elements: value.elements(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Expr] {
        &self.elements
    }
}

/// Name and dimension of a function argument or result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub size: usize,
}

/// One step of a linearised expression graph
///
/// Operands refer to the work slot written by an earlier instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Constant(f64),
    Input { port: usize, index: usize },
    Unary(UnaryOp, usize),
    Binary(BinaryOp, usize, usize),
    Select {
        condition: usize,
        if_true: usize,
        if_false: usize,
    },
}

/// Linearised expression graph
#[derive(Debug, Clone)]
pub struct Tape {
    instructions: Vec<Instruction>,
    outputs: Vec<Vec<usize>>,
}

impl Tape {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Work slots holding the elements of output `port`
    pub fn output_slots(&self, port: usize) -> &[usize] {
        &self.outputs[port]
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Run the tape; argument shapes must already be checked
    fn evaluate(&self, args: &[&[f64]]) -> Vec<Vec<f64>> {
        let mut work: Vec<f64> = Vec::with_capacity(self.instructions.len());
        for instruction in &self.instructions {
            let value = match *instruction {
                Instruction::Constant(v) => v,
                Instruction::Input { port, index } => args[port][index],
                Instruction::Unary(op, a) => op.apply(work[a]),
                Instruction::Binary(op, a, b) => op.apply(work[a], work[b]),
                Instruction::Select {
                    condition,
                    if_true,
                    if_false,
                } => {
                    if work[condition] != 0.0 {
                        work[if_true]
                    } else {
                        work[if_false]
                    }
                }
            };
            work.push(value);
        }

        self.outputs
            .iter()
            .map(|slots| slots.iter().map(|&s| work[s]).collect())
            .collect()
    }
}

/// Named pure function of its declared inputs
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    tape: Tape,
}

impl Function {
    /// Build a function from its inputs and outputs
    ///
    /// Inputs must consist of distinct symbols, and every output must be
    /// computable from those symbols and constants alone.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Signal>,
        outputs: Vec<Signal>,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(GraphError::InvalidName(name));
        }

        let mut port_names = HashSet::new();
        for signal in inputs.iter().chain(outputs.iter()) {
            if !is_identifier(&signal.name) {
                return Err(GraphError::InvalidName(signal.name.clone()));
            }
            if !port_names.insert(signal.name.as_str()) {
                return Err(GraphError::DuplicatePort {
                    function: name,
                    port: signal.name.clone(),
                });
            }
            if signal.is_empty() {
                return Err(GraphError::EmptySignal {
                    function: name,
                    port: signal.name.clone(),
                });
            }
        }

        let mut builder = TapeBuilder::new(&name);
        for (port, signal) in inputs.iter().enumerate() {
            builder.declare_input(port, signal)?;
        }

        let mut output_slots = Vec::with_capacity(outputs.len());
        for signal in &outputs {
            let slots = signal
                .elements
                .iter()
                .map(|e| builder.slot_of(e))
                .collect::<Result<Vec<_>, _>>()?;
            output_slots.push(slots);
        }

        let tape = Tape {
            instructions: builder.finish(),
            outputs: output_slots,
        };
        log::debug!("function {}: {} instructions", name, tape.len());

        Ok(Self {
            name,
            inputs: inputs.iter().map(to_port).collect(),
            outputs: outputs.iter().map(to_port).collect(),
            tape,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn n_in(&self) -> usize {
        self.inputs.len()
    }

    pub fn n_out(&self) -> usize {
        self.outputs.len()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Numeric evaluation
    ///
    /// `args` holds one slice per input, in declaration order. Returns one
    /// vector per output.
    pub fn call(&self, args: &[&[f64]]) -> Result<Vec<Vec<f64>>, GraphError> {
        if args.len() != self.inputs.len() {
            return Err(GraphError::ArityMismatch {
                function: self.name.clone(),
                expected: self.inputs.len(),
                found: args.len(),
            });
        }
        for (port, arg) in self.inputs.iter().zip(args) {
            if arg.len() != port.size {
                return Err(GraphError::ShapeMismatch {
                    function: self.name.clone(),
                    port: port.name.clone(),
                    expected: port.size,
                    found: arg.len(),
                });
            }
        }
        Ok(self.tape.evaluate(args))
    }
}

fn to_port(signal: &Signal) -> Port {
    Port {
        name: signal.name.clone(),
        size: signal.len(),
    }
}

/// C identifier check, applied to function and port names
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct TapeBuilder<'a> {
    function: &'a str,
    symbols: HashMap<(SymbolId, usize), (usize, usize)>,
    input_slots: HashMap<(usize, usize), usize>,
    constants: HashMap<u64, usize>,
    slots: HashMap<usize, usize>,
    instructions: Vec<Instruction>,
}

impl<'a> TapeBuilder<'a> {
    fn new(function: &'a str) -> Self {
        Self {
            function,
            symbols: HashMap::new(),
            input_slots: HashMap::new(),
            constants: HashMap::new(),
            slots: HashMap::new(),
            instructions: Vec::new(),
        }
    }

    fn declare_input(&mut self, port: usize, signal: &Signal) -> Result<(), GraphError> {
        for (index, element) in signal.elements.iter().enumerate() {
            match element.node() {
                Node::Symbol {
                    id,
                    name,
                    index: element_index,
                } => {
                    if self
                        .symbols
                        .insert((*id, *element_index), (port, index))
                        .is_some()
                    {
                        return Err(GraphError::DuplicateSymbol {
                            function: self.function.to_string(),
                            symbol: name.to_string(),
                            index: *element_index,
                        });
                    }
                }
                _ => {
                    return Err(GraphError::InputNotSymbolic {
                        function: self.function.to_string(),
                        port: signal.name.clone(),
                        index,
                    })
                }
            }
        }
        Ok(())
    }

    /// Work slot computing `root`, emitting any missing instructions
    fn slot_of(&mut self, root: &Expr) -> Result<usize, GraphError> {
        let mut stack = vec![(root.clone(), false)];
        while let Some((expr, expanded)) = stack.pop() {
            if self.slots.contains_key(&expr.key()) {
                continue;
            }
            if expanded {
                let slot = self.lower(&expr)?;
                self.slots.insert(expr.key(), slot);
            } else {
                let children = children(&expr);
                stack.push((expr, true));
                for child in children {
                    if !self.slots.contains_key(&child.key()) {
                        stack.push((child, false));
                    }
                }
            }
        }
        Ok(self.slots[&root.key()])
    }

    fn lower(&mut self, expr: &Expr) -> Result<usize, GraphError> {
        let instruction = match expr.node() {
            Node::Constant(v) => {
                if let Some(&slot) = self.constants.get(&v.to_bits()) {
                    return Ok(slot);
                }
                let slot = self.push(Instruction::Constant(*v));
                self.constants.insert(v.to_bits(), slot);
                return Ok(slot);
            }
            Node::Symbol { id, name, index } => {
                let &(port, element) = self.symbols.get(&(*id, *index)).ok_or_else(|| {
                    GraphError::FreeSymbol {
                        function: self.function.to_string(),
                        symbol: name.to_string(),
                        index: *index,
                    }
                })?;
                if let Some(&slot) = self.input_slots.get(&(port, element)) {
                    return Ok(slot);
                }
                let slot = self.push(Instruction::Input {
                    port,
                    index: element,
                });
                self.input_slots.insert((port, element), slot);
                return Ok(slot);
            }
            Node::Unary(op, a) => Instruction::Unary(*op, self.slots[&a.key()]),
            Node::Binary(op, a, b) => {
                Instruction::Binary(*op, self.slots[&a.key()], self.slots[&b.key()])
            }
            Node::Select {
                condition,
                if_true,
                if_false,
            } => Instruction::Select {
                condition: self.slots[&condition.key()],
                if_true: self.slots[&if_true.key()],
                if_false: self.slots[&if_false.key()],
            },
        };
        Ok(self.push(instruction))
    }

    fn finish(self) -> Vec<Instruction> {
        self.instructions
    }

    fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }
}

fn children(expr: &Expr) -> Vec<Expr> {
    match expr.node() {
        Node::Constant(_) | Node::Symbol { .. } => Vec::new(),
        Node::Unary(_, a) => vec![a.clone()],
        Node::Binary(_, a, b) => vec![a.clone(), b.clone()],
        Node::Select {
            condition,
            if_true,
            if_false,
        } => vec![condition.clone(), if_true.clone(), if_false.clone()],
    }
}
