//! Typed circuits and the textual circuit form.
//!
//! The text grammar is one instruction per line: a gate name, optional
//! parenthesised gate arguments, an optional bracketed tag, and
//! whitespace-separated integer qubit targets, e.g.
//!
//! ```text
//! R 0 1
//! H 0
//! X_ERROR(0.125) 0 1
//! I[leaky<0>] 0 1
//! REPEAT 3 {
//!     CX 0 1
//!     M 0 1
//! }
//! ```
//!
//! `#` starts a comment. Annotation instructions (DETECTOR, TICK, ...) are
//! accepted and discarded. Unknown gate names are rejected at parse time;
//! measurement bases outside Z parse fine and are rejected at execution time.

use std::fmt;
use std::str::FromStr;

use paulitab::GateKind;

use crate::error::LeakyError;

/// Index of a qubit in a circuit or simulator.
pub type QubitId = usize;

/// Annotations that carry no simulation semantics and are dropped by the
/// parser.
const ANNOTATIONS: [&str; 6] = [
    "DETECTOR",
    "MPAD",
    "OBSERVABLE_INCLUDE",
    "QUBIT_COORDS",
    "SHIFT_COORDS",
    "TICK",
];

/// One executable circuit instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub gate: GateKind,
    pub args: Vec<f64>,
    pub tag: Option<String>,
    pub targets: Vec<QubitId>,
}

impl Instruction {
    #[must_use]
    pub fn new(gate: GateKind, targets: Vec<QubitId>) -> Self {
        Instruction {
            gate,
            args: Vec::new(),
            tag: None,
            targets,
        }
    }

    /// Builder: attach a bracketed tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Builder: attach parenthesised gate arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<f64>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn max_target(&self) -> Option<QubitId> {
        self.targets.iter().copied().max()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        if let Some(tag) = &self.tag {
            write!(f, "[{tag}]")?;
        }
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (index, arg) in self.args.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        for target in &self.targets {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// One entry of a circuit: a plain instruction or a repeat block.
#[derive(Clone, Debug, PartialEq)]
pub enum CircuitEntry {
    Instruction(Instruction),
    Repeat { repetitions: usize, body: Circuit },
}

/// An ordered list of instructions and repeat blocks.
#[derive(Clone, Debug, PartialEq, Default)]
#[must_use]
pub struct Circuit {
    entries: Vec<CircuitEntry>,
}

impl Circuit {
    pub fn new() -> Self {
        Circuit::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Circuit {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.entries.push(CircuitEntry::Instruction(instruction));
    }

    pub fn push_repeat(&mut self, repetitions: usize, body: Circuit) {
        self.entries.push(CircuitEntry::Repeat { repetitions, body });
    }

    pub fn iter(&self) -> impl Iterator<Item = &CircuitEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of qubits the circuit touches: one past the largest target.
    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                CircuitEntry::Instruction(instruction) => {
                    instruction.max_target().map_or(0, |target| target + 1)
                }
                CircuitEntry::Repeat { body, .. } => body.num_qubits(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Number of measurement record entries one execution produces.
    #[must_use]
    pub fn num_measurements(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                CircuitEntry::Instruction(instruction) if instruction.gate.produces_measurements() => {
                    instruction.targets.len()
                }
                CircuitEntry::Instruction(_) => 0,
                CircuitEntry::Repeat { repetitions, body } => repetitions * body.num_measurements(),
            })
            .sum()
    }

    /// A copy of this circuit with every repeat block expanded in place.
    pub fn flattened(&self) -> Circuit {
        let mut flat = Circuit::new();
        self.flatten_into(&mut flat);
        flat
    }

    fn flatten_into(&self, out: &mut Circuit) {
        for entry in &self.entries {
            match entry {
                CircuitEntry::Instruction(instruction) => out.push(instruction.clone()),
                CircuitEntry::Repeat { repetitions, body } => {
                    for _ in 0..*repetitions {
                        body.flatten_into(out);
                    }
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                CircuitEntry::Instruction(instruction) => {
                    writeln!(f, "{:indent$}{instruction}", "", indent = indent)?;
                }
                CircuitEntry::Repeat { repetitions, body } => {
                    writeln!(f, "{:indent$}REPEAT {repetitions} {{", "", indent = indent)?;
                    body.fmt_indented(f, indent + 4)?;
                    writeln!(f, "{:indent$}}}", "", indent = indent)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl FromStr for Circuit {
    type Err = LeakyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        // Stack of enclosing repeat blocks: (repetitions, entries collected
        // before the block opened).
        let mut stack: Vec<(usize, Vec<CircuitEntry>)> = Vec::new();
        let mut current: Vec<CircuitEntry> = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line == "}" {
                let Some((repetitions, parent)) = stack.pop() else {
                    return Err(LeakyError::invalid_argument("unmatched '}' in circuit"));
                };
                let body = Circuit {
                    entries: std::mem::replace(&mut current, parent),
                };
                current.push(CircuitEntry::Repeat { repetitions, body });
                continue;
            }
            if let Some(rest) = line.strip_prefix("REPEAT") {
                let rest = rest.trim();
                let Some(count_text) = rest.strip_suffix('{') else {
                    return Err(LeakyError::invalid_argument(format!(
                        "expected '{{' at the end of repeat line {line:?}"
                    )));
                };
                let repetitions = count_text.trim().parse::<usize>().map_err(|_| {
                    LeakyError::invalid_argument(format!("bad repeat count in line {line:?}"))
                })?;
                stack.push((repetitions, std::mem::take(&mut current)));
                continue;
            }
            let head = line.split_whitespace().next().unwrap_or("");
            let name = head
                .split(['(', '['])
                .next()
                .unwrap_or("");
            if ANNOTATIONS.contains(&name) {
                continue;
            }
            current.push(CircuitEntry::Instruction(parse_instruction(line)?));
        }

        if !stack.is_empty() {
            return Err(LeakyError::invalid_argument("unterminated REPEAT block"));
        }
        Ok(Circuit { entries: current })
    }
}

fn parse_instruction(line: &str) -> Result<Instruction, LeakyError> {
    let mut tokens = line.split_whitespace();
    let head = tokens
        .next()
        .ok_or_else(|| LeakyError::invalid_argument("empty instruction"))?;

    let name_end = head.find(['(', '[']).unwrap_or(head.len());
    let (name, mut decorations) = head.split_at(name_end);
    let gate = GateKind::from_name(name)
        .ok_or_else(|| LeakyError::invalid_argument(format!("unknown instruction name {name:?}")))?;

    let mut args = Vec::new();
    let mut tag = None;
    while !decorations.is_empty() {
        if let Some(rest) = decorations.strip_prefix('(') {
            let close = rest
                .find(')')
                .ok_or_else(|| LeakyError::invalid_argument(format!("unterminated '(' in {head:?}")))?;
            for piece in rest[..close].split(',') {
                let value = piece.trim().parse::<f64>().map_err(|_| {
                    LeakyError::invalid_argument(format!("bad gate argument {piece:?} in {head:?}"))
                })?;
                args.push(value);
            }
            decorations = &rest[close + 1..];
        } else if let Some(rest) = decorations.strip_prefix('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| LeakyError::invalid_argument(format!("unterminated '[' in {head:?}")))?;
            tag = Some(rest[..close].to_owned());
            decorations = &rest[close + 1..];
        } else {
            return Err(LeakyError::invalid_argument(format!(
                "unexpected trailing text in {head:?}"
            )));
        }
    }

    let mut targets = Vec::new();
    for token in tokens {
        let target = token.parse::<QubitId>().map_err(|_| {
            LeakyError::invalid_argument(format!("bad qubit target {token:?} in line {line:?}"))
        })?;
        targets.push(target);
    }

    Ok(Instruction {
        gate,
        args,
        tag,
        targets,
    })
}
