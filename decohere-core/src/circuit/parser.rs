//! Stim circuit text parser
//!
//! # Supported Syntax
//!
//! ```text
//! # comment
//! NAME(arg, arg, ...) target target ...
//! REPEAT N {
//!     ...
//! }
//! ```
//!
//! Targets are qubit indices (`5`), inverted qubits (`!5`), measurement
//! records (`rec[-3]`), Pauli targets (`X5`, `!Z2`) and the product combiner
//! (`*`). Operation names are case-insensitive.

use super::{Circuit, Instruction, PauliKind, Target};
use crate::gate::Gate;
use crate::{DecoherenceError, QubitId, Result};

/// Parse circuit text
///
/// # Errors
/// `Parse` for malformed lines, `StructuralError` for unbalanced braces or a
/// zero repeat count
pub fn parse_circuit(text: &str) -> Result<Circuit> {
    // Each open block keeps its repeat count and the line it started on.
    let mut stack: Vec<(usize, usize, Circuit)> = Vec::new();
    let mut current = Circuit::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line == "}" {
            let (count, _, parent) = stack.pop().ok_or_else(|| {
                DecoherenceError::structural(format!("unmatched '}}' on line {}", line_no))
            })?;
            let body = std::mem::replace(&mut current, parent);
            current.push_repeat(count, body)?;
            continue;
        }

        if let Some(count) = parse_repeat_header(line, line_no)? {
            if count == 0 {
                return Err(DecoherenceError::structural(format!(
                    "REPEAT 0 on line {}",
                    line_no
                )));
            }
            let parent = std::mem::take(&mut current);
            stack.push((count, line_no, parent));
            continue;
        }

        current.push(parse_instruction(line, line_no)?);
    }

    if let Some((_, opened_on, _)) = stack.last() {
        return Err(DecoherenceError::structural(format!(
            "REPEAT block opened on line {} is never closed",
            opened_on
        )));
    }

    Ok(current)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Returns the count if `line` opens a `REPEAT` block
fn parse_repeat_header(line: &str, line_no: usize) -> Result<Option<usize>> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some(w) if w.eq_ignore_ascii_case("REPEAT") => {}
        _ => return Ok(None),
    }
    let count_str = words
        .next()
        .ok_or_else(|| DecoherenceError::parse(line_no, "REPEAT without a count"))?;
    // Allow `REPEAT 5{`
    let (count_str, brace_attached) = match count_str.strip_suffix('{') {
        Some(stripped) => (stripped, true),
        None => (count_str, false),
    };
    let count: usize = count_str.parse().map_err(|_| {
        DecoherenceError::parse(line_no, format!("invalid REPEAT count '{}'", count_str))
    })?;
    let rest: Vec<&str> = words.collect();
    let ok = if brace_attached {
        rest.is_empty()
    } else {
        rest == ["{"]
    };
    if !ok {
        return Err(DecoherenceError::parse(
            line_no,
            "expected '{' after REPEAT count",
        ));
    }
    Ok(Some(count))
}

/// Parse a single `NAME(args) targets` line
pub fn parse_instruction(line: &str, line_no: usize) -> Result<Instruction> {
    let name_end = line
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DecoherenceError::parse(
            line_no,
            format!("invalid operation name '{}'", name),
        ));
    }

    let mut rest = line[name_end..].trim_start();
    let mut args = Vec::new();
    if let Some(after_paren) = rest.strip_prefix('(') {
        let close = after_paren.find(')').ok_or_else(|| {
            DecoherenceError::parse(line_no, "missing closing parenthesis")
        })?;
        let arg_str = after_paren[..close].trim();
        if !arg_str.is_empty() {
            for token in arg_str.split(',') {
                let token = token.trim();
                let value: f64 = token.parse().map_err(|_| {
                    DecoherenceError::parse(line_no, format!("invalid argument '{}'", token))
                })?;
                args.push(value);
            }
        }
        rest = &after_paren[close + 1..];
    }

    let spaced = rest.replace('*', " * ");
    let targets = spaced
        .split_whitespace()
        .map(|token| parse_target(token, line_no))
        .collect::<Result<Vec<_>>>()?;

    let instruction = Instruction::new(name, &args, &targets);
    if instruction.gate() == Some(Gate::ObservableInclude) {
        instruction
            .observable_index()
            .map_err(|e| DecoherenceError::parse(line_no, e.to_string()))?;
    }
    Ok(instruction)
}

fn parse_target(token: &str, line_no: usize) -> Result<Target> {
    if token == "*" {
        return Ok(Target::Combiner);
    }
    if let Some(inner) = token
        .strip_prefix("rec[-")
        .and_then(|s| s.strip_suffix(']'))
    {
        let k: usize = inner.parse().map_err(|_| {
            DecoherenceError::parse(line_no, format!("invalid record target '{}'", token))
        })?;
        if k == 0 {
            return Err(DecoherenceError::parse(line_no, "record lookback must be at least 1"));
        }
        return Ok(Target::Record(k));
    }
    if token.starts_with("sweep[") {
        return Err(DecoherenceError::parse(
            line_no,
            format!("sweep targets are not supported ('{}')", token),
        ));
    }

    let (inverted, body) = match token.strip_prefix('!') {
        Some(b) => (true, b),
        None => (false, token),
    };
    let (pauli, digits) = match body.chars().next() {
        Some('X') | Some('x') => (Some(PauliKind::X), &body[1..]),
        Some('Y') | Some('y') => (Some(PauliKind::Y), &body[1..]),
        Some('Z') | Some('z') => (Some(PauliKind::Z), &body[1..]),
        _ => (None, body),
    };
    let qubit: usize = digits.parse().map_err(|_| {
        DecoherenceError::parse(line_no, format!("invalid target '{}'", token))
    })?;
    let qubit = QubitId::new(qubit);

    Ok(match (pauli, inverted) {
        (Some(pauli), _) => Target::Pauli {
            pauli,
            qubit,
            inverted,
        },
        (None, true) => Target::InvertedQubit(qubit),
        (None, false) => Target::Qubit(qubit),
    })
}
