//! Textual command surface over [`CountTree`].
//!
//! Two formats are understood:
//!
//! - An initial load file: whitespace-separated tokens, an entry count `n`
//!   followed by `n` pairs `id weight`, ascending by id.
//! - Command lines, one per line:
//!
//! ```text
//! increase <id> <m>     reduce <id> <m>     count <id>
//! inrange <low> <high>  next <id>           previous <id>
//! print                 inorder             quit | exit
//! ```
//!
//! Results print one per line. `next` / `previous` print `id weight`, or
//! `0 0` when no such id exists.

use crate::error::ParseError;
use crate::tree::{CountTree, Id, Weight};

/// A single parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Increase { id: Id, amount: Weight },
    Reduce { id: Id, amount: Weight },
    Count { id: Id },
    InRange { low: Id, high: Id },
    Next { id: Id },
    Previous { id: Id },
    /// Breadth-first level dump.
    Print,
    /// In-order dump with weights and colors.
    InOrder,
    Quit,
}

impl Command {
    /// Parse one line. Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = tokens.collect();

        let command = match name {
            "increase" => {
                let [id, amount] = ints::<2>("increase", &args)?;
                Command::Increase { id, amount }
            }
            "reduce" => {
                let [id, amount] = ints::<2>("reduce", &args)?;
                Command::Reduce { id, amount }
            }
            "count" => {
                let [id] = ints::<1>("count", &args)?;
                Command::Count { id }
            }
            "inrange" => {
                let [low, high] = ints::<2>("inrange", &args)?;
                Command::InRange { low, high }
            }
            "next" => {
                let [id] = ints::<1>("next", &args)?;
                Command::Next { id }
            }
            "previous" => {
                let [id] = ints::<1>("previous", &args)?;
                Command::Previous { id }
            }
            "print" => {
                ints::<0>("print", &args)?;
                Command::Print
            }
            "inorder" => {
                ints::<0>("inorder", &args)?;
                Command::InOrder
            }
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        return Ok(Some(command));
    }

    /// Run the command against `tree` and render its output, without a
    /// trailing newline. `Quit` renders nothing.
    pub fn execute(&self, tree: &mut CountTree) -> String {
        return match *self {
            Command::Increase { id, amount } => tree.increase(id, amount).to_string(),
            Command::Reduce { id, amount } => tree.reduce(id, amount).to_string(),
            Command::Count { id } => tree.count(id).to_string(),
            Command::InRange { low, high } => tree.in_range(low, high).to_string(),
            Command::Next { id } => format_neighbour(tree.next(id)),
            Command::Previous { id } => format_neighbour(tree.previous(id)),
            Command::Print => trim_newline(tree.level_string()),
            Command::InOrder => trim_newline(tree.in_order_string()),
            Command::Quit => String::new(),
        };
    }
}

fn format_neighbour(entry: Option<(Id, Weight)>) -> String {
    let (id, weight) = entry.unwrap_or((0, 0));
    return format!("{id} {weight}");
}

fn trim_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    return text;
}

fn int(token: &str) -> Result<i64, ParseError> {
    return token
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger(token.to_string()));
}

fn ints<const N: usize>(command: &'static str, args: &[&str]) -> Result<[i64; N], ParseError> {
    if args.len() != N {
        return Err(ParseError::Arity {
            command,
            expected: N,
            found: args.len(),
        });
    }
    let mut out = [0i64; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = int(token)?;
    }
    return Ok(out);
}

/// Parse a load file: `n` followed by `n` `id weight` pairs.
pub fn parse_entries(input: &str) -> Result<Vec<(Id, Weight)>, ParseError> {
    let mut tokens = input.split_whitespace();
    let count_token = tokens.next().ok_or(ParseError::MissingCount)?;
    let expected = count_token
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidInteger(count_token.to_string()))?;

    let mut entries = Vec::with_capacity(expected.min(1 << 20));
    for found in 0..expected {
        let (Some(id), Some(weight)) = (tokens.next(), tokens.next()) else {
            return Err(ParseError::Truncated { expected, found });
        };
        entries.push((int(id)?, int(weight)?));
    }

    if let Some(extra) = tokens.next() {
        return Err(ParseError::Trailing(extra.to_string()));
    }
    return Ok(entries);
}

/// Parse a load file and bulk-load it with the default loader.
pub fn load(input: &str) -> Result<CountTree, ParseError> {
    let entries = parse_entries(input)?;
    return Ok(CountTree::from_sorted(&entries)?);
}
