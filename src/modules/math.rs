//! math module
//!
//! Arithmetic and comparison commands. Numbers parse as integers first and
//! fall back to floats; integer arithmetic promotes to float on overflow.
//! Every command is registered twice, bare and `math-` prefixed, so a user
//! function named `add` does not cut scripts off from the module.

use std::fmt;

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn parse(text: &str) -> Option<Number> {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            _ => Number::Float(self.as_f64() + rhs.as_f64()),
        }
    }

    fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(diff) => Number::Int(diff),
                None => Number::Float(a as f64 - b as f64),
            },
            _ => Number::Float(self.as_f64() - rhs.as_f64()),
        }
    }

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::Int(product),
                None => Number::Float(a as f64 * b as f64),
            },
            _ => Number::Float(self.as_f64() * rhs.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            // {:?} keeps the trailing .0 on whole floats
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}

pub fn commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for name in ["", "math-"] {
        commands.push(make_add_command(&format!("{}add", name)));
        commands.push(make_subtract_command(&format!("{}subtract", name)));
        commands.push(make_multiply_command(&format!("{}multiply", name)));
        commands.push(make_divide_command(&format!("{}divide", name)));
        commands.push(make_less_than_command(&format!("{}less-than", name)));
        commands.push(make_greater_than_command(&format!("{}greater-than", name)));
        commands.push(make_equal_command(&format!("{}equal", name)));
        commands.push(make_increment_command(&format!("{}increment", name)));
        commands.push(make_decrement_command(&format!("{}decrement", name)));
    }
    commands
}

fn operands(repl: &mut Repl, args: &[String], verb: &str) -> Option<(Number, Number)> {
    match (Number::parse(&args[0]), Number::parse(&args[1])) {
        (Some(lhs), Some(rhs)) => Some((lhs, rhs)),
        _ => {
            repl.println(&format!("Can only {} valid numbers", verb));
            None
        }
    }
}

fn make_add_command(name: &str) -> Command {
    Command::new(name, &format!("{} lhs rhs", name), "Add two numbers", Arity::exact(2), {
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "add") else { return Ok(2) };
            repl.println(&lhs.add(rhs).to_string());
            Ok(0)
        }
    })
}

fn make_subtract_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Subtract rhs from lhs",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "subtract") else { return Ok(2) };
            repl.println(&lhs.sub(rhs).to_string());
            Ok(0)
        },
    )
}

fn make_multiply_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Multiply two numbers",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "multiply") else { return Ok(2) };
            repl.println(&lhs.mul(rhs).to_string());
            Ok(0)
        },
    )
}

fn make_divide_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Divide lhs by rhs; the result is always a float",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "divide") else { return Ok(2) };
            if rhs.as_f64() == 0.0 {
                repl.println("Cannot divide by zero");
                return Ok(2);
            }
            repl.println(&Number::Float(lhs.as_f64() / rhs.as_f64()).to_string());
            Ok(0)
        },
    )
}

fn make_less_than_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Compare two numbers, returning true if lhs is less than rhs",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "compare") else { return Ok(2) };
            Ok(if lhs.as_f64() < rhs.as_f64() { 0 } else { 1 })
        },
    )
}

fn make_greater_than_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Compare two numbers, returning true if lhs is greater than rhs",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some((lhs, rhs)) = operands(repl, args, "compare") else { return Ok(2) };
            Ok(if lhs.as_f64() > rhs.as_f64() { 0 } else { 1 })
        },
    )
}

fn make_equal_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} lhs rhs", name),
        "Compare two things for equality",
        Arity::exact(2),
        |_repl: &mut Repl, args: &[String]| Ok(if args[0] == args[1] { 0 } else { 1 }),
    )
}

fn make_increment_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} number [step]", name),
        "Increment a number by 1 (default) or by a set step amount",
        Arity::range(1, 2),
        |repl: &mut Repl, args: &[String]| {
            let Some(n) = Number::parse(&args[0]) else {
                repl.println("Can only increment valid numbers");
                return Ok(2);
            };
            let step = match args.get(1) {
                None => Number::Int(1),
                Some(raw) => match Number::parse(raw) {
                    Some(step) => step,
                    None => {
                        repl.println("Can only increment valid numbers");
                        return Ok(2);
                    }
                },
            };
            repl.println(&n.add(step).to_string());
            Ok(0)
        },
    )
}

fn make_decrement_command(name: &str) -> Command {
    Command::new(
        name,
        &format!("{} number [step]", name),
        "Decrement a number by 1 (default) or by a set step amount",
        Arity::range(1, 2),
        |repl: &mut Repl, args: &[String]| {
            let Some(n) = Number::parse(&args[0]) else {
                repl.println("Can only decrement valid numbers");
                return Ok(2);
            };
            let step = match args.get(1) {
                None => Number::Int(1),
                Some(raw) => match Number::parse(raw) {
                    Some(step) => step,
                    None => {
                        repl.println("Can only decrement valid numbers");
                        return Ok(2);
                    }
                },
            };
            repl.println(&n.sub(step).to_string());
            Ok(0)
        },
    )
}
