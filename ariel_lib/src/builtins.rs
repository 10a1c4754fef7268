//! Native functions reachable by reserved names.
//!
//! The table is fixed. Identifiers are looked up here only after the
//! environment has no binding for them, so a user declaration shadows a
//! builtin of the same name.

use crate::ariel_errors::RuntimeError;
use crate::value::{BuiltIn, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

/// Capabilities the host lends to native functions
pub struct Host<'a> {
    pub output: &'a mut dyn Write,
    pub rng: StdRng,
}

impl<'a> Host<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        Self {
            output,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic `rand()` sequence, for tests and reproducible runs.
    pub fn with_seed(output: &'a mut dyn Write, seed: u64) -> Self {
        Self {
            output,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

const BUILTINS: &[BuiltIn] = &[
    BuiltIn {
        name: "println",
        function: builtin_println,
    },
    BuiltIn {
        name: "print",
        function: builtin_print,
    },
    BuiltIn {
        name: "rand",
        function: builtin_rand,
    },
];

pub fn lookup(name: &str) -> Option<BuiltIn> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

fn builtin_print(args: &[Value], host: &mut Host<'_>) -> Result<Option<Value>, RuntimeError> {
    for arg in args {
        write!(host.output, "{}", arg)?;
    }
    host.output.flush()?;
    Ok(None)
}

fn builtin_println(args: &[Value], host: &mut Host<'_>) -> Result<Option<Value>, RuntimeError> {
    builtin_print(args, host)?;
    writeln!(host.output)?;
    Ok(None)
}

fn builtin_rand(args: &[Value], host: &mut Host<'_>) -> Result<Option<Value>, RuntimeError> {
    if !args.is_empty() {
        return Err(RuntimeError::TooManyArguments("rand".to_string()));
    }
    Ok(Some(Value::Int(host.rng.gen_range(0..=i64::MAX))))
}
