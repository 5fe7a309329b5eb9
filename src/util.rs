//! Environment helpers shared by configuration loading.
//!
//! Lookups go through a closure instead of `std::env` directly so
//! tests can supply their own variables without touching the
//! process environment.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// Reads and parses a variable, `Ok(None)` when it is unset or empty.
pub fn parse_env<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("environment variable {name} could not be parsed: {e}")),
    }
}

/// Like `parse_env`, but the variable must be present.
pub fn require_env<T, F>(lookup: &F, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    parse_env(lookup, name)?.ok_or_else(|| anyhow!("environment variable {name} should be set"))
}
