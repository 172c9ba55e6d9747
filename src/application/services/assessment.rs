//! Assessment service
//!
//! Applies leaf values to a tree, either interactively or from explicit
//! `id=value` assignments.

use std::io::{BufRead, Write};

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::AttackTree;
use crate::util::money::format_money;

/// Outcome of parsing one line of interactive input.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Skip,
    Value(f64),
    Negative,
    Invalid,
}

fn parse_entry(line: &str) -> Entry {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Entry::Skip;
    }
    let Some(plain) = strip_thousands(trimmed) else {
        return Entry::Invalid;
    };
    match plain.parse::<f64>() {
        Ok(v) if !v.is_finite() => Entry::Invalid,
        Ok(v) if v < 0.0 => Entry::Negative,
        Ok(v) => Entry::Value(v),
        Err(_) => Entry::Invalid,
    }
}

/// Remove thousands separators. `None` when a comma is misplaced
/// (`1,2,3`, `12,34`, `,100`, `1.000,5`).
fn strip_thousands(input: &str) -> Option<String> {
    if !input.contains(',') {
        return Some(input.to_string());
    }
    let unsigned = input.strip_prefix('-').unwrap_or(input);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = whole.split(',');
    let first = groups.next()?;
    let digits = |g: &str| g.chars().all(|c| c.is_ascii_digit());
    if first.is_empty() || first.len() > 3 || !digits(first) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && digits(g)) {
        return None;
    }
    Some(input.replace(',', ""))
}

/// Service for entering leaf impact estimates.
pub struct AssessmentService {
    currency: String,
}

impl AssessmentService {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    /// Prompt for every leaf value, in construction order.
    ///
    /// An empty line keeps the current value. Invalid or negative input is
    /// rejected and the same leaf is asked again. End of input stops
    /// prompting. Returns the number of leaves updated.
    #[instrument(level = "debug", skip_all)]
    pub fn prompt_values<R: BufRead, W: Write>(
        &self,
        tree: &mut AttackTree,
        mut input: R,
        mut output: W,
    ) -> ApplicationResult<usize> {
        let mut updated = 0;

        writeln!(
            output,
            "Enter the cost impact ({}) if each attack succeeds:",
            self.currency
        )
        .with_context("write prompt")?;
        writeln!(output, "(Press Enter to skip, or enter 0 for no impact)")
            .with_context("write prompt")?;

        'leaves: for leaf in tree.list_leaves() {
            loop {
                write!(
                    output,
                    "{} (current: {}): {}",
                    leaf.name,
                    format_money(leaf.value, &self.currency),
                    self.currency
                )
                .with_context("write prompt")?;
                output.flush().with_context("flush prompt")?;

                let mut line = String::new();
                let read = input.read_line(&mut line).with_context("read input")?;
                if read == 0 {
                    debug!("prompt_values: end of input");
                    writeln!(output).with_context("write prompt")?;
                    break 'leaves;
                }

                match parse_entry(&line) {
                    Entry::Skip => break,
                    Entry::Value(value) => {
                        tree.set_leaf_value(&leaf.id, value)?;
                        writeln!(
                            output,
                            "✓ Updated {} = {}",
                            leaf.name,
                            format_money(value, &self.currency)
                        )
                        .with_context("write prompt")?;
                        updated += 1;
                        break;
                    }
                    Entry::Negative => {
                        writeln!(output, "Please enter a positive number or 0")
                            .with_context("write prompt")?;
                    }
                    Entry::Invalid => {
                        writeln!(output, "Please enter a valid number")
                            .with_context("write prompt")?;
                    }
                }
            }
        }

        debug!("prompt_values: {} leaves updated", updated);
        Ok(updated)
    }

    /// Apply `id=value` assignments in order. Stops at the first rejected one.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn apply_overrides(
        &self,
        tree: &mut AttackTree,
        overrides: &[(String, f64)],
    ) -> ApplicationResult<()> {
        for (id, value) in overrides {
            tree.set_leaf_value(id, *value)?;
        }
        Ok(())
    }
}

/// Parse an `ID=VALUE` assignment.
pub fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{}'", s))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing node id in '{}'", s));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value in '{}': {}", s, e))?;
    Ok((id.to_string(), value))
}
