//! Verify command handler: replay document validation.

use std::io::Write;

use cheat_engine::replay::validate_replay;

use crate::error::CliError;

/// Handle the verify command: run the replay validator over `input` and
/// print every diagnostic it collects.
///
/// Checks the initial deal (52 unique cards), that every event decodes and
/// applies, and card conservation after each event. Any diagnostic maps to
/// exit code 2.
pub fn handle_verify_command(
    input: String,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&input)?;
    let doc: serde_json::Value = serde_json::from_str(&content)?;
    let diagnostics = validate_replay(&doc);
    if diagnostics.is_empty() {
        writeln!(out, "OK: {} is a valid replay", input)?;
        return Ok(());
    }
    for diagnostic in &diagnostics {
        writeln!(out, "{}", diagnostic)?;
    }
    Err(CliError::Engine(format!(
        "{} validation error(s) in {}",
        diagnostics.len(),
        input
    )))
}
