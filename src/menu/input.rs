//! Bounded-length line prompts.
//!
//! Every retry loop in the interactive flows runs through here so that a
//! caller holding the [`CancelToken`] can terminate it deterministically.

use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between the prompt loops and
/// whoever owns the session. Never fires unless someone calls `cancel`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Read one raw line. Returns `None` on cancellation or end of input.
/// Only the line terminator is stripped; other whitespace is preserved.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    cancel: &CancelToken,
) -> Result<Option<String>> {
    if cancel.is_cancelled() {
        return Ok(None);
    }
    write!(out, "{}\n{} ", prompt.cyan().bold(), ">>>".cyan().bold())?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Prompt until the input is non-empty and its character count lies within
/// `[min, max]`. The accepted value is returned untrimmed. Returns `None`
/// on cancellation or end of input.
pub fn prompt_bounded<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    field: &str,
    min: usize,
    max: usize,
    cancel: &CancelToken,
) -> Result<Option<String>> {
    loop {
        let Some(line) = prompt_line(input, out, prompt, cancel)? else {
            return Ok(None);
        };

        if line.is_empty() {
            writeln!(
                out,
                "{}",
                format!("{field} cannot be empty. Try again").red().bold()
            )?;
            continue;
        }

        let len = line.chars().count();
        if len < min || len > max {
            writeln!(
                out,
                "{}",
                format!("{field} must be between {min} and {max} characters long. Try again")
                    .red()
                    .bold()
            )?;
            continue;
        }

        return Ok(Some(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_prompt(script: &str, min: usize, max: usize) -> (Option<String>, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = prompt_bounded(
            &mut input,
            &mut out,
            "Enter the name of the package:",
            "package name",
            min,
            max,
            &CancelToken::new(),
        )
        .unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn accepts_lengths_at_both_boundaries() {
        assert_eq!(run_prompt("ab\n", 2, 20).0.as_deref(), Some("ab"));
        let max_len = "a".repeat(20);
        assert_eq!(
            run_prompt(&format!("{max_len}\n"), 2, 20).0.as_deref(),
            Some(max_len.as_str())
        );
    }

    #[test]
    fn rejects_empty_then_accepts_retry() {
        let (value, out) = run_prompt("\nvlc\n", 2, 20);
        assert_eq!(value.as_deref(), Some("vlc"));
        assert!(out.contains("package name cannot be empty"));
    }

    #[test]
    fn rejects_out_of_bounds_lengths_with_the_bounds_in_the_message() {
        let (value, out) = run_prompt("a\nvlc\n", 2, 20);
        assert_eq!(value.as_deref(), Some("vlc"));
        assert!(out.contains("between 2 and 20 characters"));

        let too_long = "a".repeat(21);
        let (value, _) = run_prompt(&format!("{too_long}\nok\n"), 2, 20);
        assert_eq!(value.as_deref(), Some("ok"));
    }

    #[test]
    fn input_is_not_trimmed() {
        let (value, _) = run_prompt("  vlc \n", 2, 20);
        assert_eq!(value.as_deref(), Some("  vlc "));
    }

    #[test]
    fn whitespace_padding_counts_toward_length() {
        // 21 characters once the padding is included.
        let padded = format!(" {} ", "a".repeat(19));
        let (value, out) = run_prompt(&format!("{padded}\nok\n"), 2, 20);
        assert_eq!(value.as_deref(), Some("ok"));
        assert!(out.contains("Try again"));
    }

    #[test]
    fn cancelled_token_stops_the_loop_without_reading() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut input = Cursor::new(b"never read\n".to_vec());
        let mut out = Vec::new();
        let result =
            prompt_bounded(&mut input, &mut out, "prompt", "field", 2, 20, &cancel).unwrap();
        assert_eq!(result, None);
        assert!(out.is_empty());
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        // The script runs dry while the value is still invalid.
        let (value, _) = run_prompt("x\n", 2, 20);
        assert_eq!(value, None);
    }
}
