//! Line-oriented console: tagged report lines and blocking prompts.
//!
//! Every report line is mirrored as a `tracing` event so it lands in the
//! transcript. Input and output are boxed trait objects so tests can drive
//! the console with scripted answers and inspect what was printed.

use crate::error::{BootstrapError, Result};
use crossterm::style::Stylize;
use std::io::{self, BufRead, Cursor, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Severity tag of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// The bracketed tag printed in front of the message
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Success => "[SUCCESS]",
            Self::Warning => "[WARNING]",
            Self::Error => "[ERROR]",
        }
    }
}

/// Console front end shared by the menus and the orchestrator
pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    color: bool,
    warnings: usize,
    errors: usize,
}

impl Console {
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>, color: bool) -> Self {
        Self {
            input,
            output,
            color,
            warnings: 0,
            errors: 0,
        }
    }

    /// Console bound to the process stdin/stdout
    pub fn stdio(color: bool) -> Self {
        Self::new(Box::new(io::stdin().lock()), Box::new(io::stdout()), color)
    }

    /// Console fed from a fixed list of answer lines, with captured output.
    ///
    /// Once the answers run out, further prompts fail with a `Prompt` error.
    pub fn scripted(answers: &[&str]) -> (Self, CapturedOutput) {
        let mut script = String::new();
        for answer in answers {
            script.push_str(answer);
            script.push('\n');
        }
        let captured = CapturedOutput::default();
        let console = Self::new(
            Box::new(Cursor::new(script.into_bytes())),
            Box::new(captured.clone()),
            false,
        );
        (console, captured)
    }

    /// Print a tagged line and mirror it into the log
    pub fn report(&mut self, level: Level, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        match level {
            Level::Info | Level::Success => info!("{} {}", level.tag(), msg),
            Level::Warning => {
                self.warnings += 1;
                warn!("{}", msg);
            }
            Level::Error => {
                self.errors += 1;
                error!("{}", msg);
            }
        }

        let line = if self.color {
            let tag = match level {
                Level::Info => level.tag().cyan(),
                Level::Success => level.tag().green(),
                Level::Warning => level.tag().yellow(),
                Level::Error => level.tag().red(),
            };
            format!("{} {}", tag, msg)
        } else {
            format!("{} {}", level.tag(), msg)
        };
        self.write_line(&line);
    }

    pub fn info(&mut self, msg: impl AsRef<str>) {
        self.report(Level::Info, msg);
    }

    pub fn success(&mut self, msg: impl AsRef<str>) {
        self.report(Level::Success, msg);
    }

    pub fn warning(&mut self, msg: impl AsRef<str>) {
        self.report(Level::Warning, msg);
    }

    pub fn error(&mut self, msg: impl AsRef<str>) {
        self.report(Level::Error, msg);
    }

    /// Print an untagged line (menu bodies, headings)
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.write_line(text.as_ref());
    }

    /// Print a section heading
    pub fn heading(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        let rule = "=".repeat(text.len().max(40));
        self.write_line("");
        self.write_line(&rule);
        if self.color {
            self.write_line(&format!("{}", text.bold()));
        } else {
            self.write_line(text);
        }
        self.write_line(&rule);
    }

    /// Number of warnings reported so far
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Number of errors reported so far
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Show `prompt` and block until the user enters a line.
    ///
    /// The returned answer is trimmed. A line that is not valid UTF-8 is
    /// rejected and the prompt repeats. A closed input stream is an error so
    /// reprompt loops cannot spin forever.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        loop {
            write!(self.output, "{} ", prompt)?;
            self.output.flush()?;

            let mut buf = Vec::new();
            let read = self.input.read_until(b'\n', &mut buf)?;
            if read == 0 {
                self.write_line("");
                return Err(BootstrapError::prompt("input stream closed"));
            }
            match String::from_utf8(buf) {
                Ok(line) => {
                    let answer = line.trim().to_string();
                    debug!(prompt, answer = answer.as_str(), "prompt answered");
                    return Ok(answer);
                }
                Err(_) => self.warning("Input is not valid text, please try again"),
            }
        }
    }

    /// Ask a yes/no question. Empty input picks `default`.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {}", question, hint))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                other => self.warning(format!("Please answer 'y' or 'n' (got '{}')", other)),
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            debug!("Failed to write console line: {}", e);
        }
    }
}

/// Ask `question` until `validator` accepts the answer.
///
/// With `allow_skip`, an empty answer returns `Ok(None)` without calling the
/// validator. Rejections are printed as warnings and the question repeats.
/// Only a prompt failure (closed input) ends the loop with an error.
pub fn prompt_validated<T>(
    console: &mut Console,
    question: &str,
    allow_skip: bool,
    validator: impl Fn(&str) -> Result<T>,
) -> Result<Option<T>> {
    loop {
        let answer = console.ask(question)?;
        if answer.is_empty() && allow_skip {
            return Ok(None);
        }
        match validator(&answer) {
            Ok(value) => return Ok(Some(value)),
            Err(BootstrapError::Validation(msg)) => console.warning(msg),
            Err(e) => return Err(e),
        }
    }
}

/// Shared in-memory sink for console output
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("captured output lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_hostname;

    #[test]
    fn test_report_tags_and_counts() {
        let (mut console, out) = Console::scripted(&[]);
        console.info("starting");
        console.success("done");
        console.warning("careful");
        console.error("broken");

        let text = out.contents();
        assert!(text.contains("[INFO] starting"));
        assert!(text.contains("[SUCCESS] done"));
        assert!(text.contains("[WARNING] careful"));
        assert!(text.contains("[ERROR] broken"));
        assert_eq!(console.warnings(), 1);
        assert_eq!(console.errors(), 1);
    }

    #[test]
    fn test_ask_trims_answer() {
        let (mut console, out) = Console::scripted(&["  hello  "]);
        assert_eq!(console.ask("Name:").unwrap(), "hello");
        assert!(out.contents().contains("Name:"));
    }

    #[test]
    fn test_ask_rejects_invalid_utf8_and_reprompts() {
        let captured = CapturedOutput::default();
        let mut console = Console::new(
            Box::new(Cursor::new(b"\xff\xfe\nweb-01\n".to_vec())),
            Box::new(captured.clone()),
            false,
        );
        assert_eq!(console.ask("Name:").unwrap(), "web-01");
        assert_eq!(console.warnings(), 1);
        assert_eq!(captured.contents().matches("Name:").count(), 2);
    }

    #[test]
    fn test_ask_on_closed_input_is_error() {
        let (mut console, _) = Console::scripted(&[]);
        let err = console.ask("Name:").unwrap_err();
        assert!(matches!(err, BootstrapError::Prompt(_)));
    }

    #[test]
    fn test_confirm_default_and_reprompt() {
        let (mut console, _) = Console::scripted(&["", "maybe", "n"]);
        assert!(console.confirm("Continue?", true).unwrap());
        assert!(!console.confirm("Continue?", true).unwrap());
        assert_eq!(console.warnings(), 1);
    }

    #[test]
    fn test_prompt_validated_reprompts_until_valid() {
        let (mut console, out) = Console::scripted(&["-bad", "this-name-is-way-too-long", "web-01"]);
        let value = prompt_validated(&mut console, "Hostname:", true, |s| {
            validate_hostname(s).map(|_| s.to_string())
        })
        .unwrap();
        assert_eq!(value.as_deref(), Some("web-01"));
        assert_eq!(console.warnings(), 2);
        assert_eq!(out.contents().matches("Hostname:").count(), 3);
    }

    #[test]
    fn test_prompt_validated_skip() {
        let (mut console, _) = Console::scripted(&[""]);
        let value = prompt_validated(&mut console, "Hostname:", true, |s| Ok(s.to_string())).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_prompt_validated_without_skip_sends_empty_to_validator() {
        let (mut console, _) = Console::scripted(&["", "", "10.0.0.1"]);
        let value = prompt_validated(&mut console, "Gateway:", false, |s| {
            if s.is_empty() {
                Err(BootstrapError::validation("Gateway is required"))
            } else {
                Ok(s.to_string())
            }
        })
        .unwrap();
        assert_eq!(value.as_deref(), Some("10.0.0.1"));
        assert_eq!(console.warnings(), 2);
    }
}
