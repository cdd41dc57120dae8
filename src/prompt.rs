use crate::errors::{Error, Result};
use std::io::{BufRead, Write};

/// Line-oriented interactive prompts.
///
/// Generic over input and output so the whole dialogue can be scripted in
/// tests; the binary uses locked stdin and stdout.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// The writer prompts are printed to, for the surrounding dialogue.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Asks for a value, keeping `default` when the answer is blank.
    pub fn ask(&mut self, label: &str, default: &str) -> Result<String> {
        let answer = self.read_answer(&format!("  {label} [{default}]: "))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Asks a free-form question whose blank answer means "skip".
    pub fn ask_optional(&mut self, question: &str) -> Result<Option<String>> {
        let answer = self.read_answer(&format!("  {question}: "))?;
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }

    /// Asks a yes/no question. A blank answer takes `default`; only `y` or
    /// `yes` (any case) count as yes.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let suffix = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.read_answer(&format!("  {question} {suffix}: "))?;
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}
