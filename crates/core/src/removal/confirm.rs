//! Confirmation prompts for destructive actions
//!
//! A declined or unreadable answer cancels the action. Cancellation is not an
//! error: the caller skips the action and makes no remote call for it.

use std::io::{BufRead, Write};

/// Tokens accepted as an affirmative answer, after trimming
pub const AFFIRMATIVE_ANSWERS: [&str; 2] = ["y", "yes"];

/// How an answer is compared against [`AFFIRMATIVE_ANSWERS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPolicy {
    /// "Y", "Yes" and "YES" are accepted
    CaseInsensitive,
    /// Only lowercase "y" and "yes" are accepted
    CaseSensitive,
}

impl AnswerPolicy {
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = answer.trim();
        match self {
            AnswerPolicy::CaseInsensitive => {
                let folded = answer.to_lowercase();
                AFFIRMATIVE_ANSWERS.contains(&folded.as_str())
            }
            AnswerPolicy::CaseSensitive => AFFIRMATIVE_ANSWERS.contains(&answer),
        }
    }
}

/// Answer comparison for recursive object removal
pub const OBJECT_ANSWER_POLICY: AnswerPolicy = AnswerPolicy::CaseInsensitive;

/// Answer comparison for bucket removal
pub const BUCKET_ANSWER_POLICY: AnswerPolicy = AnswerPolicy::CaseInsensitive;

/// Answer comparison for recursive multipart upload purge
///
/// Only lowercase answers abort uploads. Existing scripts pipe a literal "y"
/// into this prompt, so it stays stricter than the object and bucket prompts.
pub const FRAGMENT_ANSWER_POLICY: AnswerPolicy = AnswerPolicy::CaseSensitive;

/// Result of a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Cancelled,
}

/// Source of interactive answers
pub trait Prompt: Send {
    /// Show `question` and read one line of input
    fn ask(&mut self, question: &str) -> std::io::Result<String>;
}

/// Prompt over an arbitrary reader and writer
pub struct IoPrompt<R, W> {
    input: R,
    output: W,
}

impl<R, W> IoPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompt for IoPrompt<R, W> {
    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        ask_on(&mut self.input, &mut self.output, question)
    }
}

/// Prompt reading stdin and writing the question to stderr
///
/// Stdout carries only command output, so `--json` stays parseable even when
/// a prompt is shown.
pub struct StdioPrompt;

impl Prompt for StdioPrompt {
    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        ask_on(&mut std::io::stdin().lock(), &mut std::io::stderr(), question)
    }
}

fn ask_on(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> std::io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "no answer on input",
        ));
    }
    Ok(line)
}

/// Gate placed in front of every destructive action
pub struct ConfirmationGate {
    force: bool,
    prompt: Box<dyn Prompt>,
}

impl ConfirmationGate {
    pub fn new(force: bool, prompt: Box<dyn Prompt>) -> Self {
        Self { force, prompt }
    }

    /// Gate prompting on stdin, with questions on stderr
    pub fn stdio(force: bool) -> Self {
        Self::new(force, Box::new(StdioPrompt))
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Ask whether `action` should go ahead
    pub fn confirm(&mut self, action: &str, policy: AnswerPolicy) -> Confirmation {
        if self.force {
            return Confirmation::Proceed;
        }

        let question = format!("{action}? (y/n): ");
        match self.prompt.ask(&question) {
            Ok(answer) if policy.accepts(&answer) => Confirmation::Proceed,
            Ok(answer) => {
                tracing::debug!(answer = answer.trim(), "Confirmation declined");
                Confirmation::Cancelled
            }
            Err(e) => {
                tracing::debug!(error = %e, "Confirmation could not be read");
                Confirmation::Cancelled
            }
        }
    }
}
