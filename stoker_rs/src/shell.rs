//! Line-oriented command session over a [`CommandRegistry`].

use std::io::{self, BufRead, Write};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::config::ShellConfig;
use crate::error::DispatchError;
use crate::host::LogSink;
use crate::registry::CommandRegistry;
use crate::tokenize::{tokenize, tokenize_partial};

const BUILTINS: [&str; 3] = ["commands", "exit", "quit"];

/// What the session does after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

/// Interactive session: reads lines, dispatches them, reports errors and
/// keeps going.
pub struct Shell<'s> {
    registry: CommandRegistry,
    config: ShellConfig,
    sink: &'s dyn LogSink,
}

impl<'s> Shell<'s> {
    pub fn new(registry: CommandRegistry, config: ShellConfig, sink: &'s dyn LogSink) -> Self {
        Self {
            registry,
            config,
            sink,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Run one line. Blank lines are a no-op.
    pub fn execute_line(&self, line: &str) -> Result<LineOutcome, DispatchError> {
        let tokens = tokenize(line)?;
        match tokens.as_slice() {
            [] => Ok(LineOutcome::Continue),
            [word] if word == "exit" || word == "quit" => Ok(LineOutcome::Exit),
            [word] if word == "commands" => {
                for name in self.registry.names() {
                    self.sink.log(name);
                }
                Ok(LineOutcome::Continue)
            }
            _ => {
                let outcome = self.registry.dispatch(&tokens, self.sink);
                match outcome {
                    Ok(()) => Ok(LineOutcome::Continue),
                    Err(err) if self.config.did_you_mean => Err(err),
                    Err(err) => Err(err.without_suggestion()),
                }
            }
        }
    }

    /// Completions for the word under the cursor at the end of `line`,
    /// filtered by what has been typed of it.
    pub fn complete_line(&self, line: &str) -> Vec<String> {
        let tokens = tokenize_partial(line);
        let fragment = tokens.last().map(String::as_str).unwrap_or_default();
        let mut candidates = self.registry.suggest(&tokens);
        if tokens.len() == 1 {
            candidates.extend(BUILTINS.iter().map(|word| word.to_string()));
        }
        candidates
            .into_iter()
            .filter(|candidate| candidate.starts_with(fragment))
            .take(self.config.suggest_limit)
            .collect()
    }

    /// Completions for the word ending at byte `pos` of `line`, with the byte
    /// offset where that word starts.
    pub fn completion_at(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = line.get(..pos).unwrap_or(line);
        (fragment_start(head), self.complete_line(head))
    }

    /// Line-editing session on the terminal: tab completion and history.
    /// Ctrl-C clears the line, Ctrl-D ends the session.
    pub fn run_interactive(&self) -> rustyline::Result<()> {
        let mut editor = Editor::<ShellHelper<'_>, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper { shell: self }));
        loop {
            let line = match editor.readline(&self.config.prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            };
            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str())?;
            }
            match self.execute_line(&line) {
                Ok(LineOutcome::Continue) => {}
                Ok(LineOutcome::Exit) => break,
                Err(err) => self.sink.log(&format!("error: {err}")),
            }
        }
        Ok(())
    }

    /// Read lines until end of input or `exit`. Dispatch errors are reported
    /// through the sink; only I/O errors end the loop early.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(output, "{}", self.config.prompt)?;
            output.flush()?;
            let Some(line) = lines.next().transpose()? else {
                break;
            };
            match self.execute_line(&line) {
                Ok(LineOutcome::Continue) => {}
                Ok(LineOutcome::Exit) => break,
                Err(err) => self.sink.log(&format!("error: {err}")),
            }
        }
        Ok(())
    }
}

/// Byte offset where the last shell word of `line` begins. Quoted and escaped
/// whitespace does not split words.
fn fragment_start(line: &str) -> usize {
    let mut start = 0;
    let mut quote = None;
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(open) if c == open => quote = None,
            Some('"') if c == '\\' => escaped = true,
            Some(_) => {}
            None => match c {
                '\\' => escaped = true,
                '"' | '\'' => quote = Some(c),
                c if c.is_whitespace() => start = index + c.len_utf8(),
                _ => {}
            },
        }
    }
    start
}

/// Candidate as shown in the menu, and quoted for the line when it holds
/// spaces.
fn candidate_pair(candidate: String) -> Pair {
    let replacement = shlex::try_quote(&candidate)
        .map(|quoted| quoted.into_owned())
        .unwrap_or_else(|_| candidate.clone());
    Pair {
        display: candidate,
        replacement,
    }
}

// ============================================================================
// Editor helper
// ============================================================================

struct ShellHelper<'a> {
    shell: &'a Shell<'a>,
}

impl Completer for ShellHelper<'_> {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.shell.completion_at(line, pos);
        tracing::trace!(line, pos, found = candidates.len(), "tab completion");
        Ok((start, candidates.into_iter().map(candidate_pair).collect()))
    }
}

impl Hinter for ShellHelper<'_> {
    type Hint = String;
}

impl Highlighter for ShellHelper<'_> {}

impl Validator for ShellHelper<'_> {}

impl Helper for ShellHelper<'_> {}

impl std::fmt::Debug for Shell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
