//! Console output and interactive input
//!
//! [`Console`] is the single sink for user-facing text. [`LineSource`] is
//! where the engine gets its next line when the navigation queue is empty,
//! and where yes/no confirmations are answered.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::completion::{CompletionHelper, CompletionIndex};
use crate::error::Result;

/// ANSI sequence clearing the screen and homing the cursor
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// User-facing output sink
pub struct Console {
    out: Box<dyn Write>,
}

impl Console {
    /// Console writing to stdout
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
        }
    }

    /// Console writing to an in-memory buffer, returned alongside it
    pub fn buffered() -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        let console = Self {
            out: Box::new(buffer.clone()),
        };
        (console, buffer)
    }

    /// Write a line
    pub fn print(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("Console write failed: {}", e);
        }
    }

    /// Write an empty line
    pub fn newline(&mut self) {
        self.print("");
    }

    /// Clear the terminal
    pub fn clear_screen(&mut self) {
        if let Err(e) = write!(self.out, "{}", CLEAR_SCREEN).and_then(|_| self.out.flush()) {
            warn!("Console write failed: {}", e);
        }
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Shared in-memory output, used to inspect what the engine printed
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<Vec<u8>>>);

impl OutputBuffer {
    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Drop everything written so far
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source of interactive input
pub trait LineSource {
    /// Read one line. `None` means end of input or interrupt.
    fn read_line(&mut self, prompt: &str, completion: &CompletionIndex) -> Result<Option<String>>;

    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Plain stdin prompt without line editing
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }

    fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl LineSource for StdinPrompt {
    fn read_line(&mut self, prompt: &str, _completion: &CompletionIndex) -> Result<Option<String>> {
        self.read(prompt)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .read(&format!("{} (y/n): ", question))?
            .is_some_and(|answer| is_yes(&answer)))
    }
}

/// Line editor prompt with history and tab completion
pub struct EditorPrompt {
    editor: Editor<CompletionHelper, DefaultHistory>,
    history_file: Option<PathBuf>,
}

impl EditorPrompt {
    pub fn new(history_file: Option<PathBuf>) -> Result<Self> {
        let mut editor: Editor<CompletionHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(CompletionHelper::default()));

        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    warn!("Failed to load prompt history from {}: {}", path.display(), e);
                }
            }
        }

        Ok(Self {
            editor,
            history_file,
        })
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                warn!("Failed to save prompt history to {}: {}", path.display(), e);
            }
        }
    }
}

impl LineSource for EditorPrompt {
    fn read_line(&mut self, prompt: &str, completion: &CompletionIndex) -> Result<Option<String>> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_index(completion.clone());
        }

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                    self.save_history();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_index(CompletionIndex::default());
        }

        match self.editor.readline(&format!("{} (y/n): ", question)) {
            Ok(answer) => Ok(is_yes(&answer)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Pre-scripted input, used by batch runs and tests
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
    answers: VecDeque<bool>,
    prompts: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Queue answers for upcoming confirmations; unanswered ones are "no"
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }

    /// Every prompt and question shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedPrompt {
    fn read_line(&mut self, prompt: &str, _completion: &CompletionIndex) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.prompts.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}
