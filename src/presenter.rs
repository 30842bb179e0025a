//src/presenter.rs

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// How the workflow talks to the user. `None` always means "cancelled".
pub trait Presenter {
    /// Free-text prompt.
    fn prompt_text(&mut self, message: &str) -> Option<String>;

    /// Single choice from `choices`; returns the index picked.
    fn choose(&mut self, title: &str, message: &str, choices: &[String]) -> Option<usize>;

    /// Display a block of text.
    fn show(&mut self, title: &str, text: &str);
}

/// Line-oriented terminal rendering. Empty input or end of input cancels.
pub struct TerminalPresenter<R, W> {
    input: R,
    output: W,
}

impl TerminalPresenter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPresenter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() {
                    None
                } else {
                    Some(answer.to_string())
                }
            }
            Err(err) => {
                log::warn!("Failed to read terminal input: {err}");
                None
            }
        }
    }

    fn emit(&mut self, text: &str) {
        // A closed terminal surfaces as end of input on the next read.
        if let Err(err) = self.output.write_all(text.as_bytes()).and_then(|_| self.output.flush()) {
            log::warn!("Failed to write to terminal: {err}");
        }
    }
}

impl<R: BufRead, W: Write> Presenter for TerminalPresenter<R, W> {
    fn prompt_text(&mut self, message: &str) -> Option<String> {
        self.emit(&format!("{message}\n> "));
        self.read_answer()
    }

    fn choose(&mut self, title: &str, message: &str, choices: &[String]) -> Option<usize> {
        let mut menu = format!("\n== {title} ==\n{message}\n\n");
        for (i, choice) in choices.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", i + 1, choice));
        }
        menu.push_str("Enter a number (empty to cancel)\n");
        self.emit(&menu);

        loop {
            self.emit("> ");
            let answer = self.read_answer()?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Some(n - 1),
                _ => self.emit(&format!(
                    "Please enter a number between 1 and {}\n",
                    choices.len()
                )),
            }
        }
    }

    fn show(&mut self, title: &str, text: &str) {
        let mut block = format!("\n== {title} ==\n{text}");
        if !text.ends_with('\n') {
            block.push('\n');
        }
        self.emit(&block);
    }
}
