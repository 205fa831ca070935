use std::io::{self, BufRead};

use console::Term;

/// Line-oriented operator I/O used by the dashboard.
pub trait Console {
    fn clear(&mut self) -> io::Result<()>;

    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Print `prompt` and read one line. Closed input is reported as
    /// `UnexpectedEof`.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

/// Console backed by the process terminal.
pub struct TermConsole {
    term: Term,
}

impl TermConsole {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TermConsole {
    fn clear(&mut self) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_screen()?;
        }
        Ok(())
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.term.write_str(prompt)?;
        if self.term.is_term() {
            return self.term.read_line();
        }
        // Piped stdin: `Term::read_line` cannot tell EOF from an empty line.
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
