//! Terminal prompts.

use healthtrends_client::Confirmer;
use std::io::{self, BufRead, Write};

/// Yes/no prompt on stdin. With `assume_yes` every prompt is accepted without asking.
pub struct TerminalConfirmer {
    assume_yes: bool,
}

impl TerminalConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            eprintln!("{prompt} [y/N] y");
            return true;
        }

        match ask(&format!("{prompt} [y/N] ")) {
            Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Print `label` to stderr and read one line from stdin.
pub fn ask(label: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(label.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
