use crate::runner::Echo;
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

const PROMPT: &str = "echo$ ";

impl Echo {
    /// Interactive loop: every line is run with [`Echo::runout`].
    ///
    /// Blank lines are skipped; `exit`, Ctrl-D or Ctrl-C end the loop.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("cannot start line editor")?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "exit" {
                        break;
                    }
                    rl.add_history_entry(line)?;
                    self.runout(line);
                    if let Some(err) = self.procs().last().and_then(|p| p.err()) {
                        eprintln!("{err}");
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("cannot read line"),
            }
        }

        Ok(())
    }
}
