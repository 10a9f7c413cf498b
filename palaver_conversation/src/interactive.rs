//! Line-oriented chat loop over any reader/writer pair.

use std::io::{BufRead, Write};

use palaver_core::{Result, SessionStore};
use tracing::info;

use crate::manager::DialogueManager;

/// `exit` or `quit`, in any letter case, ends the session.
///
/// Only the line ending is ignored; `" exit"` is an ordinary message.
#[must_use]
pub fn is_exit_command(line: &str) -> bool {
    let line = strip_line_ending(line);
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

impl<S> DialogueManager<S>
where
    S: SessionStore + Send + Sync,
{
    /// Read messages line by line and print each reply as `Bot: <reply>`.
    ///
    /// Stops on `exit`/`quit` or end of input and returns the number of turns
    /// taken. A failed turn ends the loop with that error.
    pub async fn run_interactive<R, W>(
        &self,
        user_id: &str,
        mut input: R,
        mut output: W,
    ) -> Result<usize>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "Type 'exit' or 'quit' to end the session.")?;

        let mut turns = 0_usize;
        loop {
            write!(output, "You: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }

            let message = strip_line_ending(&line);
            if is_exit_command(message) {
                break;
            }

            let reply = self.chat(user_id, message).await?;
            writeln!(output, "Bot: {reply}")?;
            turns += 1;
        }

        info!("Session ended after {turns} turn(s)");
        Ok(turns)
    }
}
