/*!
 * Dependency parser backed by an external process.
 *
 * The command receives the text on stdin and must print a JSON array of
 * `{"text", "dep", "is_sent_start", "is_sent_end", "space_after"}` objects on stdout, e.g. a
 * small spaCy wrapper script emitting `bool(token.whitespace_)` as `space_after`. Tokens without
 * `space_after` are spaced with the separator rule. One process is started per call.
 */

use log::{debug, trace};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use super::{DependencyParser, ParsedToken};
use crate::errors::ParserError;

#[derive(Debug, Clone)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// Build a parser from a command line (program followed by arguments)
    pub fn new(command: &[String]) -> Result<Self, ParserError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ParserError::Command("empty parser command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn run(&self, text: &str) -> Result<String, ParserError> {
        trace!("Running parser command '{}' on {} bytes", self.program, text.len());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ParserError::Command(format!("{}: {}", self.program, e)))?;

        // stdin is fed from its own thread so a parser that writes before it reads cannot block us
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| ParserError::Command(format!("{}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(ParserError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(ParserError::Command(format!("writing to {}: {}", self.program, e)));
                }
                Err(_) => {
                    return Err(ParserError::Command(format!("writing to {}: writer thread panicked", self.program)));
                }
            }
        }
        String::from_utf8(output.stdout).map_err(|e| ParserError::Output(e.to_string()))
    }
}

impl DependencyParser for CommandParser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>, ParserError> {
        let stdout = self.run(text)?;
        let tokens = parse_token_json(&stdout)?;
        debug!("Parser '{}' produced {} tokens", self.program, tokens.len());
        Ok(tokens)
    }
}

/// Decode the token array printed by a parser command, dropping whitespace-only tokens
pub fn parse_token_json(output: &str) -> Result<Vec<ParsedToken>, ParserError> {
    let tokens: Vec<ParsedToken> =
        serde_json::from_str(output.trim()).map_err(|e| ParserError::Output(e.to_string()))?;
    Ok(tokens.into_iter().filter(|t| !t.text.trim().is_empty()).collect())
}
