//! Operator console implementation
//!
//! `Console` evaluates one input line at a time against the current session.
//! `run` wraps it in a line-editing loop with persistent history.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs::OpenOptions;
use std::path::Path;

use shared::{PortRange, ProcessId, ShortResponse, StatusSnapshot, logging, process_debug, process_warn};
use crate::error::{ConsoleError, ConsoleResult};
use crate::state::ConsoleSession;
use crate::traits::{InstanceClient, InstanceScanner};
use crate::types::{ConsoleAction, ConsoleCommand, HELP_TABLE};

/// Interactive console with dependency injection
pub struct Console<S, C>
where
    S: InstanceScanner,
    C: InstanceClient,
{
    scanner: S,
    client: C,
    range: PortRange,
    session: ConsoleSession,
}

impl<S, C> Console<S, C>
where
    S: InstanceScanner,
    C: InstanceClient,
{
    pub fn new(scanner: S, client: C, range: PortRange, host: impl Into<String>) -> Self {
        Self {
            scanner,
            client,
            range,
            session: ConsoleSession::new(host),
        }
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// Initial scan, then select `start_port` if it is live
    pub async fn start(&mut self, start_port: Option<u16>) -> String {
        let mut output = self.rescan().await;
        if let Some(port) = start_port {
            if self.session.select_port(port) {
                output = format!("Connected to the simulator on port {port}. Enter 'help' for a list of commands.\n");
            } else {
                output.push_str(&format!("No simulator is running on port {port}.\n"));
            }
        }
        output
    }

    /// Evaluate one input line
    pub async fn execute(&mut self, line: &str) -> ConsoleAction {
        let output = match ConsoleCommand::parse(line) {
            ConsoleCommand::Empty => String::new(),
            ConsoleCommand::Quit => return ConsoleAction::Quit,
            ConsoleCommand::Help => help_text(),
            ConsoleCommand::Ports => self.list_ports(),
            ConsoleCommand::Port(arg) => self.select(&arg),
            ConsoleCommand::Next => self.step(ConsoleSession::next),
            ConsoleCommand::Prev => self.step(ConsoleSession::prev),
            ConsoleCommand::Rescan => self.rescan().await,
            ConsoleCommand::Forward(command) => match self.forward(&command).await {
                Ok(body) => body,
                Err(ConsoleError::StaleSelection { port }) => {
                    let mut output = format!("Simulator on port {port} is no longer running. Rescanning...\n");
                    output.push_str(&self.rescan().await);
                    output
                }
                Err(e) => format!("Error sending command: {e}\n"),
            },
        };
        ConsoleAction::Continue(output)
    }

    /// Re-run discovery; selects the first instance found, or none
    pub async fn rescan(&mut self) -> String {
        let ports = self.scanner.scan(self.range).await;
        process_debug!(ProcessId::current(), "Scan of {} found {:?}", self.range, ports);
        self.session.replace_ports(ports);

        match self.session.selected_port() {
            Some(port) => format!(
                "Found {} simulator(s): {}. Selected port {port}.\n",
                self.session.ports().len(),
                join_ports(self.session.ports())
            ),
            None => format!("No simulators found on ports {}.\n", self.range),
        }
    }

    fn list_ports(&self) -> String {
        if self.session.ports().is_empty() {
            return format!("No simulators found on ports {}.\n", self.range);
        }

        let selected = self.session.selected_port();
        self.session
            .ports()
            .iter()
            .map(|&port| {
                let marker = if Some(port) == selected { "*" } else { " " };
                format!("{marker} {port}\n")
            })
            .collect()
    }

    fn select(&mut self, arg: &str) -> String {
        match arg.parse::<u16>() {
            Ok(port) if self.session.select_port(port) => format!("Selected port {port}.\n"),
            Ok(port) => format!("No simulator is running on port {port}.\n"),
            Err(_) => format!("Invalid port number: '{arg}'\n"),
        }
    }

    fn step(&mut self, direction: fn(&mut ConsoleSession) -> Option<u16>) -> String {
        match direction(&mut self.session) {
            Some(port) => format!("Selected port {port}.\n"),
            None => format!("{}\n", ConsoleError::NoSelection),
        }
    }

    /// Send `command` to the selected instance and decode the answer
    async fn forward(&mut self, command: &str) -> ConsoleResult<String> {
        let port = self.session.selected_port().ok_or(ConsoleError::NoSelection)?;
        let base_url = self
            .session
            .selected_endpoint()
            .map(|endpoint| endpoint.base_url())
            .ok_or(ConsoleError::NoSelection)?;

        let body = match self.client.get(&base_url, command).await {
            Ok(body) => body,
            Err(ConsoleError::ConnectionRefused { url }) => {
                process_warn!(ProcessId::current(), "Connection refused by {}", url);
                return Err(ConsoleError::StaleSelection { port });
            }
            Err(e) => return Err(e),
        };

        decode_response(command, &body)
    }

    /// Read-eval loop until `quit`, `exit` or end of input
    pub async fn run(&mut self, history_file: &Path) -> ConsoleResult<()> {
        let mut editor = DefaultEditor::new().map_err(|e| ConsoleError::history(e.to_string()))?;
        open_history(&mut editor, history_file)?;

        loop {
            let prompt = self.session.prompt();
            let line = tokio::task::block_in_place(|| editor.readline(&prompt));

            match line {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = editor.add_history_entry(line.trim()) {
                            process_debug!(ProcessId::current(), "History entry not recorded: {}", e);
                        }
                    }
                    match self.execute(&line).await {
                        ConsoleAction::Continue(output) => print!("{output}"),
                        ConsoleAction::Quit => break,
                    }
                }
                // Ctrl-C clears the line
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(input_failure(e)),
            }
        }

        if let Err(e) = editor.save_history(history_file) {
            logging::log_error(ProcessId::current(), "Saving history", &e);
        }
        Ok(())
    }
}

fn input_failure(error: ReadlineError) -> ConsoleError {
    match error {
        ReadlineError::Io(e) => ConsoleError::IoError(e),
        other => ConsoleError::input(other.to_string()),
    }
}

/// Create the history file if needed and load it
fn open_history(editor: &mut DefaultEditor, history_file: &Path) -> ConsoleResult<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(history_file)
        .map_err(|e| ConsoleError::history(format!("{}: {}", history_file.display(), e)))?;

    editor
        .load_history(history_file)
        .map_err(|e| ConsoleError::history(format!("{}: {}", history_file.display(), e)))
}

/// Pretty-print known answers; anything else is shown raw
pub fn decode_response(command: &str, body: &str) -> ConsoleResult<String> {
    match command {
        "status" => {
            let snapshot: StatusSnapshot = serde_json::from_str(body)
                .map_err(|e| ConsoleError::protocol(format!("status response: {e}")))?;
            Ok(snapshot.to_string())
        }
        "stop" => {
            let response: ShortResponse = serde_json::from_str(body)
                .map_err(|e| ConsoleError::protocol(format!("stop response: {e}")))?;
            Ok(response.to_string())
        }
        _ => Ok(if body.ends_with('\n') { body.to_string() } else { format!("{body}\n") }),
    }
}

pub fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for entry in HELP_TABLE {
        text.push_str(&format!("{entry}\n"));
    }
    text
}

fn join_ports(ports: &[u16]) -> String {
    ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
}
