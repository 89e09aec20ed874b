//! Console commands and help table

use std::fmt;

/// One row of the `help` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub name: &'static str,
    pub description: &'static str,
}

impl fmt::Display for HelpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {:<10} : {}", self.name, self.description)
    }
}

pub const HELP_TABLE: &[HelpEntry] = &[
    HelpEntry { name: "status", description: "Get the current status of the selected simulator." },
    HelpEntry { name: "stop", description: "Tell the simulator to stop after completing the current generation." },
    HelpEntry { name: "ports", description: "List the ports of all running simulators found by the last scan." },
    HelpEntry { name: "port <n>", description: "Select the simulator on port n." },
    HelpEntry { name: "next", description: "Select the next simulator." },
    HelpEntry { name: "prev", description: "Select the previous simulator." },
    HelpEntry { name: "rescan", description: "Look for running simulators again." },
    HelpEntry { name: "help", description: "Show this list." },
    HelpEntry { name: "quit", description: "Leave simtalk (also 'exit')." },
];

/// A parsed console input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Empty,
    Ports,
    /// Raw argument of `port`, validated against the last scan
    Port(String),
    Next,
    Prev,
    Rescan,
    Help,
    Quit,
    /// Anything else, sent to the selected instance as a path
    Forward(String),
}

impl ConsoleCommand {
    /// Reserved words match only with their exact argument count; any other
    /// shape is forwarded unchanged
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => ConsoleCommand::Empty,
            ["ports"] => ConsoleCommand::Ports,
            ["port", arg] => ConsoleCommand::Port(arg.to_string()),
            ["next"] => ConsoleCommand::Next,
            ["prev"] => ConsoleCommand::Prev,
            ["rescan"] => ConsoleCommand::Rescan,
            ["help"] => ConsoleCommand::Help,
            ["quit" | "exit"] => ConsoleCommand::Quit,
            _ => ConsoleCommand::Forward(line.to_string()),
        }
    }
}

/// What the read-eval loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Print the text and prompt again
    Continue(String),
    Quit,
}
