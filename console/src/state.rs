//! Console session state
//!
//! The latest discovery result and which instance, if any, is selected.
//! The console is strictly sequential, so the session is owned outright.

use shared::InstanceEndpoint;

#[derive(Debug, Clone)]
pub struct ConsoleSession {
    host: String,
    /// Live ports from the last scan, ascending
    ports: Vec<u16>,
    selected: Option<usize>,
}

impl ConsoleSession {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ports: Vec::new(),
            selected: None,
        }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    pub fn selected_port(&self) -> Option<u16> {
        self.selected.map(|index| self.ports[index])
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Endpoint of the selected instance
    pub fn selected_endpoint(&self) -> Option<InstanceEndpoint> {
        self.selected_port()
            .map(|port| InstanceEndpoint::new(self.host.clone(), port))
    }

    /// Adopt a new scan result; selects the first port, or nothing if empty
    pub fn replace_ports(&mut self, mut ports: Vec<u16>) {
        ports.sort_unstable();
        ports.dedup();
        self.selected = if ports.is_empty() { None } else { Some(0) };
        self.ports = ports;
    }

    /// Select `port` if the last scan found it; otherwise keep the selection
    pub fn select_port(&mut self, port: u16) -> bool {
        match self.ports.iter().position(|&p| p == port) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Move to the next instance, wrapping at the end
    pub fn next(&mut self) -> Option<u16> {
        let index = self.selected?;
        self.selected = Some((index + 1) % self.ports.len());
        self.selected_port()
    }

    /// Move to the previous instance, wrapping at the start
    pub fn prev(&mut self) -> Option<u16> {
        let index = self.selected?;
        let len = self.ports.len();
        self.selected = Some((index + len - 1) % len);
        self.selected_port()
    }

    pub fn prompt(&self) -> String {
        match self.selected_port() {
            Some(port) => format!("@simulator:{port} > "),
            None => "@simtalk > ".to_string(),
        }
    }
}
