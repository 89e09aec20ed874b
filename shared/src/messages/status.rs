//! Instance ↔ Console messages
//!
//! Field names on the wire are PascalCase so existing dispatcher tooling and
//! older consoles keep decoding them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value of a clean acknowledgment
pub const SUCCESS_STATUS: &str = "Success";

/// Point-in-time view of a running simulation, recomputed on every request
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StatusSnapshot {
    pub program_started: String,
    pub run_duration: String,
    pub config_file: String,
    pub simulation_date_range: String,
    pub population_size: u32,
    pub loop_count: u32,
    pub generations_requested: u32,
    pub completed_loops: u32,
    pub completed_generations: u64,
    pub elapsed_time_last_gen: String,
    pub estimated_time_remaining: String,
    pub estimated_completion: String,
    #[serde(rename = "SID")]
    pub sid: i64,
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "MachineID", default)]
    pub machine_id: String,
    #[serde(default)]
    pub working_directory: String,
}

const LABEL_WIDTH: usize = 35;

fn labeled(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{label:>LABEL_WIDTH$}: {value}")
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SIMULATOR STATUS")?;
        labeled(f, "Program started", &self.program_started)?;
        labeled(f, "Run duration so far", &self.run_duration)?;
        labeled(f, "Config file", &self.config_file)?;
        labeled(f, "Simulation Date Range", &self.simulation_date_range)?;
        labeled(f, "Population size", self.population_size)?;
        labeled(
            f,
            "LoopCount and Generations requested",
            format_args!("{} loops, {} generations", self.loop_count, self.generations_requested),
        )?;
        labeled(
            f,
            "completed",
            format_args!("{} loops, {} generations", self.completed_loops, self.completed_generations),
        )?;
        labeled(f, "Elapsed time last generation", &self.elapsed_time_last_gen)?;
        labeled(f, "Estimated time remaining", &self.estimated_time_remaining)?;
        labeled(f, "Estimated completion", &self.estimated_completion)?;
        labeled(f, "Simulation ID", self.sid)?;
        if !self.url.is_empty() {
            labeled(f, "URL", &self.url)?;
        }
        if !self.machine_id.is_empty() {
            labeled(f, "Machine ID", &self.machine_id)?;
        }
        if !self.working_directory.is_empty() {
            labeled(f, "Working directory", &self.working_directory)?;
        }
        Ok(())
    }
}

/// Short `{Status, Message}` acknowledgment
///
/// Returned by an instance's `/stop` and by the dispatcher's `/command`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ShortResponse {
    pub status: String,
    pub message: String,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl ShortResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Only "success", in any case, counts as a clean acknowledgment
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case(SUCCESS_STATUS)
    }
}

impl fmt::Display for ShortResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Message: {}", self.message)
    }
}
