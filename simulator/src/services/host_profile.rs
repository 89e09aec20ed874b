//! Host facts reported to the dispatcher

use std::path::Path;
use sysinfo::System;

use crate::types::HostProfile;

const MACHINE_ID_PATH: &str = "/etc/machine-id";
const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

impl HostProfile {
    /// Gather CPU count, memory, architecture and machine identity
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let cpus = match sys.cpus().len() {
            0 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };
        let host_name = System::host_name().unwrap_or_else(|| "unknown".to_string());

        Self {
            machine_id: machine_id(Path::new(MACHINE_ID_PATH), &host_name),
            host_name,
            cpus,
            memory: format_memory(sys.total_memory()),
            cpu_architecture: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Contents of the machine-id file, or the host name when it is missing or empty
pub fn machine_id(path: &Path, host_name: &str) -> String {
    std::fs::read_to_string(path)
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| host_name.to_string())
}

/// Total memory as whole gigabytes, rounded to nearest, e.g. "64GB"
pub fn format_memory(bytes: u64) -> String {
    format!("{}GB", (bytes + BYTES_PER_GB / 2) / BYTES_PER_GB)
}
