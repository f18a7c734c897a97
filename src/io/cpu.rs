//! Host CPU information.

use std::sync::OnceLock;

use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
    pub vendor: Option<String>,
    pub brand: Option<String>,
}

static CPU_INFO: OnceLock<CpuInfo> = OnceLock::new();

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl CpuInfo {
    /// Probes the host. Prefer [`CpuInfo::get`], which probes once.
    pub fn probe() -> Self {
        let system =
            System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
        let cpus = system.cpus();

        let logical_cores = match cpus.len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };
        let first = cpus.first();

        let info = Self {
            logical_cores,
            physical_cores: System::physical_core_count(),
            vendor: first.and_then(|c| non_empty(c.vendor_id())),
            brand: first.and_then(|c| non_empty(c.brand())),
        };
        tracing::debug!("probed cpu: {:?}", info);
        info
    }

    pub fn get() -> &'static CpuInfo {
        CPU_INFO.get_or_init(Self::probe)
    }
}

/// Number of logical processors; always at least 1.
pub fn cpu_cores() -> usize {
    CpuInfo::get().logical_cores
}

pub fn cpu_physical_cores() -> Option<usize> {
    CpuInfo::get().physical_cores
}

/// Whether the host exposes more logical processors than physical cores.
pub fn cpu_hyper_threads() -> bool {
    match cpu_physical_cores() {
        Some(physical) => cpu_cores() > physical,
        None => false,
    }
}

pub fn cpu_vendor() -> Option<String> {
    CpuInfo::get().vendor.clone()
}

pub fn cpu_brand() -> Option<String> {
    CpuInfo::get().brand.clone()
}
