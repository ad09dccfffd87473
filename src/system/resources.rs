use std::thread;
use std::time::Duration;

use serde::Serialize;
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, System};

use super::classify::Tier;
use crate::format::{bytes_to_gib, round_1};

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub core_count: usize,
    pub frequency_mhz: Option<u64>,
    pub usage_percent: f64,
    pub tier: Tier,
    pub per_core: Vec<CoreUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoreUsage {
    pub index: usize,
    pub usage_percent: f64,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: f64,
    pub tier: Tier,
}

impl CpuInfo {
    /// `frequency_mhz == 0` means the platform did not report one.
    pub fn from_samples(global: f32, per_core: &[f32], frequency_mhz: u64) -> Self {
        let usage_percent = round_1(global as f64);
        let per_core = per_core
            .iter()
            .enumerate()
            .map(|(index, &usage)| {
                let usage_percent = round_1(usage as f64);
                CoreUsage {
                    index,
                    usage_percent,
                    tier: Tier::classify(usage_percent),
                }
            })
            .collect::<Vec<_>>();
        CpuInfo {
            core_count: per_core.len(),
            frequency_mhz: (frequency_mhz > 0).then_some(frequency_mhz),
            usage_percent,
            tier: Tier::classify(usage_percent),
            per_core,
        }
    }
}

impl MemoryInfo {
    pub fn from_bytes(total_bytes: u64, used_bytes: u64) -> Self {
        let usage_percent = if total_bytes > 0 {
            round_1(used_bytes as f64 / total_bytes as f64 * 100.0)
        } else {
            0.0
        };
        MemoryInfo {
            total_bytes,
            used_bytes,
            usage_percent,
            tier: Tier::classify(usage_percent),
        }
    }

    pub fn total_gib(&self) -> f64 {
        bytes_to_gib(self.total_bytes)
    }

    pub fn used_gib(&self) -> f64 {
        bytes_to_gib(self.used_bytes)
    }
}

/// Blocks for `interval` (at least sysinfo's minimum) to get a real CPU delta.
pub fn probe_resources(interval: Duration) -> (CpuInfo, MemoryInfo) {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    thread::sleep(interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
    sys.refresh_cpu_all();
    sys.refresh_memory();

    let per_core: Vec<f32> = sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect();
    let frequency = sys.cpus().first().map(|cpu| cpu.frequency()).unwrap_or(0);

    let cpu = CpuInfo::from_samples(sys.global_cpu_usage(), &per_core, frequency);
    let memory = MemoryInfo::from_bytes(sys.total_memory(), sys.used_memory());
    (cpu, memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_tiers_are_per_core() {
        let cpu = CpuInfo::from_samples(42.04, &[12.0, 65.5, 99.9], 2400);
        assert_eq!(cpu.core_count, 3);
        assert_eq!(cpu.usage_percent, 42.0);
        assert_eq!(cpu.tier, Tier::Low);
        assert_eq!(cpu.frequency_mhz, Some(2400));
        let tiers: Vec<Tier> = cpu.per_core.iter().map(|c| c.tier).collect();
        assert_eq!(tiers, vec![Tier::Low, Tier::Medium, Tier::High]);
        assert_eq!(cpu.per_core[2].index, 2);
    }

    #[test]
    fn zero_frequency_is_unavailable() {
        let cpu = CpuInfo::from_samples(0.0, &[0.0], 0);
        assert_eq!(cpu.frequency_mhz, None);
    }

    #[test]
    fn memory_percent_and_gib() {
        let gib = 1024 * 1024 * 1024;
        let mem = MemoryInfo::from_bytes(16 * gib, 14 * gib);
        assert_eq!(mem.usage_percent, 87.5);
        assert_eq!(mem.tier, Tier::High);
        assert_eq!(mem.total_gib(), 16.0);
        assert_eq!(mem.used_gib(), 14.0);
    }

    #[test]
    fn zero_total_memory_does_not_divide() {
        let mem = MemoryInfo::from_bytes(0, 0);
        assert_eq!(mem.usage_percent, 0.0);
        assert_eq!(mem.tier, Tier::Low);
    }
}
