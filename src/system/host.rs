use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::platform::{self, LoadAverage};
use crate::format::round_2;

pub const DEFAULT_PROBE_ADDRESS: &str = "8.8.8.8:80";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    pub hostname: Option<String>,
    /// Kernel name and release, e.g. `Linux 6.8.0`.
    pub os: Option<String>,
    /// Distribution-level name, e.g. `Linux (Ubuntu 24.04)`.
    pub os_long: Option<String>,
    pub boot_time: Option<DateTime<Local>>,
    #[serde(
        rename = "uptime_secs",
        serialize_with = "super::snapshot::duration_secs"
    )]
    pub uptime: Duration,
    /// Set when uptime was forced to zero: the boot time is unknown or the
    /// clock reads earlier than it.
    pub uptime_clamped: bool,
    pub user_count: Option<usize>,
    pub ip_address: Option<IpAddr>,
    pub load: Option<LoadPercent>,
}

/// Load averages as a percentage of logical core capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadPercent {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

pub fn probe_host(probe_address: &str) -> HostInfo {
    let boot_secs = System::boot_time();
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (uptime, uptime_clamped) = uptime_since(boot_secs, now_secs);
    if boot_secs == 0 {
        tracing::warn!("boot time unavailable; uptime reported as zero");
    } else if uptime_clamped {
        tracing::warn!(
            boot_time = boot_secs,
            now = now_secs,
            "clock reads earlier than boot time; uptime clamped to zero"
        );
    }

    let boot_time = if boot_secs > 0 {
        i64::try_from(boot_secs)
            .ok()
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
    } else {
        None
    };

    let load = platform::load_average().and_then(|raw| normalize_load(raw, logical_cores()));

    HostInfo {
        hostname: System::host_name(),
        os: os_string(System::name(), System::kernel_version()),
        os_long: System::long_os_version(),
        boot_time,
        uptime,
        uptime_clamped,
        user_count: platform::logged_in_users(),
        ip_address: outbound_ip(probe_address),
        load,
    }
}

/// A `boot_secs` of 0 is sysinfo's failure value, not the epoch.
pub fn uptime_since(boot_secs: u64, now_secs: u64) -> (Duration, bool) {
    if boot_secs == 0 {
        return (Duration::ZERO, true);
    }
    match now_secs.checked_sub(boot_secs) {
        Some(secs) => (Duration::from_secs(secs), false),
        None => (Duration::ZERO, true),
    }
}

pub fn normalize_load(load: LoadAverage, cores: usize) -> Option<LoadPercent> {
    if cores == 0 {
        return None;
    }
    let per_core = |v: f64| round_2(v / cores as f64 * 100.0);
    Some(LoadPercent {
        one: per_core(load.one),
        five: per_core(load.five),
        fifteen: per_core(load.fifteen),
    })
}

/// Local address the OS would route through to reach `probe_address`.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub fn outbound_ip(probe_address: &str) -> Option<IpAddr> {
    let target = probe_address.to_socket_addrs().ok()?.next()?;
    let bind: SocketAddr = match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    };
    let socket = UdpSocket::bind(bind).ok()?;
    socket.connect(target).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() { None } else { Some(ip) }
}

fn logical_cores() -> usize {
    let sys =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    match sys.cpus().len() {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        n => n,
    }
}

fn os_string(name: Option<String>, kernel: Option<String>) -> Option<String> {
    match (name, kernel) {
        (Some(name), Some(kernel)) => Some(format!("{name} {kernel}")),
        (Some(name), None) => Some(name),
        (None, Some(kernel)) => Some(kernel),
        (None, None) => None,
    }
}
