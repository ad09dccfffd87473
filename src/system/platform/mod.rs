/// Raw 1/5/15-minute run-queue averages, not yet normalized by core count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Capability queries. `None` means the platform does not offer the
/// facility, which is not an error.
pub trait PlatformExtensions {
    fn load_average() -> Option<LoadAverage>;
    fn logged_in_users() -> Option<usize>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod utmpx;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn load_average() -> Option<LoadAverage> {
    platform_impl::Platform::load_average()
}

pub fn logged_in_users() -> Option<usize> {
    platform_impl::Platform::logged_in_users()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic() {
        let _ = load_average();
        let _ = logged_in_users();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_exposes_load_average() {
        let load = load_average().expect("/proc/loadavg should be readable");
        assert!(load.one >= 0.0 && load.five >= 0.0 && load.fifteen >= 0.0);
    }
}
