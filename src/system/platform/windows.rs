use super::{LoadAverage, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn load_average() -> Option<LoadAverage> {
        // Windows has no run-queue load average
        None
    }

    fn logged_in_users() -> Option<usize> {
        None
    }
}
