use sysinfo::System;

use super::{LoadAverage, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn load_average() -> Option<LoadAverage> {
        // sysinfo goes through getloadavg(3) here
        let load = System::load_average();
        Some(LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        })
    }

    fn logged_in_users() -> Option<usize> {
        super::utmpx::count_user_sessions()
    }
}
