use super::{LoadAverage, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn load_average() -> Option<LoadAverage> {
        // "0.42 0.37 0.30 2/1187 40213"
        let contents = std::fs::read_to_string("/proc/loadavg").ok()?;
        parse_loadavg(&contents)
    }

    fn logged_in_users() -> Option<usize> {
        super::utmpx::count_user_sessions()
    }
}

fn parse_loadavg(contents: &str) -> Option<LoadAverage> {
    let mut fields = contents.split_whitespace();
    let one = fields.next()?.parse().ok()?;
    let five = fields.next()?.parse().ok()?;
    let fifteen = fields.next()?.parse().ok()?;
    Some(LoadAverage { one, five, fifteen })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_proc_loadavg_line() {
        let load = parse_loadavg("0.42 1.50 2.00 2/1187 40213\n").unwrap();
        assert_eq!(load.one, 0.42);
        assert_eq!(load.five, 1.5);
        assert_eq!(load.fifteen, 2.0);
    }

    #[test]
    fn rejects_truncated_line() {
        assert!(parse_loadavg("0.42 1.50").is_none());
        assert!(parse_loadavg("").is_none());
    }
}
