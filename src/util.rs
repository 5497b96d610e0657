/// Formats whole seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Whole minutes in `secs`, rounded down.
pub fn whole_minutes(secs: u64) -> u64 {
    secs / 60
}
