pub mod catalog;
pub mod config;
pub mod session;

/// Whole seconds as `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
