//! Version string of the chatline binary.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Line printed for `--version`.
pub fn version_line() -> String {
    format!("chatline {}", VERSION)
}
