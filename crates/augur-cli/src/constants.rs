pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const BINARY_NAME: &str = env!("CARGO_BIN_NAME");

/// Shown when a fortune comes back without any text
pub const QUIET_STARS: &str = "The stars are quiet for now. Try again later.";

/// Seconds between video status checks
pub const VIDEO_POLL_SECONDS: u64 = 10;
