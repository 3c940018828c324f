// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds argument parsing and the app loop.
pub mod config;
pub mod error;
pub mod keystrokes;
pub mod metrics;
pub mod runtime;
pub mod segment;
pub mod session;
pub mod storage;
pub mod text_source;
pub mod ui;
pub mod util;

/// Poll interval of the app loop; keeps the elapsed-time display moving.
pub const TICK_RATE_MS: u64 = 100;
