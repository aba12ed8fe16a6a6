/// Skillforge - Validated LLM Content Generation
///
/// Core library that turns unreliable generative-backend output into
/// contract-guaranteed game content (skill trees, character descriptions)
/// with layered validation and bounded retry.

pub mod config;
pub mod core;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
