//! System-level orchestration: TOML configuration sections and the top-level
//! build that turns them into a finalized mesh.

pub mod config;
pub mod top;

#[cfg(test)]
mod tests;
