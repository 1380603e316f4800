//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tidytask_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("tidytask_core ping={}", tidytask_core::ping());
    println!("tidytask_core version={}", tidytask_core::core_version());
}
