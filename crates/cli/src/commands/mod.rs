//! CLI commands for the lot sizer.

pub mod multiplier;
pub mod show_config;
pub mod size;

pub use multiplier::{run_multiplier, MultiplierArgs};
pub use show_config::{run_show_config, ShowConfigArgs};
pub use size::{run_size, SizeArgs};
