//! Interactive terminal front-end using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompts;

pub use prompts::{
    install_terminal_guards, intro, outro, outro_failed, print_next_steps, restore_cursor,
    warn_version, CliclackAnswerer, CliclackReporter,
};
