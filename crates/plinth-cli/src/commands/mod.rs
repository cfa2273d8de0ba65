//! Built-in commands

pub mod generate;
pub mod init;

pub use generate::GenerateCommand;
pub use init::InitCommand;

use plinth_core::CoreError;

pub(crate) fn invalid(command: &str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidContext {
        command: command.to_string(),
        message: message.into(),
    }
}
