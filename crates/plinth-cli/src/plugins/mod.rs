//! Built-in plugins
//!
//! Generators own the artifact types `generate` can produce. Feature plugins
//! own no type; they add dependencies and files to `init` when enabled.

pub mod features;
pub mod generators;
pub mod protocol;

pub use features::{LinterFeature, SwaggerFeature, TestingFeature};
pub use generators::GeneratorsHook;
pub use protocol::ProtocolHook;

use plinth_core::PluginHost;

/// Host with every built-in plugin, in registration order
pub fn host() -> PluginHost {
    PluginHost::builder()
        .hook(GeneratorsHook)
        .hook(ProtocolHook)
        .hook(SwaggerFeature)
        .hook(TestingFeature)
        .hook(LinterFeature)
        .build()
}
