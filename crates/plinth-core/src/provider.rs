//! Provider registry
//!
//! A provider is a generation "type" (`controller`, `protocol`, ...) claimed by
//! exactly one plugin at a time. The registry keeps one entry per value; a later
//! registration of the same value replaces the earlier one.

use crate::error::CoreError;
use crate::prompt::Choice;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Stable identity of a registering component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(&'static str);

impl OwnerId {
    /// Identity derived from a component's type
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>())
    }

    /// Identity from an explicit name
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Last path segment of the identity (`my_crate::hooks::ProtocolHook` -> `ProtocolHook`)
    pub fn short_name(&self) -> &'static str {
        let base = self.0.split('<').next().unwrap_or(self.0);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Provider declaration made by a plugin, before it is tagged with an owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDecl {
    /// Unique key, e.g. "protocol"
    pub value: String,
    /// Display label
    pub name: String,
    /// Template id used to render this provider (defaults to the value)
    pub model: Option<String>,
    /// Directory holding the provider's own templates
    pub base_dir: Option<PathBuf>,
}

impl ProviderDecl {
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
            model: None,
            base_dir: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

/// Registered provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub value: String,
    pub name: String,
    pub owner: OwnerId,
    pub model: Option<String>,
    pub base_dir: Option<PathBuf>,
}

impl ProviderInfo {
    /// Template id to render for this provider
    pub fn template_id(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.value)
    }
}

/// Registry of providers keyed by value, in registration order
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderInfo>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `decl` under `owner`. An existing entry with the same value is
    /// replaced in place and keeps its position in [`ProviderRegistry::list_all`].
    pub fn register(&mut self, decl: ProviderDecl, owner: OwnerId) -> &mut Self {
        let info = ProviderInfo {
            value: decl.value,
            name: decl.name,
            owner,
            model: decl.model,
            base_dir: decl.base_dir,
        };

        match self.index.get(&info.value) {
            Some(&slot) => {
                let previous = &self.entries[slot];
                if previous.owner != owner {
                    tracing::warn!(
                        provider = %info.value,
                        previous = %previous.owner,
                        owner = %owner,
                        "provider re-registered by another owner, last registration wins"
                    );
                }
                self.entries[slot] = info;
            }
            None => {
                tracing::debug!(provider = %info.value, owner = %owner, "provider registered");
                self.index.insert(info.value.clone(), self.entries.len());
                self.entries.push(info);
            }
        }

        self
    }

    pub fn lookup(&self, value: &str) -> Option<&ProviderInfo> {
        self.index.get(value).map(|&slot| &self.entries[slot])
    }

    /// Same as [`ProviderRegistry::lookup`] but unknown values are an error
    pub fn get(&self, value: &str) -> Result<&ProviderInfo, CoreError> {
        self.lookup(value).ok_or_else(|| self.unknown(value))
    }

    /// Whether the most recent registration of `value` was made by `owner`.
    ///
    /// Querying a value nobody registered is a wiring bug and returns
    /// [`CoreError::UnknownProvider`].
    pub fn is_owned_by(&self, value: &str, owner: OwnerId) -> Result<bool, CoreError> {
        self.get(value).map(|info| info.owner == owner)
    }

    pub fn list_all(&self) -> impl Iterator<Item = &ProviderInfo> {
        self.entries.iter()
    }

    /// Providers as select choices, in registration order
    pub fn choices(&self) -> Vec<Choice> {
        self.entries
            .iter()
            .map(|info| Choice::new(info.value.clone(), info.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn unknown(&self, value: &str) -> CoreError {
        CoreError::UnknownProvider {
            value: value.to_string(),
            registered: self
                .entries
                .iter()
                .map(|info| info.value.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct HookA;
    struct HookB;

    #[test]
    fn test_owner_checks() {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderDecl::new("protocol", "Protocol"), OwnerId::of::<HookA>());

        assert!(registry.is_owned_by("protocol", OwnerId::of::<HookA>()).unwrap());
        assert!(!registry.is_owned_by("protocol", OwnerId::of::<HookB>()).unwrap());
    }

    #[test]
    fn test_unknown_value_is_an_error() {
        let registry = ProviderRegistry::new();
        let err = registry
            .is_owned_by("graphql", OwnerId::of::<HookA>())
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownProvider { ref value, .. } if value == "graphql"));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut registry = ProviderRegistry::new();
        registry
            .register(ProviderDecl::new("controller", "Controller"), OwnerId::of::<HookA>())
            .register(ProviderDecl::new("service", "Service"), OwnerId::of::<HookA>())
            .register(ProviderDecl::new("controller", "Ctrl"), OwnerId::of::<HookB>());

        let values: Vec<_> = registry.list_all().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["controller", "service"]);

        let info = registry.lookup("controller").unwrap();
        assert_eq!(info.name, "Ctrl");
        assert_eq!(info.owner, OwnerId::of::<HookB>());
    }

    #[test]
    fn test_owner_short_name() {
        assert_eq!(OwnerId::of::<HookA>().short_name(), "HookA");
        assert_eq!(OwnerId::named("swagger").short_name(), "swagger");
    }

    #[test]
    fn test_template_id_defaults_to_value() {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderDecl::new("server", "Server"), OwnerId::of::<HookA>());
        registry.register(
            ProviderDecl::new("protocol", "Protocol").model("passport.protocol"),
            OwnerId::of::<HookA>(),
        );
        assert_eq!(registry.lookup("server").unwrap().template_id(), "server");
        assert_eq!(
            registry.lookup("protocol").unwrap().template_id(),
            "passport.protocol"
        );
    }

    const OWNERS: [OwnerId; 3] = [
        OwnerId::named("first"),
        OwnerId::named("second"),
        OwnerId::named("third"),
    ];

    proptest! {
        #[test]
        fn prop_last_registration_wins(
            ops in prop::collection::vec((0usize..6, 0usize..3, "[a-z]{1,8}"), 1..40)
        ) {
            let mut registry = ProviderRegistry::new();
            let mut expected: HashMap<String, (String, OwnerId)> = HashMap::new();

            for (key, owner, name) in &ops {
                let value = format!("type{}", key);
                registry.register(ProviderDecl::new(value.clone(), name.clone()), OWNERS[*owner]);
                expected.insert(value, (name.clone(), OWNERS[*owner]));
            }

            prop_assert_eq!(registry.len(), expected.len());
            for (value, (name, owner)) in &expected {
                let info = registry.lookup(value).unwrap();
                prop_assert_eq!(&info.name, name);
                prop_assert_eq!(info.owner, *owner);
                for other in OWNERS {
                    prop_assert_eq!(registry.is_owned_by(value, other).unwrap(), other == *owner);
                }
            }

            let mut seen = std::collections::HashSet::new();
            for info in registry.list_all() {
                prop_assert!(seen.insert(info.value.clone()));
            }
        }
    }
}
