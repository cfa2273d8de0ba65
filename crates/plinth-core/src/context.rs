//! Generation context: the key/value state of one command invocation
//!
//! A [`Context`] starts from the raw command-line input, is extended by prompt
//! answers and then rewritten by the command's mapping step. During execution it
//! is shared between tasks as a [`SharedContext`].

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Open-ended key/value bag accumulated across the lifecycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON value. Anything but an object yields an empty context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value for `key`; `None` when missing, null or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Truthiness of `key`: missing, null, `false`, `""` and `0` are false
    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Whether a non-null value is present for `key`
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !v.is_null())
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Chainable variant of [`Context::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Merge `other` into this context. Keys from `other` win.
    pub fn merge(&mut self, other: Context) {
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Resolve a dotted path (`passportPackage.name`) against the context
    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replace every `{{ path }}` placeholder with the matching value.
    ///
    /// Missing values render as an empty string. Unterminated placeholders are kept verbatim.
    pub fn interpolate(&self, template: &str) -> String {
        self.substitute(template, false)
    }

    /// Like [`Context::interpolate`], but placeholders without a value are
    /// kept as written so a later pass can resolve them.
    pub fn interpolate_known(&self, template: &str) -> String {
        self.substitute(template, true)
    }

    fn substitute(&self, template: &str, keep_missing: bool) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match self.lookup_path(key) {
                        Some(value) => out.push_str(&render_value(value)),
                        None if keep_missing => out.push_str(&rest[start..start + end + 4]),
                        None => {}
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

impl From<Map<String, Value>> for Context {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Context shared by the tasks of one execution.
///
/// Cloning shares the same underlying context. Code that takes a
/// [`SharedContext::snapshot`] to work on must write it back with
/// [`SharedContext::replace`], or the changes are lost.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    inner: Arc<RwLock<Context>>,
}

impl SharedContext {
    pub fn new(context: Context) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Context> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Context> {
        self.inner.write().await
    }

    /// Owned copy of the current state
    pub async fn snapshot(&self) -> Context {
        self.inner.read().await.clone()
    }

    /// Overwrite the shared state with `context`
    pub async fn replace(&self, context: Context) {
        *self.inner.write().await = context;
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.write().await.set(key, value);
    }

    pub async fn interpolate(&self, template: &str) -> String {
        self.inner.read().await.interpolate(template)
    }

    /// Whether two handles point at the same context
    pub fn same_as(&self, other: &SharedContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpolate_replaces_known_keys() {
        let ctx = Context::from_value(json!({"symbolName": "UserController", "count": 2}));
        assert_eq!(
            ctx.interpolate("Generate {{symbolName}} ({{ count }})"),
            "Generate UserController (2)"
        );
    }

    #[test]
    fn test_interpolate_missing_and_unterminated() {
        let ctx = Context::new();
        assert_eq!(ctx.interpolate("a{{missing}}b"), "ab");
        assert_eq!(ctx.interpolate("a{{oops"), "a{{oops");
    }

    #[test]
    fn test_interpolate_known_keeps_missing() {
        let ctx = Context::from_value(json!({"name": "api"}));
        assert_eq!(
            ctx.interpolate_known("{{name}}@{{ version }}"),
            "api@{{ version }}"
        );
    }

    #[test]
    fn test_interpolate_dotted_path() {
        let ctx = Context::from_value(json!({"pkg": {"name": "passport-local"}}));
        assert_eq!(ctx.interpolate("{{pkg.name}}"), "passport-local");
    }

    #[test]
    fn test_merge_keeps_both_sides() {
        let mut ctx = Context::from_value(json!({"type": "protocol"}));
        ctx.merge(Context::from_value(json!({"passportPackage": "p1"})));
        assert_eq!(ctx.get_str("type"), Some("protocol"));
        assert_eq!(ctx.get_str("passportPackage"), Some("p1"));
    }

    #[test]
    fn test_flag_truthiness() {
        let ctx = Context::from_value(json!({"a": true, "b": "", "c": 0, "d": "x", "e": null}));
        assert!(ctx.flag("a"));
        assert!(!ctx.flag("b"));
        assert!(!ctx.flag("c"));
        assert!(ctx.flag("d"));
        assert!(!ctx.flag("e"));
        assert!(!ctx.flag("missing"));
        assert!(!ctx.contains("e"));
    }

    #[tokio::test]
    async fn test_snapshot_changes_are_lost_without_replace() {
        let shared = SharedContext::new(Context::new().with("name", "a"));

        let mut copy = shared.snapshot().await;
        copy.set("name", "b");
        assert_eq!(shared.read().await.get_str("name"), Some("a"));

        shared.replace(copy).await;
        assert_eq!(shared.read().await.get_str("name"), Some("b"));
    }
}
