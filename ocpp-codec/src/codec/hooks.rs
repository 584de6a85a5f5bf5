//! Vendor override hooks.
//!
//! Deployments sometimes need to rewrite the JSON of a particular type, e.g.
//! to strip a property a peer chokes on or to inject vendor data. Instead of a
//! custom serializer parameter per type, every codec call takes a
//! `CodecHooks` value holding two ordered chains of transforms keyed by type
//! label. The chains are applied in registration order.
//!
//! Hooks are passed per call and never stored globally, so two threads can use
//! different hook sets at the same time.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A JSON transform registered for one type label.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Matches every label.
pub const ANY_LABEL: &str = "*";

#[derive(Clone, Default)]
pub struct CodecHooks {
    before_parse: Vec<(String, Transform)>,
    after_serialize: Vec<(String, Transform)>,
}

impl CodecHooks {
    /// No hooks; the default for plain parsing and serialization.
    pub fn none() -> Self {
        Self::default()
    }

    /// Rewrite the raw JSON of `label` before it is parsed.
    pub fn before_parse(
        mut self,
        label: impl Into<String>,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.before_parse.push((label.into(), Arc::new(transform)));
        self
    }

    /// Rewrite the JSON of `label` after default serialization.
    pub fn after_serialize(
        mut self,
        label: impl Into<String>,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.after_serialize.push((label.into(), Arc::new(transform)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before_parse.is_empty() && self.after_serialize.is_empty()
    }

    /// Run the parse chain for `label`. Borrows when no hook matches.
    pub fn prepare<'a>(&self, label: &str, json: &'a Value) -> std::borrow::Cow<'a, Value> {
        apply(&self.before_parse, label, json)
    }

    /// Run the serialize chain for `label`.
    pub fn finish(&self, label: &str, json: Value) -> Value {
        let mut json = json;
        for (_, transform) in self.after_serialize.iter().filter(|(l, _)| label_matches(l, label)) {
            json = transform(json);
        }
        json
    }
}

fn label_matches(registered: &str, label: &str) -> bool {
    registered == ANY_LABEL || registered == label
}

fn apply<'a>(
    chain: &[(String, Transform)],
    label: &str,
    json: &'a Value,
) -> std::borrow::Cow<'a, Value> {
    let mut hooks = chain.iter().filter(|(l, _)| label_matches(l, label)).peekable();
    if hooks.peek().is_none() {
        return std::borrow::Cow::Borrowed(json);
    }

    let mut owned = json.clone();
    for (_, transform) in hooks {
        owned = transform(owned);
    }
    std::borrow::Cow::Owned(owned)
}

impl fmt::Debug for CodecHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = |chain: &[(String, Transform)]| {
            chain.iter().map(|(l, _)| l.clone()).collect::<Vec<_>>()
        };
        f.debug_struct("CodecHooks")
            .field("before_parse", &labels(&self.before_parse))
            .field("after_serialize", &labels(&self.after_serialize))
            .finish()
    }
}
