//! Script registry
//!
//! Tracks every script the engine has parsed, keyed by engine-assigned id
//! and by resolvable URL. Scripts without a URL (eval code) get a stable
//! synthetic placeholder URL derived from their id so later breakpoint and
//! source requests can still address them.
//!
//! Ignored scripts (content scripts, internal engine scripts, extension
//! namespaces) stay id-indexed - frames still need symbolizing - but are
//! excluded from the URL index and thereby from user-facing breakpoint and
//! source flows.

use crate::cdp::ScriptParsedParams;
use crate::constants::{EXTENSION_URL_PREFIXES, PLACEHOLDER_URL_SCHEME};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// One parsed script. Immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    /// Engine-assigned id
    pub id: String,
    /// Real URL, or a synthetic placeholder of the form
    /// `debugadapter://<id>` when the engine supplied none
    pub url: String,
    pub source_map_url: Option<String>,
    pub is_content_script: bool,
    pub is_internal_script: bool,
}

impl ScriptDescriptor {
    /// True when the URL was synthesized by the registry
    pub fn has_placeholder_url(&self) -> bool {
        is_placeholder_url(&self.url)
    }
}

/// True for synthetic URLs assigned to URL-less scripts
pub fn is_placeholder_url(url: &str) -> bool {
    url.starts_with(PLACEHOLDER_URL_SCHEME)
}

/// Derive the deterministic placeholder URL for a script id
pub fn placeholder_url(script_id: &str) -> String {
    format!("{}{}", PLACEHOLDER_URL_SCHEME, script_id)
}

/// Extract the script id back out of a placeholder URL
pub fn script_id_from_placeholder(url: &str) -> Option<&str> {
    url.strip_prefix(PLACEHOLDER_URL_SCHEME)
}

/// Dual-index registry of parsed scripts
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    by_id: HashMap<String, Arc<ScriptDescriptor>>,
    by_url: HashMap<String, Arc<ScriptDescriptor>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parsed script, synthesizing a placeholder URL when the
    /// engine supplied none. Returns the stored descriptor.
    pub fn record_parsed(&mut self, params: ScriptParsedParams) -> Arc<ScriptDescriptor> {
        let url = if params.url.is_empty() {
            placeholder_url(&params.script_id)
        } else {
            params.url
        };

        let descriptor = Arc::new(ScriptDescriptor {
            id: params.script_id,
            url,
            source_map_url: params.source_map_url,
            is_content_script: params.is_content_script,
            is_internal_script: params.is_internal_script,
        });

        trace!(
            "Script parsed: id={} url={} ignored={}",
            descriptor.id,
            descriptor.url,
            self.should_ignore(&descriptor)
        );

        self.by_id
            .insert(descriptor.id.clone(), Arc::clone(&descriptor));
        // URL index only carries non-ignored scripts with a resolvable URL
        if !self.should_ignore(&descriptor) && !descriptor.url.is_empty() {
            self.by_url
                .insert(descriptor.url.clone(), Arc::clone(&descriptor));
        }

        descriptor
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&Arc<ScriptDescriptor>> {
        self.by_id.get(id)
    }

    pub fn lookup_by_url(&self, url: &str) -> Option<&Arc<ScriptDescriptor>> {
        self.by_url.get(url)
    }

    /// Non-user code: content scripts, internal engine scripts, and
    /// browser-extension namespaces.
    pub fn should_ignore(&self, descriptor: &ScriptDescriptor) -> bool {
        descriptor.is_content_script
            || descriptor.is_internal_script
            || EXTENSION_URL_PREFIXES
                .iter()
                .any(|prefix| descriptor.url.starts_with(prefix))
    }

    /// Discard both indices. Called on attach-context teardown.
    pub fn reset(&mut self) {
        debug!(
            "Resetting script registry ({} scripts)",
            self.by_id.len()
        );
        self.by_id.clear();
        self.by_url.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(id: &str, url: &str) -> ScriptParsedParams {
        ScriptParsedParams {
            script_id: id.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_and_lookup_both_indices() {
        let mut registry = ScriptRegistry::new();
        registry.record_parsed(parsed("7", "http://localhost/app.js"));

        assert_eq!(
            registry.lookup_by_id("7").unwrap().url,
            "http://localhost/app.js"
        );
        assert_eq!(
            registry.lookup_by_url("http://localhost/app.js").unwrap().id,
            "7"
        );
    }

    #[test]
    fn test_placeholder_url_synthesized_for_eval_code() {
        let mut registry = ScriptRegistry::new();
        let descriptor = registry.record_parsed(parsed("42", ""));

        assert_eq!(descriptor.url, "debugadapter://42");
        assert!(descriptor.has_placeholder_url());
        // Addressable by the synthetic URL for later setBreakpoints calls
        assert!(registry.lookup_by_url("debugadapter://42").is_some());
        assert_eq!(script_id_from_placeholder(&descriptor.url), Some("42"));
    }

    #[test]
    fn test_ignored_scripts_id_indexed_only() {
        let mut registry = ScriptRegistry::new();

        let mut content = parsed("1", "http://site/content.js");
        content.is_content_script = true;
        registry.record_parsed(content);

        let mut internal = parsed("2", "internal/v8/gc.js");
        internal.is_internal_script = true;
        registry.record_parsed(internal);

        registry.record_parsed(parsed("3", "chrome-extension://abc/bg.js"));

        for id in ["1", "2", "3"] {
            assert!(registry.lookup_by_id(id).is_some(), "id {} missing", id);
        }
        assert!(registry.lookup_by_url("http://site/content.js").is_none());
        assert!(registry.lookup_by_url("internal/v8/gc.js").is_none());
        assert!(registry
            .lookup_by_url("chrome-extension://abc/bg.js")
            .is_none());
    }

    #[test]
    fn test_reset_discards_both_indices() {
        let mut registry = ScriptRegistry::new();
        registry.record_parsed(parsed("7", "http://localhost/app.js"));
        registry.reset();

        assert!(registry.lookup_by_id("7").is_none());
        assert!(registry.lookup_by_url("http://localhost/app.js").is_none());
    }
}
