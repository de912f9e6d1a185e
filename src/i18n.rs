// SPDX-License-Identifier: GPL-3.0-only

//! Translation catalogs
//!
//! Locale catalogs are JSON trees embedded into the binary. Lookup walks a
//! dot-separated key path; string templates substitute `{param}`
//! placeholders. A missing key or non-string node yields the key itself, so
//! an incomplete catalog degrades to visible key names instead of panicking.

use std::collections::HashMap;

use rust_embed::RustEmbed;
use serde_json::Value;
use tracing::warn;

use crate::constants::DEFAULT_LOCALE;

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Catalogs;

/// Locale tags with an embedded catalog, in embed order.
pub fn available_locales() -> Vec<String> {
    Catalogs::iter()
        .filter_map(|file| file.strip_suffix(".json").map(str::to_string))
        .collect()
}

pub fn is_available(tag: &str) -> bool {
    Catalogs::get(&format!("{tag}.json")).is_some()
}

/// A loaded catalog set with one active locale.
#[derive(Debug)]
pub struct Translator {
    locale: String,
    catalogs: HashMap<String, Value>,
}

impl Translator {
    /// Loads all embedded catalogs and activates `locale`, falling back to
    /// the default when the tag is unknown.
    pub fn new(locale: &str) -> Self {
        let mut catalogs = HashMap::new();
        for file in Catalogs::iter() {
            let Some(tag) = file.strip_suffix(".json") else {
                continue;
            };
            let Some(embedded) = Catalogs::get(&file) else {
                continue;
            };
            match serde_json::from_slice::<Value>(&embedded.data) {
                Ok(tree) => {
                    catalogs.insert(tag.to_string(), tree);
                }
                Err(e) => warn!(file = %file, error = %e, "Skipping malformed catalog"),
            }
        }

        let locale = if catalogs.contains_key(locale) {
            locale.to_string()
        } else {
            warn!(locale, "Unknown locale, using default");
            DEFAULT_LOCALE.to_string()
        };

        Self { locale, catalogs }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switches the active locale; unknown tags are ignored.
    pub fn set_locale(&mut self, tag: &str) -> bool {
        if self.catalogs.contains_key(tag) {
            self.locale = tag.to_string();
            true
        } else {
            false
        }
    }

    /// Looks up `key` in the active catalog and substitutes `{name}`
    /// placeholders from `params`. Unresolved keys come back verbatim;
    /// unresolved placeholders stay in braces.
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(mut node) = self.catalogs.get(&self.locale) else {
            return key.to_string();
        };
        for part in key.split('.') {
            match node.get(part) {
                Some(child) => node = child,
                None => return key.to_string(),
            }
        }
        let Some(template) = node.as_str() else {
            return key.to_string();
        };
        substitute(template, params)
    }
}

/// Replaces `{word}` placeholders. Anything without a matching parameter is
/// left as-is, including the braces.
fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        match tail.find('}') {
            Some(close) => {
                let name = &tail[..close];
                match params.iter().find(|(p, _)| *p == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
