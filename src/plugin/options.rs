//! Typed plugin options.
//!
//! Options come from three layers, later ones winning: the plugin's defaults,
//! plain `data-*` attributes on the element (camel-cased keys), and the
//! inline `data-options="key: value; other: value"` attribute.

use std::collections::BTreeMap;
use std::fmt;

use crate::dom::{Dom, NodeId};

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl OptionValue {
    /// Coerce by trial: `true`/`false`, then a float, else the string itself.
    pub fn parse_value(text: &str) -> OptionValue {
        match text {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        // Rust also accepts `inf`/`nan` spellings; only numeric text counts.
        if text.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.trim().parse::<f64>() {
                return OptionValue::Number(n);
            }
        }
        OptionValue::Str(text.to_owned())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_owned())
    }
}

/// `close-on-click` -> `closeOnClick`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Options passed to a plugin constructor, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginOptions {
    values: BTreeMap<String, OptionValue>,
}

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `data-options` attribute: `;`-separated `key: value` pairs.
    ///
    /// Keys without a value are skipped.
    pub fn parse_data_options(text: &str) -> Self {
        let mut options = Self::new();
        for entry in text.split(';') {
            let mut parts = entry.splitn(2, ':').map(str::trim);
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }
            options.insert(key, OptionValue::parse_value(value));
        }
        options
    }

    /// Layer the sources for `element`: `defaults`, then its `data-*`
    /// attributes, then `inline` (the parsed `data-options`).
    pub fn resolve(defaults: &PluginOptions, dom: &Dom, element: NodeId, inline: &PluginOptions) -> Self {
        let mut merged = defaults.clone();
        if let Some(data) = dom.get(element) {
            for (name, value) in data.data_attributes() {
                if name == "options" {
                    continue;
                }
                merged.insert(camel_case(name), OptionValue::parse_value(value));
            }
        }
        merged.extend(inline);
        merged
    }

    /// Builder form of [`PluginOptions::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Copy every entry of `other` over this one.
    pub fn extend(&mut self, other: &PluginOptions) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_f64)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
