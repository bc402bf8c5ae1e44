//! Terraform resource name derivation

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::provider::types::Tag;

/// Character written in place of anything outside the identifier alphabet
pub const SUBSTITUTE: char = '-';

/// Placeholder for an empty label
const EMPTY_LABEL_NAME: &str = "resource";

/// Tag whose value names a resource
const NAME_TAG: &str = "Name";

lazy_static! {
    static ref ILLEGAL_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_\-]").unwrap();
}

/// A label made safe for use as a Terraform resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a free-text label into a Terraform resource name
///
/// Illegal characters are replaced one-for-one by [`SUBSTITUTE`], so
/// `"web server (1)"` becomes `"web-server--1-"`. Names must start with a
/// letter or underscore; anything else gets a leading `_`.
pub fn normalize(label: &str) -> Identifier {
    if label.is_empty() {
        return Identifier(EMPTY_LABEL_NAME.to_string());
    }

    let replaced = ILLEGAL_CHARS.replace_all(label, SUBSTITUTE.to_string().as_str());

    let starts_legal = replaced
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    if starts_legal {
        Identifier(replaced.into_owned())
    } else {
        Identifier(format!("_{}", replaced))
    }
}

/// Value of the `Name` tag, or `fallback` when absent or empty
pub fn name_from_tags<'a>(tags: &'a [Tag], fallback: &'a str) -> &'a str {
    tags.iter()
        .find(|tag| tag.key == NAME_TAG && !tag.value.is_empty())
        .map(|tag| tag.value.as_str())
        .unwrap_or(fallback)
}
