//! Textual and structural predicates understood by every surface.
//!
//! Predicates are plain data so the Chromium surface can ship them into the
//! page as JSON and the fixture document can evaluate them in Rust with the
//! same semantics: roles OR-ed, attributes AND-ed, text patterns OR-ed, all
//! text comparisons case-insensitive over trimmed visible text.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Any,
    Button,
    Link,
    Article,
    Heading,
    Textbox,
    MenuItem,
    ListItem,
}

impl Role {
    /// CSS selector matching elements with this role, explicit or implicit.
    pub fn css(&self) -> &'static str {
        match self {
            Role::Any => "*",
            Role::Button => "[role=\"button\"], button",
            Role::Link => "a[href], [role=\"link\"]",
            Role::Article => "[role=\"article\"], article",
            Role::Heading => "[role=\"heading\"], h1, h2, h3, h4, h5, h6",
            Role::Textbox => "[role=\"textbox\"], textarea, input[type=\"text\"], [contenteditable=\"true\"]",
            Role::MenuItem => "[role=\"menuitem\"], [role=\"menuitemradio\"], [role=\"option\"]",
            Role::ListItem => "[role=\"listitem\"], li",
        }
    }

    /// Role implied by a bare tag name when no explicit role is present.
    pub fn implicit_for_tag(tag: &str) -> Option<Role> {
        match tag.to_ascii_lowercase().as_str() {
            "button" => Some(Role::Button),
            "a" => Some(Role::Link),
            "article" => Some(Role::Article),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(Role::Heading),
            "textarea" | "input" => Some(Role::Textbox),
            "li" => Some(Role::ListItem),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextPattern {
    Contains(String),
    Equals(String),
    Regex(String),
}

impl TextPattern {
    pub fn contains(value: impl Into<String>) -> Self {
        TextPattern::Contains(value.into())
    }

    pub fn equals(value: impl Into<String>) -> Self {
        TextPattern::Equals(value.into())
    }

    pub fn regex(value: impl Into<String>) -> Self {
        TextPattern::Regex(value.into())
    }

    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.trim().to_lowercase();
        match self {
            TextPattern::Contains(needle) => haystack.contains(&needle.to_lowercase()),
            TextPattern::Equals(expected) => haystack == expected.trim().to_lowercase(),
            TextPattern::Regex(pattern) => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(&haystack))
                .unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttrMatch {
    pub name: String,
    /// `None` only requires presence.
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub attributes: Vec<AttrMatch>,
    #[serde(default)]
    pub text: Vec<TextPattern>,
    #[serde(default)]
    pub min_text_len: Option<usize>,
    #[serde(default)]
    pub max_text_len: Option<usize>,
}

impl Predicate {
    pub fn role(role: Role) -> Self {
        Self {
            roles: vec![role],
            ..Default::default()
        }
    }

    pub fn any() -> Self {
        Self::role(Role::Any)
    }

    pub fn or_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.attributes.push(AttrMatch {
            name: name.into(),
            value: value.map(str::to_string),
        });
        self
    }

    pub fn with_text(mut self, pattern: TextPattern) -> Self {
        self.text.push(pattern);
        self
    }

    pub fn with_texts(mut self, patterns: impl IntoIterator<Item = TextPattern>) -> Self {
        self.text.extend(patterns);
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.min_text_len = Some(len);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.max_text_len = Some(len);
        self
    }

    /// CSS selector list covering the role set; attributes are appended to
    /// every alternative.
    pub fn css(&self) -> String {
        let roles: Vec<Role> = if self.roles.is_empty() {
            vec![Role::Any]
        } else {
            self.roles.clone()
        };
        let attrs: String = self
            .attributes
            .iter()
            .map(|attr| match &attr.value {
                Some(value) => format!("[{}=\"{}\"]", attr.name, value.replace('"', "\\\"")),
                None => format!("[{}]", attr.name),
            })
            .collect();
        roles
            .iter()
            .flat_map(|role| role.css().split(", "))
            .map(|alt| format!("{alt}{attrs}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text-side checks shared by every surface.
    pub fn matches_text(&self, text: &str) -> bool {
        let len = text.trim().chars().count();
        if let Some(min) = self.min_text_len {
            if len < min {
                return false;
            }
        }
        if let Some(max) = self.max_text_len {
            if len > max {
                return false;
            }
        }
        self.text.is_empty() || self.text.iter().any(|pattern| pattern.matches(text))
    }

    /// Structural checks against a role set and attribute lookup.
    pub fn matches_shape<'a>(
        &self,
        node_roles: &[Role],
        attribute: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        let role_ok = self.roles.is_empty()
            || self
                .roles
                .iter()
                .any(|role| *role == Role::Any || node_roles.contains(role));
        role_ok
            && self.attributes.iter().all(|attr| match attribute(&attr.name) {
                Some(actual) => attr.value.as_deref().map_or(true, |v| v == actual),
                None => false,
            })
    }
}
