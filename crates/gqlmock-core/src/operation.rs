//! GraphQL operation types
//!
//! Canonical representation of one outgoing GraphQL call as the engine sees
//! it, plus the call-time context that travels alongside it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{MockError, Result};

/// Variables passed to an operation at call time
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// Opaque identity of a parsed GraphQL document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an identity the host already computed (e.g. a persisted query id)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identity from query source text.
    ///
    /// The source is reduced to its token stream before hashing, so layout,
    /// commas and comments do not change its identity.
    pub fn from_source(source: &str) -> Self {
        let normalized = normalize_source(source);
        let digest = Sha256::digest(normalized.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One outgoing GraphQL call. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    operation_name: String,
    document: DocumentId,
    #[serde(default)]
    variables: Variables,
}

impl OperationDescriptor {
    pub fn new(operation_name: impl Into<String>, document: DocumentId, variables: Variables) -> Self {
        Self {
            operation_name: operation_name.into(),
            document,
            variables,
        }
    }

    /// Build a descriptor straight from query source text
    pub fn from_source(source: &str, variables: Variables) -> Result<Self> {
        let operation_name = operation_name_from_source(source).ok_or_else(|| {
            MockError::InvalidDocument("document has no named operation".to_string())
        })?;
        Ok(Self::new(
            operation_name,
            DocumentId::from_source(source),
            variables,
        ))
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Same operation name and document, regardless of variables
    pub fn same_shape(&self, other: &OperationDescriptor) -> bool {
        self.operation_name == other.operation_name && self.document == other.document
    }
}

/// Call-time context carried next to a descriptor (simulated headers etc.)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallContext {
    #[serde(default)]
    pub context: Variables,
    #[serde(default)]
    pub extensions: Variables,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: Variables) -> Self {
        self.context = context;
        self
    }

    pub fn with_extensions(mut self, extensions: Variables) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Name of the first named operation definition in a document.
///
/// Only keywords that open a top-level definition count, so field names,
/// argument names and fragment bodies never shadow the operation.
pub fn operation_name_from_source(source: &str) -> Option<String> {
    let mut tokens = Tokens::new(source).peekable();
    let mut depth = 0usize;
    let mut definition_start = true;

    while let Some(token) = tokens.next() {
        match token {
            "{" | "(" | "[" => {
                depth += 1;
                definition_start = false;
            }
            "}" | ")" | "]" => {
                depth = depth.saturating_sub(1);
                definition_start = token == "}" && depth == 0;
            }
            "query" | "mutation" | "subscription" if depth == 0 && definition_start => {
                definition_start = false;
                if let Some(name) = tokens.next_if(|next| is_name(next)) {
                    return Some(name.to_string());
                }
            }
            _ => definition_start = false,
        }
    }
    None
}

/// Canonical token form of a document: comments, commas and layout are
/// dropped, string literals are kept verbatim.
fn normalize_source(source: &str) -> String {
    Tokens::new(source).collect::<Vec<_>>().join(" ")
}

fn is_name(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Minimal GraphQL lexer yielding names, string literals and single
/// punctuators
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(source: &'a str) -> Self {
        Self { rest: source }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            self.rest = self.rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
            match self.rest.strip_prefix('#') {
                Some(comment) => {
                    self.rest = comment.find('\n').map_or("", |end| &comment[end..]);
                }
                None => break,
            }
        }

        let first = self.rest.chars().next()?;
        let len = if first == '"' {
            self.rest.len() - skip_string(&self.rest[1..]).len()
        } else if first == '_' || first.is_ascii_alphanumeric() {
            self.rest
                .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
                .unwrap_or(self.rest.len())
        } else {
            first.len_utf8()
        };
        let (token, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(token)
    }
}

/// Skip past the closing quote of a string whose opening quote is consumed
fn skip_string(after_quote: &str) -> &str {
    if let Some(block) = after_quote.strip_prefix("\"\"") {
        return block.find("\"\"\"").map_or("", |end| &block[end + 3..]);
    }
    let mut escaped = false;
    for (i, c) in after_quote.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return &after_quote[i + 1..],
            '\n' => return &after_quote[i..],
            _ => escaped = false,
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GET_LOCATION: &str = r#"
        query GetLocation($locationId: Int!) {
          location(id: $locationId) {
            id
            name
          }
        }
    "#;

    fn vars(value: serde_json::Value) -> Variables {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_operation_name_from_source() {
        assert_eq!(
            operation_name_from_source(GET_LOCATION),
            Some("GetLocation".to_string())
        );
        assert_eq!(
            operation_name_from_source("mutation AddPin($id: ID!) { addPin(id: $id) }"),
            Some("AddPin".to_string())
        );
    }

    #[test]
    fn test_operation_name_skips_comments_strings_and_fragments() {
        let source = r#"
            # query NotThis
            fragment LocationFields on Location { id description(format: "query Nope") }
            query GetLocations { locations { ...LocationFields } }
        "#;
        assert_eq!(
            operation_name_from_source(source),
            Some("GetLocations".to_string())
        );
    }

    #[test]
    fn test_anonymous_operation_has_no_name() {
        assert_eq!(operation_name_from_source("{ locations { id } }"), None);
        assert_eq!(operation_name_from_source("query { locations { id } }"), None);
        assert!(OperationDescriptor::from_source("{ locations { id } }", Variables::new()).is_err());
    }

    #[test]
    fn test_document_id_ignores_formatting() {
        let compact = "query GetLocation($locationId: Int!) { location(id: $locationId) { id name } }";
        assert_eq!(DocumentId::from_source(GET_LOCATION), DocumentId::from_source(compact));
        assert_ne!(
            DocumentId::from_source(GET_LOCATION),
            DocumentId::from_source("query GetLocations { locations { id } }")
        );
        assert_eq!(DocumentId::from_source(compact).as_str().len(), 64);
    }

    #[test]
    fn test_operation_name_after_fragment_with_keyword_fields() {
        let source = r#"
            fragment SearchFields on Root {
              search(query: "zurich") { id }
              query { id }
            }
            query SearchLocations { ...SearchFields }
        "#;
        assert_eq!(
            operation_name_from_source(source),
            Some("SearchLocations".to_string())
        );
        assert_eq!(
            operation_name_from_source("fragment F on query { id } query Q { ...F }"),
            Some("Q".to_string())
        );
    }

    #[test]
    fn test_document_id_ignores_comments_and_commas() {
        assert_eq!(
            DocumentId::from_source("query A { a }"),
            DocumentId::from_source("query A { a } # trailing note")
        );
        assert_eq!(
            DocumentId::from_source("query A($x: Int, $y: Int) { a(x: $x, y: $y) }"),
            DocumentId::from_source("query A($x: Int $y: Int) { a(x: $x y: $y) }")
        );
    }

    #[test]
    fn test_document_id_keeps_string_literals() {
        assert_ne!(
            DocumentId::from_source(r#"query A { a(name: "x  y") }"#),
            DocumentId::from_source(r#"query A { a(name: "x y") }"#)
        );
        assert_ne!(
            DocumentId::from_source(r##"query A { a(name: "# not a comment") }"##),
            DocumentId::from_source(r#"query A { a(name: "") }"#)
        );
    }

    #[test]
    fn test_same_shape_ignores_variables() {
        let a = OperationDescriptor::from_source(GET_LOCATION, vars(json!({"locationId": 1}))).unwrap();
        let b = OperationDescriptor::from_source(GET_LOCATION, vars(json!({"locationId": 2}))).unwrap();
        let other = OperationDescriptor::new("GetLocation", DocumentId::new("other-doc"), Variables::new());

        assert!(a.same_shape(&b));
        assert_ne!(a, b);
        assert!(!a.same_shape(&other));
        assert_eq!(a.operation_name(), "GetLocation");
    }

    #[test]
    fn test_descriptor_serde() {
        let desc = OperationDescriptor::new("GetLocations", DocumentId::new("doc-1"), Variables::new());
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["operation_name"], "GetLocations");
        assert_eq!(json["document"], "doc-1");
    }
}
