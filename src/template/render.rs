//! Single-pass `$name` substitution engine.
//!
//! Used for every rendered artifact (inventories, playbooks, Dockerfiles)
//! and for every string field of a pipeline step.
//!
//! # Error Handling
//!
//! Undefined variables are an error rather than an empty substitution, and
//! the error names the first unresolved placeholder in left-to-right order.

use std::collections::HashMap;
use std::fmt;

/// Placeholder name to value mapping for a single render call.
pub type Bindings = HashMap<String, String>;

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A variable was referenced but not bound.
    UndefinedVariable {
        /// The name of the undefined variable.
        name: String,
        /// Byte offset of the `$` that starts the placeholder.
        position: usize,
    },
    /// A `${` was found without a matching `}`.
    UnmatchedBrace {
        /// Byte offset of the `$` that starts the placeholder.
        position: usize,
    },
    /// A `${...}` placeholder whose content is not an identifier (e.g. `${}`).
    InvalidVariableName {
        /// The text found between the braces.
        name: String,
        /// Byte offset of the `$` that starts the placeholder.
        position: usize,
    },
}

impl TemplateError {
    /// Name of the offending placeholder, when there is one.
    pub fn variable(&self) -> Option<&str> {
        match self {
            TemplateError::UndefinedVariable { name, .. } => Some(name),
            TemplateError::InvalidVariableName { name, .. } => Some(name),
            TemplateError::UnmatchedBrace { .. } => None,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { name, position } => {
                write!(
                    f,
                    "undefined variable '{}' at position {} in template",
                    name, position
                )
            }
            TemplateError::UnmatchedBrace { position } => {
                write!(f, "unmatched '${{' at position {} in template", position)
            }
            TemplateError::InvalidVariableName { name, position } => {
                write!(
                    f,
                    "invalid variable name '{}' at position {} in template",
                    name, position
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Variable { name: &'a str, position: usize },
}

/// Lazy left-to-right tokenizer, so the first problem in the text is the
/// one reported.
struct Tokens<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let start = self.pos;
        let Some(offset) = rest.find('$') else {
            self.pos = self.src.len();
            return Some(Ok(Token::Text(rest)));
        };

        if offset > 0 {
            self.pos += offset;
            return Some(Ok(Token::Text(&rest[..offset])));
        }

        let after = &rest[1..];
        match after.chars().next() {
            Some('$') => {
                self.pos += 2;
                Some(Ok(Token::Text("$")))
            }
            Some('{') => {
                let body = &after[1..];
                match body.find('}') {
                    None => {
                        self.pos = self.src.len();
                        Some(Err(TemplateError::UnmatchedBrace { position: start }))
                    }
                    Some(end) => {
                        let name = &body[..end];
                        self.pos += 2 + end + 1;
                        if is_identifier(name) {
                            Some(Ok(Token::Variable {
                                name,
                                position: start,
                            }))
                        } else {
                            Some(Err(TemplateError::InvalidVariableName {
                                name: name.to_string(),
                                position: start,
                            }))
                        }
                    }
                }
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                self.pos += 1 + len;
                Some(Ok(Token::Variable {
                    name: &after[..len],
                    position: start,
                }))
            }
            // Lone `$` (shell `$1`, `$ `, trailing `$`) is plain text
            _ => {
                self.pos += 1;
                Some(Ok(Token::Text("$")))
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Render a template string by substituting bound variables.
///
/// # Examples
///
/// ```
/// use pipewright::template::{render_template, vars};
///
/// let bindings = vars([("h", "10.0.0.1"), ("u", "admin")]);
/// let rendered = render_template("hosts=$h\nuser=$u", &bindings).unwrap();
/// assert_eq!(rendered, "hosts=10.0.0.1\nuser=admin");
/// ```
pub fn render_template(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());

    for token in Tokens::new(template) {
        match token? {
            Token::Text(text) => result.push_str(text),
            Token::Variable { name, position } => match bindings.get(name) {
                Some(value) => result.push_str(value),
                None => {
                    return Err(TemplateError::UndefinedVariable {
                        name: name.to_string(),
                        position,
                    });
                }
            },
        }
    }

    Ok(result)
}

/// List the placeholder names a template references, in first-appearance
/// order and without duplicates.
pub fn placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut names: Vec<String> = Vec::new();

    for token in Tokens::new(template) {
        if let Token::Variable { name, .. } = token?
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Helper to create a bindings map from a list of key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> Bindings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_scenario() {
        let bindings = vars([("h", "10.0.0.1"), ("u", "admin")]);
        let result = render_template("hosts=$h\nuser=$u", &bindings).unwrap();
        assert_eq!(result, "hosts=10.0.0.1\nuser=admin");
    }

    #[test]
    fn test_missing_scenario() {
        let err = render_template("$missing", &Bindings::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "missing".to_string(),
                position: 0,
            }
        );
        assert_eq!(err.variable(), Some("missing"));
    }

    #[test]
    fn test_first_missing_variable_is_reported() {
        let bindings = vars([("b", "B")]);
        let err = render_template("$b $first and $second", &bindings).unwrap_err();
        match err {
            TemplateError::UndefinedVariable { name, position } => {
                assert_eq!(name, "first");
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error type: {:?}", other),
        }
    }

    #[test]
    fn test_missing_variable_reported_before_later_syntax_error() {
        let err = render_template("$nope ${", &Bindings::new()).unwrap_err();
        assert_eq!(err.variable(), Some("nope"));
    }

    #[test]
    fn test_extra_bindings_are_ignored() {
        let bindings = vars([("used", "yes"), ("unused", "no")]);
        let result = render_template("value=$used", &bindings).unwrap();
        assert_eq!(result, "value=yes");
    }

    #[test]
    fn test_no_bound_tokens_remain() {
        let bindings = vars([("image", "app"), ("tag", "1.2"), ("port", "8080")]);
        let template = "FROM $image:$tag\nEXPOSE $port\nLABEL image=${image}_build";
        let result = render_template(template, &bindings).unwrap();
        for key in bindings.keys() {
            assert!(!result.contains(&format!("${}", key)));
        }
        assert_eq!(result, "FROM app:1.2\nEXPOSE 8080\nLABEL image=app_build");
    }

    #[test]
    fn test_braced_form() {
        let bindings = vars([("name", "agent")]);
        let result = render_template("${name}_v2", &bindings).unwrap();
        assert_eq!(result, "agent_v2");
    }

    #[test]
    fn test_unbraced_name_is_greedy() {
        let bindings = vars([("name", "agent")]);
        let err = render_template("$name_v2", &bindings).unwrap_err();
        assert_eq!(err.variable(), Some("name_v2"));
    }

    #[test]
    fn test_double_dollar_escape() {
        let result = render_template("echo $$HOME costs $$5", &Bindings::new()).unwrap();
        assert_eq!(result, "echo $HOME costs $5");
    }

    #[test]
    fn test_lone_dollar_passes_through() {
        let result = render_template("price: $ 5, arg $1, end $", &Bindings::new()).unwrap();
        assert_eq!(result, "price: $ 5, arg $1, end $");
    }

    #[test]
    fn test_unmatched_brace_error() {
        let err = render_template("Hello ${name", &Bindings::new()).unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedBrace { position: 6 });
    }

    #[test]
    fn test_invalid_braced_name_error() {
        let err = render_template("a ${} b", &Bindings::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidVariableName {
                name: String::new(),
                position: 2,
            }
        );

        let err = render_template("${not valid}", &Bindings::new()).unwrap_err();
        assert_eq!(err.variable(), Some("not valid"));
    }

    #[test]
    fn test_empty_value_is_substituted() {
        let bindings = vars([("empty", "")]);
        let result = render_template("before${empty}after", &bindings).unwrap();
        assert_eq!(result, "beforeafter");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let bindings = vars([("a", "$b"), ("b", "never")]);
        let result = render_template("$a", &bindings).unwrap();
        assert_eq!(result, "$b");
    }

    #[test]
    fn test_unicode_text_around_placeholders() {
        let bindings = vars([("who", "日本語")]);
        let result = render_template("🎉 $who 🎉", &bindings).unwrap();
        assert_eq!(result, "🎉 日本語 🎉");
    }

    #[test]
    fn test_placeholders_in_order_without_duplicates() {
        let names = placeholders("$b ${a} $b $$c $_d").unwrap();
        assert_eq!(names, vec!["b", "a", "_d"]);
    }

    #[test]
    fn test_placeholders_propagates_syntax_errors() {
        assert!(placeholders("${oops").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::UndefinedVariable {
            name: "foo".to_string(),
            position: 10,
        };
        assert_eq!(
            err.to_string(),
            "undefined variable 'foo' at position 10 in template"
        );

        let err = TemplateError::UnmatchedBrace { position: 5 };
        assert_eq!(err.to_string(), "unmatched '${' at position 5 in template");
    }
}
