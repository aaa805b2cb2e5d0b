//! Closed templates for application labels, variants, and identifiers.
//!
//! Configuration documents describe display strings such as `"Maya {version}"`
//! or identifiers such as `"maya_{variant}"`. Rather than exposing a general
//! string formatting engine, a [`Template`] recognises exactly two named
//! placeholders, `{version}` and `{variant}`, and rejects everything else when
//! parsed. Literal braces are written doubled (`{{` and `}}`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Named placeholder recognised inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Replaced by the resolved application version.
    Version,
    /// Replaced by the rendered variant string.
    Variant,
}

impl Placeholder {
    /// Returns the placeholder name as written between braces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Variant => "variant",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "version" => Some(Self::Version),
            "variant" => Some(Self::Variant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Errors raised while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template referenced a placeholder outside the closed set.
    #[error("unknown placeholder '{{{name}}}' in template '{template}'")]
    UnknownPlaceholder {
        /// Placeholder name found between braces.
        name: String,
        /// Full template source.
        template: String,
    },

    /// An opening or closing brace was not balanced.
    #[error("unbalanced brace in template '{template}'")]
    UnbalancedBrace {
        /// Full template source.
        template: String,
    },

    /// A placeholder was used without a value being supplied.
    #[error("no value supplied for placeholder '{{{placeholder}}}'")]
    MissingValue {
        /// Name of the placeholder lacking a value.
        placeholder: &'static str,
    },
}

/// Values substituted into a template when rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateValues<'a> {
    version: Option<&'a str>,
    variant: Option<&'a str>,
}

impl<'a> TemplateValues<'a> {
    /// Creates a value set carrying the version only.
    #[must_use]
    pub const fn version(version: &'a str) -> Self {
        Self {
            version: Some(version),
            variant: None,
        }
    }

    /// Adds the rendered variant.
    #[must_use]
    pub const fn with_variant(mut self, variant: &'a str) -> Self {
        self.variant = Some(variant);
        self
    }

    const fn get(&self, placeholder: Placeholder) -> Option<&'a str> {
        match placeholder {
            Placeholder::Version => self.version,
            Placeholder::Variant => self.variant,
        }
    }
}

/// A parsed template with literal text and named placeholders.
///
/// # Example
///
/// ```
/// use applauncher_discovery::{Template, TemplateValues};
///
/// let template = Template::parse("Nuke {version}").expect("valid template");
/// let rendered = template.render(TemplateValues::version("13.2v4")).expect("renders");
/// assert_eq!(rendered, "Nuke 13.2v4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source` into a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownPlaceholder`] when a placeholder other
    /// than `{version}` or `{variant}` is used, and
    /// [`TemplateError::UnbalancedBrace`] when braces do not pair up.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(current) = chars.next() {
            match current {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace {
                            template: source.to_owned(),
                        });
                    }
                    let placeholder = Placeholder::parse(name.trim()).ok_or_else(|| {
                        TemplateError::UnknownPlaceholder {
                            name: name.clone(),
                            template: source.to_owned(),
                        }
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' => {
                    return Err(TemplateError::UnbalancedBrace {
                        template: source.to_owned(),
                    });
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    /// Creates a template that renders `text` verbatim.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Literal(text.clone())]
        };
        Self {
            source: text.replace('{', "{{").replace('}', "}}"),
            segments,
        }
    }

    /// Returns the template source text.
    #[must_use]
    pub const fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Returns `true` when the template references `placeholder`.
    #[must_use]
    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Placeholder(placeholder))
    }

    /// Substitutes `values` into the template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingValue`] when the template references a
    /// placeholder for which `values` carries nothing.
    pub fn render(&self, values: TemplateValues<'_>) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let value = values.get(*placeholder).ok_or(TemplateError::MissingValue {
                        placeholder: placeholder.as_str(),
                    })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::literal("")
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
