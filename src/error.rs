use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Top-level error returned by every decode and encode entry point.
///
/// `Parse` is the general parse-error sentinel: any failure to turn bytes into
/// a [`VirtualMachineSpec`](crate::model::VirtualMachineSpec) ends up under it,
/// whichever format produced it.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("write error: {0}")]
    #[diagnostic(
        code(vmspec::write),
        help("The underlying writer rejected the encoded document.")
    )]
    Write(#[from] std::io::Error),
}

impl Error {
    /// True for any decode failure, regardless of format.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// True only for failures raised by the markup (XML) adapter.
    pub fn is_xml_parse_error(&self) -> bool {
        matches!(self, Error::Parse(ParseError::Xml(_)))
    }

    /// Returns the unsupported selector if that is what caused the failure.
    pub fn unsupported_selector(&self) -> Option<&UnsupportedSelector> {
        match self {
            Error::Parse(ParseError::Xml(XmlParseError::UnsupportedSelector(err))) => Some(err),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("parse error: json: {0}")]
    #[diagnostic(code(vmspec::parse::json))]
    Json(#[source] serde_json::Error),

    #[error("parse error: yaml: {0}")]
    #[diagnostic(code(vmspec::parse::yaml))]
    Yaml(#[source] serde_yaml::Error),

    /// Markup-specific sentinel; every markup decode failure is wrapped here.
    #[error("parse error: xml: {0}")]
    #[diagnostic(transparent)]
    Xml(#[from] XmlParseError),

    #[error("parse error: read failed: {0}")]
    #[diagnostic(code(vmspec::parse::read))]
    Read(#[source] std::io::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum XmlParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnsupportedSelector(#[from] UnsupportedSelector),

    #[error("unknown element <{element}> in <{parent}>")]
    #[diagnostic(
        code(vmspec::xml::unknown_element),
        help("Unrecognized elements are rejected rather than ignored.")
    )]
    UnknownElement { parent: String, element: String },

    #[error("unknown attribute {attribute:?} on <{element}>")]
    #[diagnostic(
        code(vmspec::xml::unknown_attribute),
        help("Unrecognized attributes are rejected rather than ignored.")
    )]
    UnknownAttribute { element: String, attribute: String },

    #[error("unexpected text in <{element}>")]
    #[diagnostic(
        code(vmspec::xml::unexpected_text),
        help("This element only holds child elements.")
    )]
    UnexpectedText { element: String },

    #[error("invalid value {value:?} in <{element}>, expected {expected}")]
    #[diagnostic(code(vmspec::xml::invalid_value))]
    InvalidValue {
        element: String,
        value: String,
        expected: String,
    },

    #[error("unexpected end of input")]
    #[diagnostic(
        code(vmspec::xml::unexpected_eof),
        help("The document ended before its root element was closed.")
    )]
    UnexpectedEof,

    #[error("input is not valid UTF-8")]
    #[diagnostic(code(vmspec::xml::encoding))]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed markup at line {line}, column {column}: {source}")]
    #[diagnostic(code(vmspec::xml::syntax))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("failed here")]
        span: SourceSpan,
        line: usize,
        column: usize,
        #[source]
        source: quick_xml::Error,
    },
}

/// A selector marker that names none of an entity's known selectors.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("{kind} by=\"{by}\" is not supported")]
#[diagnostic(
    code(vmspec::unsupported_selector),
    help("The `by` attribute must name one of the entity's identifying fields.")
)]
pub struct UnsupportedSelector {
    pub kind: &'static str,
    pub by: String,
}
