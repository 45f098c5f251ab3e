//! The supported-type matrix.
//!
//! [`SUPPORTED_TYPES`] is the only place that knows which types a fragment may
//! have and what each can be rendered as. Construction, `formats` and conversion
//! all read from it.

use mime_guess::mime::Mime;

use crate::convert::markdown_to_html;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_MARKDOWN: &str = "text/markdown";
pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";

/// Byte transformation applied when rendering into a different type.
pub type Transform = fn(&[u8]) -> Vec<u8>;

/// One output type a stored type can be rendered as.
#[derive(Debug, Clone, Copy)]
pub struct Rendering {
    pub mime: &'static str,
    /// `None` means the stored bytes are returned unmodified.
    pub transform: Option<Transform>,
}

impl Rendering {
    const fn identity(mime: &'static str) -> Self {
        Self {
            mime,
            transform: None,
        }
    }

    const fn with(mime: &'static str, transform: Transform) -> Self {
        Self {
            mime,
            transform: Some(transform),
        }
    }
}

struct TypeEntry {
    mime: &'static str,
    /// Ordered by preference.
    renderings: &'static [Rendering],
}

static SUPPORTED_TYPES: &[TypeEntry] = &[
    TypeEntry {
        mime: TEXT_PLAIN,
        renderings: &[Rendering::identity(TEXT_PLAIN)],
    },
    TypeEntry {
        mime: TEXT_MARKDOWN,
        renderings: &[
            Rendering::identity(TEXT_MARKDOWN),
            Rendering::with(TEXT_HTML, markdown_to_html),
            Rendering::identity(TEXT_PLAIN),
        ],
    },
    TypeEntry {
        mime: TEXT_HTML,
        renderings: &[Rendering::identity(TEXT_HTML), Rendering::identity(TEXT_PLAIN)],
    },
    TypeEntry {
        mime: APPLICATION_JSON,
        renderings: &[
            Rendering::identity(APPLICATION_JSON),
            Rendering::identity(TEXT_PLAIN),
        ],
    },
];

/// Parse a `Content-Type` value and return its lowercase `type/subtype` essence,
/// dropping parameters such as `charset`.
pub fn essence(content_type: &str) -> Option<String> {
    content_type
        .trim()
        .parse::<Mime>()
        .ok()
        .map(|mime| mime.essence_str().to_string())
}

fn entry(mime: &str) -> Option<&'static TypeEntry> {
    SUPPORTED_TYPES.iter().find(|entry| entry.mime == mime)
}

/// Returns true if `content_type` (with or without parameters) is a supported
/// fragment type.
pub fn is_supported_type(content_type: &str) -> bool {
    essence(content_type).is_some_and(|mime| entry(&mime).is_some())
}

/// The renderings available for a stored type essence, in preference order.
/// Empty for unsupported types.
pub fn renderings(mime: &str) -> &'static [Rendering] {
    entry(mime).map(|entry| entry.renderings).unwrap_or(&[])
}

/// Every supported stored type.
pub fn supported_types() -> impl Iterator<Item = &'static str> {
    SUPPORTED_TYPES.iter().map(|entry| entry.mime)
}
