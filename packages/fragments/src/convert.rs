//! Content negotiation: rendering a fragment's bytes as another supported type.

use pulldown_cmark::{Parser, html};
use storage::FragmentStore;
use tracing::{debug, instrument};

use crate::error::FragmentError;
use crate::formats::{self, Rendering};
use crate::fragment::Fragment;

/// Outcome of a conversion request.
///
/// `Unsupported` is an expected answer, not a failure: the fragment simply
/// cannot be rendered as the requested type. An empty payload is
/// `Converted(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Converted(Vec<u8>),
    Unsupported,
}

impl Conversion {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Converted(data) => Some(data),
            Self::Unsupported => None,
        }
    }
}

/// Render CommonMark source as HTML. Invalid UTF-8 is replaced, not rejected.
pub(crate) fn markdown_to_html(source: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(source);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(&text));
    out.into_bytes()
}

impl Fragment {
    /// The rendering that produces `desired_type` from this fragment, if any.
    pub fn rendering_for(&self, desired_type: &str) -> Option<Rendering> {
        let desired = formats::essence(desired_type)?;
        formats::renderings(self.mime_type())
            .iter()
            .find(|rendering| rendering.mime == desired)
            .copied()
    }

    /// Read the fragment's data rendered as `desired_type`.
    ///
    /// Types outside [`Fragment::formats`] yield [`Conversion::Unsupported`]
    /// without touching the store.
    #[instrument(skip_all, fields(id = %self.id(), from = %self.mime_type(), to = %desired_type))]
    pub async fn convert_data(
        &self,
        store: &dyn FragmentStore,
        desired_type: &str,
    ) -> Result<Conversion, FragmentError> {
        let Some(rendering) = self.rendering_for(desired_type) else {
            debug!("Conversion not supported");
            return Ok(Conversion::Unsupported);
        };

        let data = self.get_data(store).await?;
        match rendering.transform {
            Some(transform) => {
                debug!(input_len = data.len(), "Transforming fragment data");
                Ok(Conversion::Converted(transform(&data)))
            }
            None => Ok(Conversion::Converted(data)),
        }
    }

    /// Read the fragment's data as stored, or converted when a type is requested.
    pub async fn render(
        &self,
        store: &dyn FragmentStore,
        desired_type: Option<&str>,
    ) -> Result<Conversion, FragmentError> {
        match desired_type {
            None => Ok(Conversion::Converted(self.get_data(store).await?)),
            Some(desired_type) => self.convert_data(store, desired_type).await,
        }
    }
}

/// A fragment reference of the form `id` or `id.ext`.
///
/// The extension, when present, names the type the caller wants the fragment
/// rendered as (`abc.html` -> `text/html`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRequest {
    pub id: String,
    pub extension: Option<String>,
    pub desired_type: Option<String>,
}

impl FragmentRequest {
    pub fn parse(raw: &str) -> Result<Self, FragmentError> {
        let Some((id, extension)) = raw.rsplit_once('.').filter(|(id, _)| !id.is_empty()) else {
            return Ok(Self {
                id: raw.to_string(),
                extension: None,
                desired_type: None,
            });
        };

        let extension = extension.to_ascii_lowercase();
        let mime = mime_guess::from_ext(&extension)
            .first()
            .ok_or_else(|| FragmentError::UnknownExtension(extension.clone()))?;

        Ok(Self {
            id: id.to_string(),
            extension: Some(extension),
            desired_type: Some(mime.essence_str().to_string()),
        })
    }

    /// The `Content-Type` a response to this request carries for `fragment`.
    pub fn response_type<'a>(&'a self, fragment: &'a Fragment) -> &'a str {
        self.desired_type
            .as_deref()
            .unwrap_or_else(|| fragment.content_type())
    }
}
