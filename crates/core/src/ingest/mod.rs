//! Document ingestion.
//!
//! Turns uploaded files into the single document text consumed by step 1.
//! Plain-text files are read as UTF-8. PDFs go through a [`PdfDocument`]
//! either by their embedded text layer or by transcribing rendered pages with
//! a vision model through the completion gateway.

use crate::gateway::{CompletionGateway, GatewayError, PageImage};
use ap_protocol::agent_models::ResolvedProvider;
use ap_protocol::config_models::{ApiKeys, OcrSettings};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Joins the text of consecutive PDF pages.
pub const PAGE_SEPARATOR: &str = "\n\n---\nPage Separator\n---\n\n";

/// Joins the text of consecutive input files.
pub const FILE_SEPARATOR: &str = "\n\n---\nFile Separator\n---\n\n";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Ingestion stopped at a failing source.
///
/// `partial` holds the text of the sources that were extracted before it,
/// already joined with [`FILE_SEPARATOR`].
#[derive(Error, Debug)]
#[error("{source}")]
pub struct IngestFailure {
    pub partial: String,
    pub source: IngestError,
}

/// A parsed PDF. Pages are addressed by 0-based index.
pub trait PdfDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Text layer of one page.
    fn page_text(&self, index: usize) -> Result<String, IngestError>;

    /// Render one page to an image suitable for a vision model.
    fn render_page(&self, index: usize) -> Result<PageImage, IngestError>;
}

/// How PDF sources are turned into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfMethod {
    /// Read the embedded text layer.
    Standard,
    /// Transcribe rendered pages with a vision model.
    Vision { provider: ResolvedProvider, model: String },
}

impl PdfMethod {
    /// Vision transcription with the configured OCR provider and its model.
    pub fn vision(settings: &OcrSettings) -> Self {
        Self::Vision {
            provider: settings.provider,
            model: settings.model_for(settings.provider).to_string(),
        }
    }
}

pub enum DocumentSource {
    PlainText(PathBuf),
    Pdf {
        name: String,
        document: Box<dyn PdfDocument>,
    },
}

impl DocumentSource {
    pub fn name(&self) -> String {
        match self {
            Self::PlainText(path) => path.display().to_string(),
            Self::Pdf { name, .. } => name.clone(),
        }
    }
}

pub struct IngestOptions<'a> {
    pub pdf_method: PdfMethod,
    pub gateway: &'a CompletionGateway,
    pub api_keys: &'a ApiKeys,
}

pub async fn extract_plain_text(path: &Path) -> Result<String, IngestError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Text layer of every page joined with [`PAGE_SEPARATOR`].
pub fn extract_pdf_text(document: &dyn PdfDocument) -> Result<String, IngestError> {
    let pages = (0..document.page_count())
        .map(|index| document.page_text(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pages.join(PAGE_SEPARATOR))
}

/// Transcribe every page with a vision model.
///
/// The credential is checked before any page is rendered. `on_progress`
/// receives `(pages_done / total, message)` after each page, then
/// `(1.0, "Processing complete.")`. On failure it receives
/// `(1.0, "Error during OCR: ...")` and the error is returned.
pub async fn extract_pdf_via_vision(
    document: &dyn PdfDocument,
    gateway: &CompletionGateway,
    provider: ResolvedProvider,
    model: &str,
    keys: &ApiKeys,
    mut on_progress: impl FnMut(f64, &str),
) -> Result<String, IngestError> {
    if !keys.has(provider) {
        return Err(GatewayError::AuthMissing(provider).into());
    }

    match transcribe_pages(document, gateway, provider, model, keys, &mut on_progress).await {
        Ok(pages) => {
            on_progress(1.0, "Processing complete.");
            Ok(pages.join(PAGE_SEPARATOR))
        }
        Err(error) => {
            tracing::warn!(error = %error, "vision transcription failed");
            on_progress(1.0, &format!("Error during OCR: {error}"));
            Err(error)
        }
    }
}

async fn transcribe_pages(
    document: &dyn PdfDocument,
    gateway: &CompletionGateway,
    provider: ResolvedProvider,
    model: &str,
    keys: &ApiKeys,
    on_progress: &mut impl FnMut(f64, &str),
) -> Result<Vec<String>, IngestError> {
    let total = document.page_count();
    let mut pages = Vec::with_capacity(total);

    for index in 0..total {
        let image = document.render_page(index)?;
        let text = gateway.transcribe_page(provider, model, keys, &image).await?;
        pages.push(text);

        let done = index + 1;
        on_progress(done as f64 / total as f64, &format!("Processing page {done} of {total}..."));
    }

    Ok(pages)
}

/// Extract every source in order and join them with [`FILE_SEPARATOR`].
pub async fn ingest(
    sources: Vec<DocumentSource>,
    options: IngestOptions<'_>,
    mut on_progress: impl FnMut(f64, &str),
) -> Result<String, IngestFailure> {
    let mut chunks: Vec<String> = Vec::with_capacity(sources.len());

    for source in sources {
        let name = source.name();
        on_progress(0.0, &format!("Parsing {name}..."));

        let extracted = match &source {
            DocumentSource::PlainText(path) => extract_plain_text(path).await,
            DocumentSource::Pdf { document, .. } => match &options.pdf_method {
                PdfMethod::Standard => extract_pdf_text(document.as_ref()),
                PdfMethod::Vision { provider, model } => {
                    extract_pdf_via_vision(
                        document.as_ref(),
                        options.gateway,
                        *provider,
                        model,
                        options.api_keys,
                        &mut on_progress,
                    )
                    .await
                }
            },
        };

        match extracted {
            Ok(text) => {
                tracing::debug!(source = %name, chars = text.len(), "source extracted");
                on_progress(1.0, &format!("Parsed {name}."));
                chunks.push(text);
            }
            Err(source) => {
                return Err(IngestFailure {
                    partial: chunks.join(FILE_SEPARATOR),
                    source,
                })
            }
        }
    }

    Ok(chunks.join(FILE_SEPARATOR))
}
