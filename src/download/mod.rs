//! PDF download flow pieces: file naming and streamed writes.
//!
//! # Example
//!
//! ```no_run
//! use crawler_core::download::PdfDownloader;
//! use crawler_core::http::HttpClient;
//! use crawler_core::model::DownloadTarget;
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = PdfDownloader::new(HttpClient::new(), 1024);
//! let target = DownloadTarget::new(
//!     Url::parse("https://www.biorxiv.org/content/10.1101/2024.06.12.598720v3.full.pdf")?,
//!     "Studying time-resolved functional connectivity",
//! );
//! let path = downloader.download(&target, "Mozilla/5.0", Path::new("./pdfs")).await?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

mod filename;
mod pdf;

pub use filename::{MAX_TITLE_CHARS, output_path, pdf_filename};
pub use pdf::PdfDownloader;
