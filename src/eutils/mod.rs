//! NCBI E-utilities access: search, summary, cross-reference and document fetches.

pub mod client;
pub mod types;
mod xml;

pub use client::{EutilsClient, EutilsError, LiteratureSource, SearchRequest};
