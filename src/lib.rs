//! # Docdex
//!
//! A documentation ingestion pipeline for vector search.
//!
//! Docdex walks a documentation tree, extracts plain text from markup
//! sources and structured element-metadata files, splits the text into
//! bounded overlapping chunks, embeds each chunk, and upserts the
//! resulting records into a namespaced vector index.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐   ┌─────────┐   ┌──────────┐   ┌───────┐   ┌─────────┐
//! │ Walker │──▶│ Extract │──▶│ Splitter │──▶│ Embed │──▶│  Index  │
//! │  tree  │   │ adoc/js │   │ chunks   │   │ API   │   │ vectors │
//! └────────┘   └─────────┘   └──────────┘   └───────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ddx init                      # create the vector index
//! ddx ingest                    # walk, chunk, embed, upsert
//! ddx ingest --dry-run          # count files and chunks only
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`walker`] | Tree traversal and eligibility filtering |
//! | [`namespace`] | Table-driven namespace resolution |
//! | [`render`] | External markup renderer |
//! | [`html`] | HTML to plain-text conversion |
//! | [`extract`] | Format-specific text extraction |
//! | [`splitter`] | Recursive overlapping text splitting |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Vector index abstraction |
//! | [`ingest`] | Pipeline orchestration |

pub mod config;
pub mod embedding;
pub mod extract;
pub mod html;
pub mod index;
pub mod ingest;
pub mod models;
pub mod namespace;
pub mod render;
pub mod splitter;
pub mod walker;
