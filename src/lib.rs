//! # Discmaster Proxy
//!
//! A query-aggregation proxy for the discmaster.textfiles.com vintage-file
//! archive.
//!
//! The upstream archive exposes a paginated search endpoint that returns
//! at most one page at a time, reports no total match count in its JSON
//! output, and lists every copy of a file separately. This crate fronts
//! that endpoint: it drains result pages sequentially, collapses records
//! that share a content hash into aggregate groups, recovers the total
//! count from the HTML rendering of the same query, and attaches locally
//! curated descriptions to hashes it knows about.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌─────────────────┐    ┌─────────────┐
//! │  Client  │───▶│     GET /       │───▶│  upstream   │
//! │ (UI/CLI) │    │ single | grouped │    │  /search    │
//! └──────────┘    └───────┬─────────┘    └─────────────┘
//!                         │
//!            ┌────────────┼────────────┐
//!            ▼            ▼            ▼
//!      ┌──────────┐ ┌──────────┐ ┌──────────┐
//!      │ paginate │ │ group by │ │  count   │
//!      │  (JSON)  │ │   hash   │ │  (HTML)  │
//!      └──────────┘ └──────────┘ └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dmproxy serve                       # start the HTTP proxy
//! dmproxy search "wolf3d" --grouped   # grouped query from the CLI
//! dmproxy describe <hash>             # look up a catalog description
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire-shape data types |
//! | [`catalog`] | Local hash-description catalog |
//! | [`normalize`] | Per-record link and label enrichment |
//! | [`group`] | Hash grouping and sort ordering |
//! | [`count`] | Total-count extraction from HTML |
//! | [`upstream`] | Upstream client and page fetching |
//! | [`server`] | HTTP front end |

pub mod catalog;
pub mod config;
pub mod count;
pub mod describe_cmd;
pub mod group;
pub mod models;
pub mod normalize;
pub mod search_cmd;
pub mod server;
pub mod upstream;
