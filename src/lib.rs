//! squarepack — batch image normalizer with a byte budget.
//!
//! Takes a directory of mixed-format images and produces uniform JPEGs:
//! every output has exactly the configured dimensions (scale to cover, then
//! center crop), transparency flattened over white, and the highest JPEG
//! quality whose encoded size fits a configurable byte budget.
//!
//! # Pipeline
//!
//! ```text
//! scan      Walk the source tree, list candidate images with header info
//! process   decode → flatten → cover resize → crop → budget-search encode
//! ```
//!
//! # Module Map
//!
//! | Module | Responsibility |
//! |---|---|
//! | [`scan`] | Source discovery, manifest |
//! | [`imaging`] | Pure pixel work: normalize + budget-constrained encode |
//! | [`process`] | Parallel batch orchestration, failure isolation |
//! | [`cache`] | Content-addressed skip of unchanged sources |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI line formatting |

pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod scan;
