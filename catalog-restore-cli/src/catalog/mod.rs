//! Live catalog retrieval

pub mod fetcher;

pub use fetcher::fetch_catalog;
