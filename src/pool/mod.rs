//! Puzzle Lend pool state: types, yield model and per-cycle stats fetching

pub mod apy;
pub mod fetcher;
pub mod types;

pub use fetcher::PoolStateFetcher;
pub use types::{ PoolTokenSetup, PoolTokenStats, PriceRange, Token };
