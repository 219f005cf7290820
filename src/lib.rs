/// civic-search - query-resilience layer for civic search
///
/// Corrects and expands free-text queries, routes them through an ordered
/// chain of search engines with cooldown-based failover, caches responses
/// and aggregates facets over the full match set.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
