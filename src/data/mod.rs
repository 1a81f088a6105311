pub mod fetcher;
pub mod news;

pub use fetcher::{FetchReport, MarketDataFetcher, QuoteRequest};
pub use news::{NewsAggregator, NewsFeed};

#[cfg(test)]
mod fetcher_tests;
