pub mod app_config;
pub mod memory;
pub mod overrides;
pub mod price_book;
pub mod seed;

pub use memory::{MemoryOrderRepository, MemoryQuoteRepository};
pub use overrides::MemoryOverrideStore;
pub use price_book::PriceBook;
