pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;

pub use lifecycle::{check_transition, QuoteError, TransitionPolicy};
pub use models::{
    Quote, QuoteEvent, QuoteEventType, QuoteItem, QuotePricing, QuoteStatus, QuoteTerms,
    QuoteVersion,
};
pub use repository::QuoteRepository;
pub use service::{QuoteLine, QuoteService};
