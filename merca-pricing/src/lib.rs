pub mod engine;
pub mod models;
pub mod resolver;

pub use engine::{DiscountPolicy, PriceInput, PricingConfig, PricingEngine, PricingError};
pub use models::{
    round_cents, BreakdownKind, ClearanceRules, GlobalVolumeBreak, OrderType, PriceBreakdownItem,
    PriceCalculation, PriceList, PriceListAssignment, PriceRule, PricingTier, VolumeBreak,
};
pub use resolver::resolve_price_list;
