pub mod models;
pub mod repository;

pub use models::{Order, OrderItem, OrderStatus};
pub use repository::OrderRepository;
