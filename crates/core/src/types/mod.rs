//! Domain types shared across Lubro components.

mod cart;
mod id;
mod order;
mod product;
mod status;

pub use cart::{Cart, CartItem};
pub use id::{CartId, ImageId, OrderId, ProductId, UserId};
pub use order::{
    BusinessInfo, ContactInfo, Order, OrderItem, OrderUpdate, OrderValidationError,
};
pub use product::Product;
pub use status::{CustomerType, OrderStatus};
