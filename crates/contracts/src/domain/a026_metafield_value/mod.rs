pub mod aggregate;

pub use aggregate::{MetafieldValue, MetafieldValueView, SetMetafieldValueRequest};
