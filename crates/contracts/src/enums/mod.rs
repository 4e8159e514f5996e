pub mod owner_type;
pub mod value_type;

pub use owner_type::MetafieldOwnerType;
pub use value_type::MetafieldValueType;
