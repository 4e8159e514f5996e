pub mod a025_metafield_definition;
pub mod a026_metafield_value;
pub mod common;
