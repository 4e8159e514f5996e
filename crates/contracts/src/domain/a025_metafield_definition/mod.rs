pub mod aggregate;

pub use aggregate::{
    MetafieldDefinition, MetafieldDefinitionDto, MetafieldDefinitionId, MetafieldDefinitionPatch,
};
