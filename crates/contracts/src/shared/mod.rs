pub mod metafields;
