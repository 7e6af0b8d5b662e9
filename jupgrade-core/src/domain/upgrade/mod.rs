//! Upgrade plan, result and history models

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
