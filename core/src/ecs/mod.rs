pub mod entity;
pub mod registry;

pub use entity::{EntityId, Identity};
pub use registry::{EntityRegistry, EntityView};
