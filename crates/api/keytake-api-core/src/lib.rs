//! keytake-api-core: value contract between the animation core and whatever
//! owns the live properties (scene graph, ECS, editor).

pub mod blend;
pub mod locator;
pub mod matrix;
pub mod value;

pub use locator::Locator;
pub use value::{Value, ValueKind};
