pub mod lattice;

mod const_value;
mod propagation;
mod render;
mod toy;

pub use const_value::ConstValue;
pub use propagation::{ConstData, ConstPropagation};
pub use render::render_blocks;
pub use toy::Toy;
