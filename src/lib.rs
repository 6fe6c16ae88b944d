pub use flowfix_dataflow as dataflow;
pub use flowfix_ir as ir;

pub mod prelude {
    pub use flowfix_dataflow::*;
    pub use flowfix_ir::*;
}
