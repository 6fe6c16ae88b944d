use flowfix_dataflow::CallSite;
use flowfix_ir::{CaptureId, Operation, Symbol};

/// A tiny statement language for exercising the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Toy {
    Const(i64),
    /// Read a parameter or local.
    Load(Symbol),
    /// Assign the value of an operation to a local.
    Store(Symbol, Operation),
    Add(Operation, Operation),
    /// Integer comparison; `1` when equal, `0` otherwise.
    Eq(Operation, Operation),
    Not(Operation),
    /// Capture the value of an operation in a flow capture.
    Capture(CaptureId, Operation),
    CaptureRef(CaptureId),
    /// Create an anonymous function identified by this operation.
    Lambda,
    /// Take a reference to a local function.
    LocalFunctionRef(Symbol),
    /// Hand a lambda or local function reference to code the analysis cannot
    /// see.
    Escape(Operation),
    Call(CallSite),
    /// Start an asynchronous task producing the value of an operation.
    Task(Operation),
    /// Await a task started by a `Task` operation.
    Await(Operation),
}
