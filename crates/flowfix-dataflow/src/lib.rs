mod argument;
mod capture;
mod config;
mod context;
mod data;
mod domain;
mod driver;
mod entity;
mod error;
mod escape;
mod index;
mod predicate;
mod result;
mod structural;
mod visitor;
mod widening;

pub use argument::ArgumentInfo;
pub use capture::InterproceduralCaptureId;
pub use config::{InterproceduralAnalysisConfiguration, InterproceduralAnalysisKind};
pub use context::{AnalysisContext, CallFrame};
pub use data::{AnalysisData, DataGuard, MapAnalysisData};
pub use domain::ValueDomain;
pub use driver::{DataFlowAnalysis, FlowContext, SummaryCache, SummaryEntry};
pub use entity::{AbstractLocation, AnalysisEntity, EntityRoot};
pub use error::DataflowError;
pub use escape::LambdaAndLocalFunctionAnalysisInfo;
pub use index::AbstractIndex;
pub use predicate::PredicateValueKind;
pub use result::{AnalysisResult, BlockAnalysisResult, DataFlowAnalysisResult};
pub use structural::{HashKey, HashKeyBuilder};
pub use visitor::{CallSite, CallTarget, Effect, InterproceduralCall, OperationVisitor};
pub use widening::WideningStrategy;

pub use flowfix_ir::{Callable, HasBottom, HasTop, Lattice};
