use flowfix_dataflow::{
    AnalysisEntity, AbstractLocation, CallSite, CallTarget, DataflowError, Effect, FlowContext,
    InterproceduralCall, MapAnalysisData, OperationVisitor, PredicateValueKind,
};
use flowfix_ir::{Callable, Operation};

use crate::const_value::ConstValue;
use crate::toy::Toy;

pub type ConstData = MapAnalysisData<AnalysisEntity, ConstValue>;

type Flow<'f, 'ir> = FlowContext<'f, 'ir, Toy, ConstValue, ConstData>;

/// Constant propagation over [`Toy`] programs.
#[derive(Debug, Default)]
pub struct ConstPropagation {
    /// Number of operations visited, across all graphs.
    pub visited: usize,
}

impl ConstPropagation {
    pub fn new() -> Self {
        Self::default()
    }

    fn callable_of(ctx: &Flow<'_, '_>, operation: Operation) -> Option<Callable> {
        match ctx.payload(operation)? {
            Toy::Lambda => Some(Callable::Lambda(operation)),
            Toy::LocalFunctionRef(function) => Some(Callable::LocalFunction(*function)),
            _ => None,
        }
    }
}

fn fold_add(left: ConstValue, right: ConstValue) -> ConstValue {
    match (left, right) {
        (ConstValue::Bottom, _) | (_, ConstValue::Bottom) => ConstValue::Bottom,
        (ConstValue::Const(a), ConstValue::Const(b)) => {
            a.checked_add(b).map_or(ConstValue::Unknown, ConstValue::Const)
        }
        _ => ConstValue::Unknown,
    }
}

fn truth_value(kind: PredicateValueKind) -> ConstValue {
    match kind {
        PredicateValueKind::AlwaysTrue => ConstValue::Const(1),
        PredicateValueKind::AlwaysFalse => ConstValue::Const(0),
        PredicateValueKind::Unknown => ConstValue::Unknown,
    }
}

impl OperationVisitor<Toy> for ConstPropagation {
    type Value = ConstValue;
    type Data = ConstData;
    type Error = DataflowError;

    fn visit(
        &mut self,
        ctx: &mut Flow<'_, '_>,
        operation: Operation,
        payload: &Toy,
        data: &mut ConstData,
    ) -> Result<Effect<ConstValue>, DataflowError> {
        self.visited += 1;
        let value = match payload {
            Toy::Const(value) => ConstValue::Const(*value),
            Toy::Load(symbol) => data.value_or_unknown(&AnalysisEntity::for_symbol(*symbol)),
            Toy::Store(symbol, source) => {
                let value = *ctx.expect_value(*source)?;
                data.set(AnalysisEntity::for_symbol(*symbol), value);
                value
            }
            Toy::Add(left, right) => {
                fold_add(*ctx.expect_value(*left)?, *ctx.expect_value(*right)?)
            }
            Toy::Eq(left, right) => {
                let kind = match (*ctx.expect_value(*left)?, *ctx.expect_value(*right)?) {
                    (ConstValue::Const(a), ConstValue::Const(b)) => {
                        PredicateValueKind::from_truthiness(Some(a == b))
                    }
                    _ => PredicateValueKind::Unknown,
                };
                ctx.set_predicate_kind(operation, kind);
                truth_value(kind)
            }
            Toy::Not(inner) => {
                let kind = ctx.predicate_kind(*inner).negate();
                ctx.set_predicate_kind(operation, kind);
                truth_value(kind)
            }
            Toy::Capture(capture, source) => {
                let value = *ctx.expect_value(*source)?;
                data.set(AnalysisEntity::for_capture(ctx.capture_id(*capture)), value);
                value
            }
            Toy::CaptureRef(capture) => {
                data.value_or_unknown(&AnalysisEntity::for_capture(ctx.capture_id(*capture)))
            }
            Toy::Lambda | Toy::LocalFunctionRef(_) => ConstValue::Unknown,
            Toy::Escape(reference) => {
                if let Some(callable) = Self::callable_of(ctx, *reference) {
                    ctx.mark_escaped(callable);
                }
                ConstValue::Unknown
            }
            Toy::Call(site) => return Ok(Effect::Call(site.clone())),
            Toy::Task(source) => {
                let value = *ctx.expect_value(*source)?;
                ctx.set_task_wrapped_value(AbstractLocation::Creation(operation), value);
                ConstValue::Unknown
            }
            Toy::Await(task) => ctx
                .task_wrapped_value(&AbstractLocation::Creation(*task))
                .copied()
                .unwrap_or(ConstValue::Unknown),
        };
        Ok(Effect::Value(value))
    }

    fn initial_callee_data(
        &mut self,
        call: &InterproceduralCall<'_, ConstValue>,
        caller: &ConstData,
    ) -> Result<ConstData, DataflowError> {
        // Lambdas and local functions see the caller's locals.
        let mut data = if call.is_lambda_or_local_function() {
            caller.clone()
        } else {
            ConstData::new()
        };
        for (parameter, argument) in call.parameter_arguments() {
            data.set(AnalysisEntity::for_symbol(parameter), *argument.value());
        }
        Ok(data)
    }

    /// On `x == c` with `x` a local, `x` is `c` along the true edge.
    fn narrow_branch(
        &mut self,
        ctx: &Flow<'_, '_>,
        condition: Operation,
        taken: bool,
        data: &mut ConstData,
    ) -> Result<(), DataflowError> {
        if !taken {
            return Ok(());
        }
        let Some(Toy::Eq(left, right)) = ctx.payload(condition) else {
            return Ok(());
        };
        for (local, other) in [(*left, *right), (*right, *left)] {
            if let (Some(Toy::Load(symbol)), Some(ConstValue::Const(value))) =
                (ctx.payload(local), ctx.value(other))
            {
                data.set(AnalysisEntity::for_symbol(*symbol), ConstValue::Const(*value));
            }
        }
        Ok(())
    }

    fn argument_entity(&self, ctx: &Flow<'_, '_>, argument: Operation) -> Option<AnalysisEntity> {
        match ctx.payload(argument)? {
            Toy::Load(symbol) => Some(AnalysisEntity::for_symbol(*symbol)),
            _ => None,
        }
    }

    /// Writes a lambda or local function made to the caller's locals flow
    /// back out of it.
    fn apply_callee_result(
        &mut self,
        _ctx: &mut Flow<'_, '_>,
        call: &InterproceduralCall<'_, ConstValue>,
        callee_exit: Option<&ConstData>,
        caller: &mut ConstData,
    ) -> Result<(), DataflowError> {
        let (true, Some(exit)) = (call.is_lambda_or_local_function(), callee_exit) else {
            return Ok(());
        };
        let parameters = call.callee.parameters();
        let is_shared = |entity: &AnalysisEntity| {
            entity
                .symbol()
                .is_some_and(|symbol| !parameters.contains(&symbol))
        };
        let known: Vec<AnalysisEntity> = caller.iter().map(|(entity, _)| entity.clone()).collect();
        for entity in known.into_iter().filter(|entity| is_shared(entity)) {
            match exit.get(&entity) {
                Some(value) => caller.set(entity, *value),
                None => caller.remove(&entity),
            };
        }
        for (entity, value) in exit.iter() {
            if is_shared(entity) && !caller.contains_key(entity) {
                caller.set(entity.clone(), *value);
            }
        }
        Ok(())
    }

    fn reset_for_unanalyzed_call(
        &mut self,
        ctx: &mut Flow<'_, '_>,
        _call_site: Operation,
        site: &CallSite,
        data: &mut ConstData,
    ) {
        match site.target {
            CallTarget::Direct(Callable::Method(_)) => {
                for &argument in &site.arguments {
                    if let Some(entity) = self.argument_entity(ctx, argument) {
                        data.remove(&entity);
                    }
                }
            }
            _ => data.reset(),
        }
    }
}
