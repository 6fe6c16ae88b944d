use std::sync::Arc;

use flowfix_ir::{Block, Callable, Operation};

use super::{DataFlowAnalysis, FlowContext, Frame};
use crate::argument::ArgumentInfo;
use crate::config::InterproceduralAnalysisKind;
use crate::context::AnalysisContext;
use crate::data::{DataGuard, merge_checked};
use crate::domain::ValueDomain;
use crate::error::DataflowError;
use crate::predicate::PredicateValueKind;
use crate::result::AnalysisResult;
use crate::visitor::{CallSite, CallTarget, InterproceduralCall, OperationVisitor};

type CallOutcome<V> = (V, PredicateValueKind);

// -- Call dispatch ----------------------------------------------------------

impl<'ir, L, T> DataFlowAnalysis<'ir, L, T>
where
    T: OperationVisitor<L>,
{
    /// Dispatch a call reported by the visitor and return the value of the
    /// call operation.
    pub(crate) fn dispatch(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        call_site: Operation,
        site: &CallSite,
        data: &mut T::Data,
    ) -> Result<T::Value, T::Error> {
        let (value, kind) = match &site.target {
            CallTarget::Direct(callable) => {
                self.invoke(ctx, frame, block, call_site, site, *callable, data)?
            }
            CallTarget::Delegate(targets) if !targets.is_empty() => {
                self.invoke_delegate(ctx, frame, block, call_site, site, targets, data)?
            }
            CallTarget::Delegate(_) => {
                self.unresolved(ctx, frame, block, call_site, site, None, data)
            }
            CallTarget::Unresolved(named) => {
                self.unresolved(ctx, frame, block, call_site, site, *named, data)
            }
        };
        if self.configuration.predicate_analysis() {
            frame.predicate_kinds.insert(call_site, kind);
        }
        Ok(value)
    }

    /// Analyze every known delegate target on its own copy of the caller's
    /// data and merge the outcomes.
    #[allow(clippy::too_many_arguments)]
    fn invoke_delegate(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        call_site: Operation,
        site: &CallSite,
        targets: &[Callable],
        data: &mut T::Data,
    ) -> Result<CallOutcome<T::Value>, T::Error> {
        let saved = DataGuard::new(data.clone());
        let mut merged: Option<(T::Value, PredicateValueKind, DataGuard<T::Data>)> = None;
        for &callable in targets {
            let mut target_data = saved.clone();
            let (value, kind) =
                self.invoke(ctx, frame, block, call_site, site, callable, &mut *target_data)?;
            merged = Some(match merged {
                Some((merged_value, merged_kind, merged_data)) => (
                    merged_value.merge(&value),
                    merged_kind.merge(kind),
                    DataGuard::new(merge_checked(&*merged_data, &*target_data)),
                ),
                None => (value, kind, target_data),
            });
        }
        match merged {
            Some((value, kind, mut merged_data)) => {
                // The caller's previous data is released with the guard.
                std::mem::swap(data, &mut *merged_data);
                Ok((value, kind))
            }
            None => Ok(self.unresolved(ctx, frame, block, call_site, site, None, data)),
        }
    }

    /// Follow a call into `callable`'s graph, or fall back to the unknown
    /// value when it cannot or must not be followed.
    #[allow(clippy::too_many_arguments)]
    fn invoke(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        call_site: Operation,
        site: &CallSite,
        callable: Callable,
        data: &mut T::Data,
    ) -> Result<CallOutcome<T::Value>, T::Error> {
        let program = self.program;
        let configuration = self.configuration;
        let is_lambda_or_local_function = callable.is_lambda_or_local_function();

        if !is_lambda_or_local_function
            && configuration.kind() == InterproceduralAnalysisKind::None
        {
            return Ok(self.fallback(ctx, frame, block, call_site, site, data));
        }

        let Some(callee) = program.resolve(callable).and_then(|id| program.graph(id)) else {
            log::trace!(target: "dataflow-interproc", "{callable:?} does not resolve");
            return Ok(self.unresolved(ctx, frame, block, call_site, site, Some(callable), data));
        };

        if self.skip.as_ref().is_some_and(|skip| skip(callee, callable)) {
            log::trace!(target: "dataflow-interproc", "skipping {callable:?}");
            return Ok(self.fallback(ctx, frame, block, call_site, site, data));
        }

        if ctx.is_being_analyzed(callee.id()) {
            log::trace!(
                target: "dataflow-interproc",
                "{callable:?} is already being analyzed, using the unknown value"
            );
            frame.truncated = true;
            return Ok(self.fallback(ctx, frame, block, call_site, site, data));
        }

        let (depth, limit) = if is_lambda_or_local_function {
            (
                ctx.lambda_or_local_function_call_depth(),
                configuration.max_lambda_or_local_function_call_chain(),
            )
        } else {
            (ctx.method_call_depth(), configuration.max_method_call_chain())
        };
        if depth >= limit {
            log::trace!(
                target: "dataflow-interproc",
                "call chain limit {limit} reached at {callable:?}"
            );
            frame.truncated = true;
            return Ok(self.fallback(ctx, frame, block, call_site, site, data));
        }

        if site.arguments.len() != callee.parameters().len() {
            return Err(DataflowError::ArityMismatch {
                callee: callee.id(),
                expected: callee.parameters().len(),
                got: site.arguments.len(),
            }
            .into());
        }

        let mut arguments = Vec::with_capacity(site.arguments.len());
        {
            let flow = FlowContext::new(ctx, frame, block);
            for &argument in &site.arguments {
                let value = flow.expect_value(argument)?.clone();
                arguments.push(ArgumentInfo::new(
                    argument,
                    self.visitor.argument_entity(&flow, argument),
                    self.visitor.argument_location(&flow, argument, data),
                    value,
                ));
            }
        }

        let call = InterproceduralCall {
            callable,
            callee,
            call_site,
            arguments: &arguments,
        };
        let seed = DataGuard::new(self.visitor.initial_callee_data(&call, data)?);

        let cached = self
            .summaries
            .get(&callee.id())
            .and_then(|cache| cache.lookup(&arguments, &seed))
            .cloned();
        let result = match cached {
            Some(result) => {
                log::debug!(target: "dataflow-interproc", "reusing summary of {:?}", callee.id());
                result
            }
            None => {
                log::debug!(
                    target: "dataflow-interproc",
                    "analyzing {callable:?} ({:?}) for {call_site:?}",
                    callee.id()
                );
                let callee_ctx = ctx.fork_for_call(callee, callable, call_site);
                let result = Arc::new(self.run_fixpoint(&callee_ctx, (*seed).clone())?);
                if result.is_truncated() {
                    log::trace!(
                        target: "dataflow-interproc",
                        "not caching {:?}, its result depends on the call chain",
                        callee.id()
                    );
                } else {
                    self.summaries.entry(callee.id()).or_default().push_entry(
                        arguments.clone(),
                        seed,
                        result.clone(),
                    );
                }
                result
            }
        };
        frame.truncated |= result.is_truncated();

        frame.interprocedural_results.insert(call_site, result.clone());
        if is_lambda_or_local_function {
            frame.escapes.mark_analyzed(callable);
        }

        if is_lambda_or_local_function
            || configuration.kind() == InterproceduralAnalysisKind::ContextSensitive
        {
            {
                let mut flow = FlowContext::new(ctx, frame, block);
                self.visitor
                    .apply_callee_result(&mut flow, &call, result.exit_data(), data)?;
            }
            if let Some(thrown) = result.unhandled_throw_data() {
                frame.merge_callee_throw_data(thrown);
            }
            frame.task_wrapped_values.extend(
                result
                    .task_wrapped_values()
                    .iter()
                    .map(|(location, value)| (*location, value.clone())),
            );
        } else if configuration.pessimistic() {
            let mut flow = FlowContext::new(ctx, frame, block);
            self.visitor
                .reset_for_unanalyzed_call(&mut flow, call_site, site, data);
        }

        Ok(result
            .return_value_and_predicate_kind()
            .cloned()
            .unwrap_or_else(|| (T::Value::unknown_or_may_be(), PredicateValueKind::Unknown)))
    }

    /// A call whose target is unknown. A named lambda or local function
    /// escapes through it.
    #[allow(clippy::too_many_arguments)]
    fn unresolved(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        call_site: Operation,
        site: &CallSite,
        named: Option<Callable>,
        data: &mut T::Data,
    ) -> CallOutcome<T::Value> {
        if let Some(callable) = named {
            frame.escapes.mark_escaped(callable);
        }
        self.fallback(ctx, frame, block, call_site, site, data)
    }

    fn fallback(
        &mut self,
        ctx: &AnalysisContext<'ir, L>,
        frame: &mut Frame<T::Value, T::Data>,
        block: Block,
        call_site: Operation,
        site: &CallSite,
        data: &mut T::Data,
    ) -> CallOutcome<T::Value> {
        if self.configuration.pessimistic() {
            let mut flow = FlowContext::new(ctx, frame, block);
            self.visitor
                .reset_for_unanalyzed_call(&mut flow, call_site, site, data);
        }
        (T::Value::unknown_or_may_be(), PredicateValueKind::Unknown)
    }
}
