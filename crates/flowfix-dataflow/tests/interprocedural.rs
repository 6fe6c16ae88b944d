use flowfix_dataflow::*;
use flowfix_ir::{CaptureId, CfgId, GraphKind, Operation, Program, Symbol};
use flowfix_test_utils::{ConstData, ConstPropagation, ConstValue, Toy};

type Analysis<'ir> = DataFlowAnalysis<'ir, Toy, ConstPropagation>;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn var(symbol: Symbol) -> AnalysisEntity {
    AnalysisEntity::for_symbol(symbol)
}

fn analysis(program: &Program<Toy>) -> Analysis<'_> {
    init_logger();
    DataFlowAnalysis::new(program, ConstPropagation::new())
}

fn configured(
    program: &Program<Toy>,
    configuration: InterproceduralAnalysisConfiguration,
) -> Analysis<'_> {
    analysis(program).with_configuration(configuration)
}

fn exit_value(
    result: &DataFlowAnalysisResult<ConstValue, ConstData>,
    symbol: Symbol,
) -> Option<ConstValue> {
    result.exit_data().and_then(|data| data.get(&var(symbol)).copied())
}

/// `add_one(n) = n + 1`
fn add_one(program: &mut Program<Toy>) -> (Symbol, CfgId) {
    let name = program.intern("add_one");
    let n = program.intern("n");
    let mut g = program.build_graph(name).parameter(n).returns_value(true);
    let entry = g.entry();
    let load = g.op(entry, Toy::Load(n));
    let one = g.op(entry, Toy::Const(1));
    let sum = g.op(entry, Toy::Add(load, one));
    g.ret(entry, Some(sum));
    (name, g.finish().unwrap())
}

/// `a = 41; r = callee(a); return`
struct CallsOnce {
    main: CfgId,
    call: Operation,
    a: Symbol,
    r: Symbol,
}

fn calls_once(program: &mut Program<Toy>, callee: Symbol) -> CallsOnce {
    let main = program.intern("main");
    let a = program.intern("a");
    let r = program.intern("r");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let value = g.op(entry, Toy::Const(41));
    g.op(entry, Toy::Store(a, value));
    let load = g.op(entry, Toy::Load(a));
    let call = g.op(
        entry,
        Toy::Call(CallSite::direct(Callable::Method(callee), [load])),
    );
    g.op(entry, Toy::Store(r, call));
    g.ret(entry, None);
    CallsOnce {
        main: g.finish().unwrap(),
        call,
        a,
        r,
    }
}

/// A lambda created by `creation` returning `value`.
fn constant_lambda(program: &mut Program<Toy>, creation: Operation, value: i64) -> CfgId {
    let name = program.intern("lambda");
    let mut g = program
        .build_graph(name)
        .kind(GraphKind::Lambda { creation })
        .returns_value(true);
    let entry = g.entry();
    let constant = g.op(entry, Toy::Const(value));
    g.ret(entry, Some(constant));
    g.finish().unwrap()
}

// ---- methods ----

#[test]
fn test_context_sensitive_call() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let CallsOnce { main, call, a, r } = calls_once(&mut program, name);

    let mut analysis = analysis(&program);
    let result = analysis.analyze(main, ConstData::new()).unwrap();

    assert_eq!(result.value(call), Some(&ConstValue::Const(42)));
    assert_eq!(result.predicate_kind(call), PredicateValueKind::Unknown);
    assert_eq!(exit_value(&result, a), Some(ConstValue::Const(41)));
    assert_eq!(exit_value(&result, r), Some(ConstValue::Const(42)));

    let callee_result = result.interprocedural_result(call).unwrap();
    assert_eq!(callee_result.cfg(), callee);
    assert_eq!(
        callee_result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(42), PredicateValueKind::Unknown))
    );
    assert_eq!(analysis.summary(callee).map(SummaryCache::len), Some(1));
}

/// `is_one(n) = 1 == 1`
fn always_true(program: &mut Program<Toy>) -> Symbol {
    let name = program.intern("is_one");
    let n = program.intern("n");
    let mut g = program.build_graph(name).parameter(n).returns_value(true);
    let entry = g.entry();
    let left = g.op(entry, Toy::Const(1));
    let right = g.op(entry, Toy::Const(1));
    let eq = g.op(entry, Toy::Eq(left, right));
    g.ret(entry, Some(eq));
    g.finish().unwrap();
    name
}

#[test]
fn test_call_predicate_kind_follows_predicate_analysis() {
    let mut program = Program::new();
    let name = always_true(&mut program);
    let CallsOnce { main, call, .. } = calls_once(&mut program, name);

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.predicate_kind(call), PredicateValueKind::AlwaysTrue);

    let without = InterproceduralAnalysisConfiguration::builder()
        .predicate_analysis(false)
        .build();
    let result = configured(&program, without)
        .analyze(main, ConstData::new())
        .unwrap();
    assert_eq!(result.value(call), Some(&ConstValue::Const(1)));
    assert_eq!(result.predicate_kind(call), PredicateValueKind::Unknown);
}

#[test]
fn test_equivalent_calls_reuse_summary() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let main = program.intern("main");
    let a = program.intern("a");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let value = g.op(entry, Toy::Const(41));
    g.op(entry, Toy::Store(a, value));
    let load = g.op(entry, Toy::Load(a));
    let first = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [load])));
    let second = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [load])));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    let mut analysis = analysis(&program);
    let result = analysis.analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(first), Some(&ConstValue::Const(42)));
    assert_eq!(result.value(second), Some(&ConstValue::Const(42)));
    assert_eq!(analysis.summary(callee).map(SummaryCache::len), Some(1));
    // five operations in `main`, three in `add_one` visited once
    assert_eq!(analysis.visitor().visited, 8);
}

#[test]
fn test_different_arguments_get_separate_summaries() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let main = program.intern("main");
    let mut g = program.build_graph(main).returns_value(true);
    let entry = g.entry();
    let one = g.op(entry, Toy::Const(1));
    let two = g.op(entry, Toy::Const(2));
    let first = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [one])));
    let second = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [two])));
    let sum = g.op(entry, Toy::Add(first, second));
    g.ret(entry, Some(sum));
    let main = g.finish().unwrap();

    let mut analysis = analysis(&program);
    let result = analysis.analyze(main, ConstData::new()).unwrap();
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(5), PredicateValueKind::Unknown))
    );
    assert_eq!(analysis.summary(callee).map(SummaryCache::len), Some(2));

    analysis.clear_summaries();
    assert!(analysis.summary(callee).is_none());
}

#[test]
fn test_context_insensitive_keeps_return_value_only() {
    let mut program = Program::new();
    let (name, _) = add_one(&mut program);
    let CallsOnce { main, call, a, r } = calls_once(&mut program, name);

    let configuration = InterproceduralAnalysisConfiguration::builder()
        .kind(InterproceduralAnalysisKind::ContextInsensitive)
        .build();
    let result = configured(&program, configuration)
        .analyze(main, ConstData::new())
        .unwrap();
    assert_eq!(result.value(call), Some(&ConstValue::Const(42)));
    assert_eq!(exit_value(&result, r), Some(ConstValue::Const(42)));
    // the argument local is reset after the call
    assert_eq!(exit_value(&result, a), None);
}

#[test]
fn test_no_interprocedural_analysis() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let CallsOnce { main, call, a, r } = calls_once(&mut program, name);

    let configuration = InterproceduralAnalysisConfiguration::builder()
        .kind(InterproceduralAnalysisKind::None)
        .build();
    let mut analysis = configured(&program, configuration);
    let result = analysis.analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(call), Some(&ConstValue::Unknown));
    assert!(result.interprocedural_result(call).is_none());
    assert!(analysis.summary(callee).is_none());
    assert_eq!(exit_value(&result, a), None);
    assert_eq!(exit_value(&result, r), Some(ConstValue::Unknown));

    let optimistic = InterproceduralAnalysisConfiguration::builder()
        .kind(InterproceduralAnalysisKind::None)
        .pessimistic(false)
        .build();
    let result = configured(&program, optimistic)
        .analyze(main, ConstData::new())
        .unwrap();
    assert_eq!(exit_value(&result, a), Some(ConstValue::Const(41)));
}

#[test]
fn test_skip_predicate_vetoes_callee() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let CallsOnce { main, call, .. } = calls_once(&mut program, name);

    let mut analysis = analysis(&program).with_skip(move |graph, _| graph.owner() == name);
    let result = analysis.analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(call), Some(&ConstValue::Unknown));
    assert!(analysis.summary(callee).is_none());
}

#[test]
fn test_virtual_and_missing_methods_are_unknown() {
    let mut program = Program::new();
    let external = program.intern("external");
    let virtual_name = program.intern("overridable");
    let mut g = program
        .build_graph(virtual_name)
        .kind(GraphKind::Method { is_virtual: true })
        .returns_value(true);
    let entry = g.entry();
    let one = g.op(entry, Toy::Const(1));
    g.ret(entry, Some(one));
    g.finish().unwrap();

    let main = program.intern("main");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let calls = [external, virtual_name]
        .map(|name| g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), []))));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    for call in calls {
        assert_eq!(result.value(call), Some(&ConstValue::Unknown));
        assert!(result.interprocedural_result(call).is_none());
    }
    assert!(result.lambda_and_local_function_info().is_empty());
}

#[test]
fn test_arity_mismatch_is_an_error() {
    let mut program = Program::new();
    let (name, callee) = add_one(&mut program);
    let main = program.intern("main");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [])));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    let error = analysis(&program)
        .analyze(main, ConstData::new())
        .unwrap_err();
    assert!(matches!(
        error,
        DataflowError::ArityMismatch { callee: id, expected: 1, got: 0 } if id == callee
    ));
}

#[test]
fn test_callee_throw_data_reaches_caller() {
    let mut program = Program::new();
    let fails = program.intern("fails");
    let n = program.intern("n");
    let e = program.intern("e");
    let mut g = program.build_graph(fails).parameter(n);
    let entry = g.entry();
    let seven = g.op(entry, Toy::Const(7));
    g.op(entry, Toy::Store(e, seven));
    g.throw(entry, None);
    g.finish().unwrap();

    let main = program.intern("main");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let one = g.op(entry, Toy::Const(1));
    g.op(entry, Toy::Call(CallSite::direct(Callable::Method(fails), [one])));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    let thrown = result.unhandled_throw_data().unwrap();
    assert_eq!(thrown.get(&var(e)), Some(&ConstValue::Const(7)));
    assert_eq!(thrown.get(&var(n)), Some(&ConstValue::Const(1)));
    assert!(result.exit_block_result().unwrap().is_reachable());
}

#[test]
fn test_callee_task_values_reach_caller() {
    let mut program = Program::new();
    let spawn = program.intern("spawn");
    let mut g = program.build_graph(spawn);
    let entry = g.entry();
    let five = g.op(entry, Toy::Const(5));
    let task = g.op(entry, Toy::Task(five));
    g.ret(entry, None);
    g.finish().unwrap();

    let main = program.intern("main");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    g.op(entry, Toy::Call(CallSite::direct(Callable::Method(spawn), [])));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(
        result
            .task_wrapped_values()
            .get(&AbstractLocation::Creation(task)),
        Some(&ConstValue::Const(5))
    );
}

// ---- recursion and call chains ----

#[test]
fn test_recursive_call_is_unknown() {
    let mut program = Program::new();
    let name = program.intern("rec");
    let n = program.intern("n");
    let mut g = program.build_graph(name).parameter(n).returns_value(true);
    let entry = g.entry();
    let load = g.op(entry, Toy::Load(n));
    let call = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(name), [load])));
    g.ret(entry, Some(call));
    let rec = g.finish().unwrap();

    let mut initial = ConstData::new();
    initial.set(var(n), ConstValue::Const(1));
    let mut analysis = analysis(&program);
    let result = analysis.analyze(rec, initial).unwrap();

    assert_eq!(result.value(call), Some(&ConstValue::Unknown));
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Unknown, PredicateValueKind::Unknown))
    );
    assert_eq!(exit_value(&result, n), None);
    assert!(analysis.summary(rec).is_none());
}

/// `m0(n) = m1(n)`, ..., `m3(n) = m4(n)`, `m4(n) = 7`
fn method_chain(program: &mut Program<Toy>) -> Vec<CfgId> {
    let n = program.intern("n");
    let names: Vec<Symbol> = (0..5).map(|k| program.intern(format!("m{k}"))).collect();
    let mut graphs = Vec::with_capacity(names.len());
    for (k, &name) in names.iter().enumerate() {
        let mut g = program.build_graph(name).parameter(n).returns_value(true);
        let entry = g.entry();
        let returned = match names.get(k + 1) {
            Some(&next) => {
                let load = g.op(entry, Toy::Load(n));
                g.op(entry, Toy::Call(CallSite::direct(Callable::Method(next), [load])))
            }
            None => g.op(entry, Toy::Const(7)),
        };
        g.ret(entry, Some(returned));
        graphs.push(g.finish().unwrap());
    }
    graphs
}

#[test]
fn test_method_call_chain_limit() {
    let mut program = Program::new();
    let root = method_chain(&mut program)[0];

    let result = analysis(&program).analyze(root, ConstData::new()).unwrap();
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Unknown, PredicateValueKind::Unknown))
    );

    let deeper = InterproceduralAnalysisConfiguration::builder()
        .max_method_call_chain(4)
        .build();
    let result = configured(&program, deeper)
        .analyze(root, ConstData::new())
        .unwrap();
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(7), PredicateValueKind::Unknown))
    );
}

#[test]
fn test_truncated_results_are_not_cached() {
    let mut program = Program::new();
    let chain = method_chain(&mut program);
    let fresh = analysis(&program).analyze(chain[1], ConstData::new()).unwrap();
    assert!(!fresh.is_truncated());
    assert_eq!(
        fresh.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(7), PredicateValueKind::Unknown))
    );

    let mut analysis = analysis(&program);
    let root = analysis.analyze(chain[0], ConstData::new()).unwrap();
    assert!(root.is_truncated());
    for &callee in &chain[1..] {
        assert!(analysis.summary(callee).is_none());
    }

    // m1 as a root sees the whole chain below it
    let again = analysis.analyze(chain[1], ConstData::new()).unwrap();
    assert!(!again.is_truncated());
    assert_eq!(
        again.return_value_and_predicate_kind(),
        fresh.return_value_and_predicate_kind()
    );
    assert_eq!(analysis.summary(chain[4]).map(SummaryCache::len), Some(1));
}

#[test]
fn test_recursion_is_not_cached() {
    let mut program = Program::new();
    let f = program.intern("f");
    let n = program.intern("n");
    let mut g = program.build_graph(f).parameter(n).returns_value(true);
    let entry = g.entry();
    let load = g.op(entry, Toy::Load(n));
    let call = g.op(entry, Toy::Call(CallSite::direct(Callable::Method(f), [load])));
    g.ret(entry, Some(call));
    let f_cfg = g.finish().unwrap();
    let CallsOnce { main, .. } = calls_once(&mut program, f);

    let mut analysis = analysis(&program);
    let result = analysis.analyze(main, ConstData::new()).unwrap();
    assert!(result.is_truncated());
    assert!(analysis.summary(f_cfg).is_none());
}

// ---- lambdas and local functions ----

/// `x = 1; bump(); return x` with local function `bump() { x = x + 1 }`
fn bumps_local(program: &mut Program<Toy>) -> (CfgId, Symbol, Operation) {
    let main = program.intern("main");
    let bump = program.intern("bump");
    let x = program.intern("x");
    let mut g = program.build_graph(main).returns_value(true);
    let entry = g.entry();
    let one = g.op(entry, Toy::Const(1));
    g.op(entry, Toy::Store(x, one));
    let call = g.op(
        entry,
        Toy::Call(CallSite::direct(Callable::LocalFunction(bump), [])),
    );
    let load = g.op(entry, Toy::Load(x));
    g.ret(entry, Some(load));
    let main_cfg = g.finish().unwrap();

    let mut g = program
        .build_graph(bump)
        .kind(GraphKind::LocalFunction)
        .parent(main_cfg);
    let entry = g.entry();
    let load = g.op(entry, Toy::Load(x));
    let one = g.op(entry, Toy::Const(1));
    let sum = g.op(entry, Toy::Add(load, one));
    g.op(entry, Toy::Store(x, sum));
    g.ret(entry, None);
    g.finish().unwrap();

    (main_cfg, bump, call)
}

#[test]
fn test_local_function_writes_flow_back() {
    let mut program = Program::new();
    let (main, bump, call) = bumps_local(&mut program);

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(2), PredicateValueKind::Unknown))
    );
    let info = result.lambda_and_local_function_info();
    assert!(info.is_analyzed(Callable::LocalFunction(bump)));
    assert!(!info.requires_conservative_treatment(Callable::LocalFunction(bump)));
    assert_eq!(
        info.analyzed_local_functions().collect::<Vec<_>>(),
        vec![bump]
    );
    assert!(result.interprocedural_result(call).is_some());
}

#[test]
fn test_local_functions_ignore_interprocedural_kind() {
    let mut program = Program::new();
    let (main, _, _) = bumps_local(&mut program);

    let configuration = InterproceduralAnalysisConfiguration::builder()
        .kind(InterproceduralAnalysisKind::None)
        .build();
    let result = configured(&program, configuration)
        .analyze(main, ConstData::new())
        .unwrap();
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Const(2), PredicateValueKind::Unknown))
    );
}

#[test]
fn test_skipped_local_function_needs_conservative_treatment() {
    let mut program = Program::new();
    let (main, bump, call) = bumps_local(&mut program);

    let result = analysis(&program)
        .with_skip(|_, callable| callable.is_lambda_or_local_function())
        .analyze(main, ConstData::new())
        .unwrap();
    let info = result.lambda_and_local_function_info();
    assert!(!info.is_escaped(Callable::LocalFunction(bump)));
    assert!(!info.is_analyzed(Callable::LocalFunction(bump)));
    assert!(info.requires_conservative_treatment(Callable::LocalFunction(bump)));
    assert_eq!(result.value(call), Some(&ConstValue::Unknown));
    // pessimistic reset forgets every local
    assert_eq!(
        result.return_value_and_predicate_kind(),
        Some(&(ConstValue::Unknown, PredicateValueKind::Unknown))
    );
}

#[test]
fn test_lambda_call_chain_limit() {
    let mut program = Program::new();
    let main = program.intern("main");
    let outer = program.intern("outer");
    let inner = program.intern("inner");

    let mut g = program.build_graph(main);
    let entry = g.entry();
    let call = g.op(
        entry,
        Toy::Call(CallSite::direct(Callable::LocalFunction(outer), [])),
    );
    g.ret(entry, None);
    let main = g.finish().unwrap();

    for (name, next) in [(outer, Some(inner)), (inner, None)] {
        let mut g = program.build_graph(name).kind(GraphKind::LocalFunction);
        let entry = g.entry();
        if let Some(next) = next {
            g.op(
                entry,
                Toy::Call(CallSite::direct(Callable::LocalFunction(next), [])),
            );
        }
        g.ret(entry, None);
        g.finish().unwrap();
    }

    let configuration = InterproceduralAnalysisConfiguration::builder()
        .max_lambda_or_local_function_call_chain(1)
        .build();
    let result = configured(&program, configuration)
        .analyze(main, ConstData::new())
        .unwrap();
    assert!(result
        .lambda_and_local_function_info()
        .is_analyzed(Callable::LocalFunction(outer)));
    let outer_result = result.interprocedural_result(call).unwrap();
    assert!(!outer_result
        .lambda_and_local_function_info()
        .is_analyzed(Callable::LocalFunction(inner)));
}

#[test]
fn test_delegate_targets_merge() {
    let mut program = Program::new();
    let main = program.intern("main");
    let r = program.intern("r");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let lambdas = [g.op(entry, Toy::Lambda), g.op(entry, Toy::Lambda), g.op(entry, Toy::Lambda)];
    let targets = |picked: &[Operation]| {
        CallTarget::Delegate(picked.iter().map(|&op| Callable::Lambda(op)).collect())
    };
    let differing = g.op(
        entry,
        Toy::Call(CallSite::new(targets(&lambdas[..2]), [])),
    );
    let agreeing = g.op(
        entry,
        Toy::Call(CallSite::new(targets(&[lambdas[1], lambdas[2]]), [])),
    );
    let empty = g.op(entry, Toy::Call(CallSite::new(targets(&[]), [])));
    g.op(entry, Toy::Store(r, agreeing));
    g.ret(entry, None);
    let main = g.finish().unwrap();

    for (creation, value) in lambdas.into_iter().zip([1, 2, 2]) {
        constant_lambda(&mut program, creation, value);
    }

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(differing), Some(&ConstValue::Unknown));
    assert_eq!(result.value(agreeing), Some(&ConstValue::Const(2)));
    assert_eq!(result.value(empty), Some(&ConstValue::Unknown));
    let info = result.lambda_and_local_function_info();
    for creation in lambdas {
        assert!(info.is_analyzed(Callable::Lambda(creation)));
        assert!(!info.is_escaped(Callable::Lambda(creation)));
    }
}

#[test]
fn test_unresolved_delegate_escapes_named_target() {
    let mut program = Program::new();
    let main = program.intern("main");
    let helper = program.intern("helper");
    let mut g = program.build_graph(main);
    let entry = g.entry();
    let lambda = g.op(entry, Toy::Lambda);
    let call = g.op(
        entry,
        Toy::Call(CallSite::new(
            CallTarget::Unresolved(Some(Callable::Lambda(lambda))),
            [],
        )),
    );
    let reference = g.op(entry, Toy::LocalFunctionRef(helper));
    g.op(entry, Toy::Escape(reference));
    g.ret(entry, None);
    let main = g.finish().unwrap();
    constant_lambda(&mut program, lambda, 3);

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(call), Some(&ConstValue::Unknown));
    assert!(result.interprocedural_result(call).is_none());

    let info = result.lambda_and_local_function_info();
    assert!(info.is_escaped(Callable::Lambda(lambda)));
    assert!(!info.is_analyzed(Callable::Lambda(lambda)));
    assert!(info.requires_conservative_treatment(Callable::Lambda(lambda)));
    assert_eq!(info.escaped_lambdas().collect::<Vec<_>>(), vec![lambda]);
    assert_eq!(
        info.escaped_local_functions().collect::<Vec<_>>(),
        vec![helper]
    );
}

#[test]
fn test_captures_are_distinct_per_graph() {
    let mut program = Program::new();
    let main = program.intern("main");
    let capture = CaptureId(0);
    let mut g = program.build_graph(main).returns_value(true);
    let entry = g.entry();
    let three = g.op(entry, Toy::Const(3));
    g.op(entry, Toy::Capture(capture, three));
    let lambda = g.op(entry, Toy::Lambda);
    let call = g.op(
        entry,
        Toy::Call(CallSite::direct(Callable::Lambda(lambda), [])),
    );
    let read = g.op(entry, Toy::CaptureRef(capture));
    g.ret(entry, Some(read));
    let main = g.finish().unwrap();

    let name = program.intern("lambda");
    let mut g = program
        .build_graph(name)
        .kind(GraphKind::Lambda { creation: lambda });
    let entry = g.entry();
    let nine = g.op(entry, Toy::Const(9));
    g.op(entry, Toy::Capture(capture, nine));
    g.ret(entry, None);
    let lambda_cfg = g.finish().unwrap();
    assert_eq!(program.graph(lambda_cfg).unwrap().parent(), Some(main));

    let result = analysis(&program).analyze(main, ConstData::new()).unwrap();
    assert_eq!(result.value(read), Some(&ConstValue::Const(3)));

    let lambda_exit = result.interprocedural_result(call).unwrap().exit_data().unwrap();
    let in_main = AnalysisEntity::for_capture(InterproceduralCaptureId::new(capture, main, false));
    let in_lambda =
        AnalysisEntity::for_capture(InterproceduralCaptureId::new(capture, lambda_cfg, false));
    assert_ne!(in_main, in_lambda);
    assert_eq!(lambda_exit.get(&in_main), Some(&ConstValue::Const(3)));
    assert_eq!(lambda_exit.get(&in_lambda), Some(&ConstValue::Const(9)));
}
