use crate::*;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Stmt {
    Const(i64),
    Lambda,
}

fn diamond(program: &mut Program<Stmt>) -> (CfgId, [Block; 4]) {
    let main = program.intern("main");
    let mut g = program.build_graph(main).returns_value(true);
    let entry = g.entry();
    let then_block = g.block();
    let else_block = g.block();
    let join = g.block();
    let cond = g.op(entry, Stmt::Const(1));
    g.branch(entry, cond, then_block, else_block);
    g.jump(then_block, join);
    g.jump(else_block, join);
    let value = g.op(join, Stmt::Const(2));
    g.ret(join, Some(value));
    let cfg = g.finish().unwrap();
    (cfg, [entry, then_block, else_block, join])
}

#[test]
fn test_intern_is_stable() {
    let mut program: Program<Stmt> = Program::new();
    let a = program.intern("a");
    let b = program.intern("b");
    assert_ne!(a, b);
    assert_eq!(program.intern("a"), a);
    assert_eq!(program.symbol_name(b), Some("b"));
}

#[test]
fn test_diamond_edges() {
    let mut program = Program::new();
    let (cfg, [entry, then_block, else_block, join]) = diamond(&mut program);
    let graph = program.graph(cfg).unwrap();

    assert_eq!(graph.entry(), entry);
    assert_eq!(graph.blocks().len(), 5);
    let exit = graph.exit();
    assert_eq!(program.block(exit).unwrap().kind(), BlockKind::Exit);

    assert_eq!(
        program.block(entry).unwrap().successors(),
        &[then_block, else_block]
    );
    assert_eq!(
        program.block(join).unwrap().predecessors(),
        &[then_block, else_block]
    );
    assert_eq!(program.block(exit).unwrap().predecessors(), &[join]);
    assert_eq!(program.method_graph(program.graph(cfg).unwrap().owner()), Some(cfg));
}

#[test]
fn test_back_edge_is_a_predecessor() {
    let mut program: Program<Stmt> = Program::new();
    let f = program.intern("loop");
    let mut g = program.build_graph(f);
    let entry = g.entry();
    let header = g.block();
    let body = g.block();
    let after = g.block();
    g.jump(entry, header);
    let cond = g.op(header, Stmt::Const(0));
    g.branch(header, cond, body, after);
    g.jump(body, header);
    g.ret(after, None);
    let cfg = g.finish().unwrap();

    assert_eq!(program.block(header).unwrap().predecessors(), &[entry, body]);
    let graph = program.graph(cfg).unwrap();
    assert!(graph.is_back_edge(body, header));
    assert!(!graph.is_back_edge(entry, header));
    assert!(!graph.is_back_edge(header, body));
}

#[test]
fn test_jump_to_earlier_block_is_not_a_back_edge() {
    let mut program: Program<Stmt> = Program::new();
    let f = program.intern("reordered");
    let mut g = program.build_graph(f);
    let entry = g.entry();
    let tail = g.block();
    let middle = g.block();
    g.jump(entry, middle);
    g.jump(middle, tail);
    g.ret(tail, None);
    let cfg = g.finish().unwrap();

    let graph = program.graph(cfg).unwrap();
    assert!(!graph.is_back_edge(middle, tail));
    assert!(!graph.is_back_edge(entry, middle));
}

#[test]
fn test_self_loop_is_a_back_edge() {
    let mut program: Program<Stmt> = Program::new();
    let f = program.intern("spin");
    let mut g = program.build_graph(f);
    let entry = g.entry();
    let spin = g.block();
    let after = g.block();
    g.jump(entry, spin);
    let cond = g.op(spin, Stmt::Const(0));
    g.branch(spin, cond, spin, after);
    g.ret(after, None);
    let cfg = g.finish().unwrap();

    assert!(program.graph(cfg).unwrap().is_back_edge(spin, spin));
}

#[test]
fn test_missing_terminator_is_rejected() {
    let mut program: Program<Stmt> = Program::new();
    let f = program.intern("f");
    let mut g = program.build_graph(f);
    let entry = g.entry();
    g.op(entry, Stmt::Const(3));
    assert_eq!(g.finish(), Err(BuildError::MissingTerminator(entry)));
}

#[test]
fn test_condition_must_live_in_branching_block() {
    let mut program: Program<Stmt> = Program::new();
    let f = program.intern("f");
    let mut g = program.build_graph(f);
    let entry = g.entry();
    let other = g.block();
    let cond = g.op(other, Stmt::Const(1));
    g.branch(entry, cond, other, other);
    g.ret(other, None);
    assert_eq!(
        g.finish(),
        Err(BuildError::ConditionOutsideBlock {
            block: entry,
            condition: cond
        })
    );
}

#[test]
fn test_callable_resolution() {
    let mut program: Program<Stmt> = Program::new();
    let (outer, [entry, ..]) = diamond(&mut program);
    let creation = program.block(entry).unwrap().operations()[0];
    assert_eq!(program.payload(creation), Some(&Stmt::Const(1)));

    let anonymous = program.intern("<lambda>");
    let mut g = program
        .build_graph(anonymous)
        .kind(GraphKind::Lambda { creation });
    let e = g.entry();
    g.ret(e, None);
    let lambda = g.finish().unwrap();

    let helper = program.intern("helper");
    let mut g = program.build_graph(helper).kind(GraphKind::LocalFunction);
    let e = g.entry();
    g.op(e, Stmt::Lambda);
    g.ret(e, None);
    let local = g.finish().unwrap();

    let dynamic = program.intern("dynamic");
    let mut g = program
        .build_graph(dynamic)
        .kind(GraphKind::Method { is_virtual: true });
    let e = g.entry();
    g.ret(e, None);
    g.finish().unwrap();

    assert_eq!(program.graph(lambda).unwrap().parent(), Some(outer));
    assert_eq!(program.resolve(Callable::Lambda(creation)), Some(lambda));
    assert_eq!(program.resolve(Callable::LocalFunction(helper)), Some(local));
    assert_eq!(program.resolve(Callable::Method(dynamic)), None);
    let unknown = program.intern("unknown");
    assert_eq!(program.resolve(Callable::Method(unknown)), None);
}
