use std::{cell::RefCell, rc::Weak};

use super::*;
use crate::{
    animation::anim::Anim,
    foundation::diagnostics::MemorySink,
    node::{animated::AnimatedNode, constant::ConstNode},
};

fn node_at(x: f64, y: f64) -> DynamicNode {
    DynamicNode::new(&Value::Vector(Vec2::new(x, y))).unwrap()
}

fn approx(a: Vec2, b: Vec2, eps: f64) -> bool {
    (a - b).hypot() <= eps
}

#[derive(Debug)]
struct Echo {
    target: RefCell<Option<Weak<DynamicNode>>>,
}

impl ValueNode for Echo {
    fn value_type(&self) -> ValueType {
        ValueType::Vector
    }

    fn value_at(&self, t: Time) -> SimResult<Value> {
        match self.target.borrow().as_ref().and_then(Weak::upgrade) {
            Some(node) => node.evaluate(Time(t.0 + 1.0)).map(|_| Value::Vector(Vec2::ZERO)),
            None => Ok(Value::Vector(Vec2::ZERO)),
        }
    }

    fn name(&self) -> &'static str {
        "echo"
    }

    fn local_name(&self) -> &'static str {
        "Echo"
    }
}

#[test]
fn construction_starts_at_rest() {
    let node = node_at(3.0, 4.0);
    let [r, r_dot, theta, theta_dot] = node.state();
    assert!((r - 5.0).abs() < 1e-12);
    assert!((theta - 4.0_f64.atan2(3.0)).abs() < 1e-12);
    assert_eq!((r_dot, theta_dot), (0.0, 0.0));
    assert_eq!(node.last_time(), Time::ZERO);
}

#[test]
fn non_vector_seed_is_rejected() {
    let err = DynamicNode::new(&Value::Real(1.0)).unwrap_err();
    assert!(matches!(
        err,
        SimError::TypeMismatch {
            expected: ValueType::Vector,
            found: ValueType::Real,
            ..
        }
    ));
    assert!(DynamicNode::check_type(ValueType::Vector));
    assert!(!DynamicNode::check_type(ValueType::Angle));
}

#[test]
fn evaluating_zero_is_idempotent() {
    let node = node_at(10.0, 0.0);
    let a = node.evaluate(Time::ZERO).unwrap();
    let b = node.evaluate(Time::ZERO).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, Vec2::new(10.0, 0.0));
    assert_eq!(node.last_time(), Time::ZERO);
}

#[test]
fn undisturbed_tip_stays_in_equilibrium() {
    let node = node_at(10.0, 0.0);
    for t in [0.5, 1.0, 2.0, 5.0] {
        let v = node.evaluate(Time(t)).unwrap();
        assert!(approx(v, Vec2::new(10.0, 0.0), 1e-9), "t={t}: {v:?}");
    }
    assert_eq!(node.last_time(), Time(5.0));
}

#[test]
fn same_query_sequence_is_deterministic() {
    let run = || {
        let mut node = node_at(4.0, 1.0);
        node.set_link(2, ConstNode::handle(Vec2::new(0.0, -2.0)))
            .unwrap();
        node
    };
    let (a, b) = (run(), run());
    for t in [0.25, 1.0, 0.5, 3.0] {
        assert_eq!(a.evaluate(Time(t)).unwrap(), b.evaluate(Time(t)).unwrap());
    }
    assert_eq!(a.state(), b.state());
}

#[test]
fn rewind_matches_a_fresh_node() {
    let build = || {
        let mut node = node_at(6.0, 0.0);
        node.set_link(2, ConstNode::handle(Vec2::new(1.0, 3.0))).unwrap();
        node
    };
    let played = build();
    for t in [0.5, 1.0, 2.0, 3.0] {
        played.evaluate(Time(t)).unwrap();
    }
    let rewound = played.evaluate(Time(1.0)).unwrap();

    let fresh = build();
    assert_eq!(rewound, fresh.evaluate(Time(1.0)).unwrap());
    assert_eq!(played.state(), fresh.state());
    assert_eq!(played.last_time(), Time(1.0));
}

#[test]
fn incremental_and_direct_queries_agree_closely() {
    let build = || {
        let mut node = node_at(6.0, 0.0);
        node.set_link(2, ConstNode::handle(Vec2::new(0.0, 2.0))).unwrap();
        node
    };
    let stepped = build();
    let mut last = Vec2::ZERO;
    for i in 1..=20 {
        last = stepped.evaluate(Time(i as f64 * 0.1)).unwrap();
    }
    let direct = build().evaluate(Time(2.0)).unwrap();
    assert!(approx(last, direct, 1e-3), "{last:?} vs {direct:?}");
}

#[test]
fn constant_force_moves_the_tip_toward_a_new_balance() {
    let mut node = node_at(10.0, 0.0);
    node.set_link(2, ConstNode::handle(Vec2::new(2.0, 0.0))).unwrap();
    node.set_link_by_name("damping", ConstNode::handle(4.0)).unwrap();
    let v = node.evaluate(Time(60.0)).unwrap();
    // The radial spring (k = 1) settles where it balances the force.
    assert!(approx(v, Vec2::new(12.0, 0.0), 1e-3), "{v:?}");
}

#[test]
fn steady_sideways_force_stays_bounded() {
    let mut node = node_at(4.0, 1.0);
    node.set_link(2, ConstNode::handle(Vec2::new(0.0, -2.0))).unwrap();
    for i in 1..=50 {
        let t = i as f64 * 0.1;
        let v = node.evaluate(Time(t)).unwrap();
        let [r, r_dot, _, theta_dot] = node.state();
        assert!(v.hypot() < 12.0, "t={t}: {v:?}");
        assert!(
            r < 12.0 && r_dot.abs() < 20.0 && theta_dot.abs() < 5.0,
            "t={t}: {:?}",
            node.state()
        );
    }
}

#[test]
fn edits_to_a_linked_constant_are_seen_on_the_next_call() {
    let tip = Rc::new(ConstNode::new(Vec2::new(10.0, 0.0)));
    let mut node = node_at(0.0, 0.0);
    node.set_link(0, tip.clone()).unwrap();

    let before = node.evaluate(Time(1.0)).unwrap();
    assert!(approx(before, Vec2::new(10.0, 0.0), 1e-9));

    tip.set_value(Vec2::new(12.0, 0.0)).unwrap();
    let after = node.evaluate(Time(2.0)).unwrap();
    assert!(after.x > 10.0 && after.x < 12.0, "{after:?}");
}

#[test]
fn origin_translation_carries_the_tip() {
    let mut node = node_at(10.0, 0.0);
    let origin = AnimatedNode::vector(Anim::constant(Vec2::new(5.0, 5.0))).unwrap();
    node.set_link(1, origin.into_handle()).unwrap();
    let tip = ConstNode::handle(Vec2::new(15.0, 5.0));
    node.set_link(0, tip).unwrap();
    let v = node.evaluate(Time(1.0)).unwrap();
    assert!(approx(v, Vec2::new(15.0, 5.0), 1e-9), "{v:?}");
}

#[test]
fn negative_time_answers_with_the_rest_offset() {
    let mut node = node_at(10.0, 0.0);
    let origin = AnimatedNode::vector(Anim::linear([
        (-1.0, Vec2::new(-4.0, 0.0)),
        (1.0, Vec2::new(4.0, 0.0)),
    ]))
    .unwrap();
    node.set_link(1, origin.into_handle()).unwrap();
    node.set_link(0, ConstNode::handle(Vec2::new(10.0, 0.0))).unwrap();

    let state = node.state();
    let v = node.evaluate(Time(-1.0)).unwrap();
    assert!(approx(v, Vec2::new(6.0, 0.0), 1e-9), "{v:?}");
    assert_eq!(node.last_time(), Time::ZERO);
    assert_eq!(node.state(), state);
}

#[test]
fn non_finite_time_is_rejected_without_touching_the_cache() {
    let node = node_at(1.0, 1.0);
    node.evaluate(Time(0.5)).unwrap();
    let state = node.state();
    for t in [f64::NAN, f64::INFINITY] {
        assert!(matches!(node.evaluate(Time(t)), Err(SimError::Validation(_))));
    }
    assert_eq!(node.state(), state);
    assert_eq!(node.last_time(), Time(0.5));
}

#[test]
fn degenerate_mass_fails_and_keeps_the_cache() {
    let mut node = node_at(10.0, 0.0);
    node.set_link(2, ConstNode::handle(Vec2::new(0.0, 1.0))).unwrap();
    node.evaluate(Time(1.0)).unwrap();
    let state = node.state();

    node.set_link_by_name("mass", ConstNode::handle(0.0)).unwrap();
    assert!(matches!(
        node.evaluate(Time(2.0)),
        Err(SimError::Computation(_))
    ));
    assert_eq!(node.state(), state);
    assert_eq!(node.last_time(), Time(1.0));

    node.set_link_by_name("inertia", ConstNode::handle(-1.0)).unwrap();
    node.set_link_by_name("mass", ConstNode::handle(1.0)).unwrap();
    assert!(matches!(
        node.evaluate(Time(2.0)),
        Err(SimError::Computation(_))
    ));
    assert_eq!(node.last_time(), Time(1.0));
}

#[test]
fn links_are_typed_and_bounded() {
    let mut node = node_at(1.0, 0.0);
    assert_eq!(node.link_count(), 9);
    assert_eq!(node.link_index("tip_static"), Some(0));
    assert_eq!(node.link_index("inertia"), Some(8));
    assert_eq!(node.vocab()[3].local_name, "Damping coefficient");

    let mass = node.link(7).unwrap();
    let err = node
        .set_link(7, ConstNode::handle(Vec2::new(1.0, 1.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::TypeMismatch {
            expected: ValueType::Real,
            found: ValueType::Vector,
            ..
        }
    ));
    assert!(Rc::ptr_eq(&mass, &node.link(7).unwrap()));

    assert!(matches!(
        node.set_link(1, ConstNode::handle(2.0)),
        Err(SimError::TypeMismatch { .. })
    ));
    assert!(matches!(
        node.set_link(9, ConstNode::handle(2.0)),
        Err(SimError::Link(_))
    ));
    assert!(matches!(
        node.set_link_by_name("stiffness", ConstNode::handle(2.0)),
        Err(SimError::Link(_))
    ));
    assert!(node.link(9).is_none());
}

#[test]
fn create_new_restores_defaults() {
    let mut node = node_at(3.0, 0.0);
    node.set_link_by_name("spring", ConstNode::handle(9.0)).unwrap();
    let fresh = node.create_new().unwrap();
    let spring = fresh.link_by_name("spring").unwrap();
    assert_eq!(spring.value_at(Time::ZERO).unwrap(), Value::Real(1.0));
    assert_eq!(fresh.state(), [0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn reset_forgets_the_simulation() {
    let mut node = node_at(10.0, 0.0);
    node.set_link(2, ConstNode::handle(Vec2::new(0.0, 5.0))).unwrap();
    node.evaluate(Time(1.0)).unwrap();
    node.reset().unwrap();
    assert_eq!(node.last_time(), Time::ZERO);
    assert_eq!(node.state(), [10.0, 0.0, 0.0, 0.0]);
}

#[test]
fn diagnostics_report_each_branch() {
    let sink = Rc::new(MemorySink::new());
    let mut node = node_at(10.0, 0.0).with_diagnostics(sink.clone());
    node.set_link(2, ConstNode::handle(Vec2::new(0.0, 1.0))).unwrap();

    node.evaluate(Time::ZERO).unwrap();
    node.evaluate(Time(1.0)).unwrap();
    node.evaluate(Time(0.5)).unwrap();
    node.evaluate(Time(-1.0)).unwrap();
    let _ = node.evaluate(Time(f64::NAN));

    let events = sink.events();
    let branches: Vec<_> = events.iter().map(|e| e.branch).collect();
    assert_eq!(
        branches,
        [
            EvalBranch::ColdStart,
            EvalBranch::Forward,
            EvalBranch::Rewind,
            EvalBranch::PreRoll,
            EvalBranch::Forward,
        ]
    );
    assert!(events[1].steps > 0);
    assert_eq!(events[2].from, Time::ZERO);
    assert_eq!(events[3].steps, 0);
    assert!(matches!(events[4].outcome, EvalOutcome::Failed(_)));

    node.set_diagnostics(None);
    node.evaluate(Time(2.0)).unwrap();
    assert_eq!(sink.len(), 5);
}

#[test]
fn re_entrant_evaluation_is_an_error() {
    let echo = Rc::new(Echo {
        target: RefCell::new(None),
    });
    let mut node = node_at(10.0, 0.0);
    node.set_link(2, echo.clone()).unwrap();
    let node = Rc::new(node);
    *echo.target.borrow_mut() = Some(Rc::downgrade(&node));

    assert!(matches!(
        node.evaluate(Time(1.0)),
        Err(SimError::Computation(_))
    ));
    assert_eq!(node.last_time(), Time::ZERO);
}

#[test]
fn feeds_other_nodes_as_a_vector() {
    let node = node_at(2.0, 0.0);
    assert_eq!(node.value_type(), ValueType::Vector);
    assert_eq!(node.name(), "dynamic");
    assert_eq!(node.local_name(), "Dynamic");
    let v = node.value_at(Time(0.5)).unwrap().as_vector("test").unwrap();
    assert!(approx(v, Vec2::new(2.0, 0.0), 1e-9));
}
