//! The "dynamic" value node: a tip position driven by a damped spring/torsion
//! system attached to an animated origin.
//!
//! Evaluation is cached. Forward queries integrate from the last evaluated time;
//! a backward query replays the simulation from time 0 so the trajectory only
//! ever depends on the parameters and the sequence of forward queries.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    dynamics::{
        integrate::Dopri5,
        oscillator::{Oscillator, PhysicalLinks},
    },
    foundation::{
        core::{Time, Value, ValueType, Vec2},
        diagnostics::{DiagnosticSink, EvalBranch, EvalEvent, EvalOutcome},
        error::{SimError, SimResult},
        math::{all_finite, from_polar},
    },
    node::{
        derivative::DerivativeNode,
        linkable::{LinkableNode, ParamDesc, bad_index, check_link_type},
        value::{NodeHandle, ValueNode},
    },
};

static VOCAB: [ParamDesc; PhysicalLinks::COUNT] = [
    ParamDesc::new(
        "tip_static",
        "Tip static",
        "Equilibrium tip position without external forces",
    ),
    ParamDesc::new("origin", "Origin", "Basement of the dynamic system"),
    ParamDesc::new(
        "force",
        "Force",
        "External force applied on the mass center of gravity",
    ),
    ParamDesc::new(
        "damping",
        "Damping coefficient",
        "Radial damping coefficient of the dynamic system",
    ),
    ParamDesc::new(
        "friction",
        "Friction coefficient",
        "Rotational friction coefficient of the dynamic system",
    ),
    ParamDesc::new(
        "spring",
        "Spring coefficient",
        "Radial spring coefficient of the dynamic system",
    ),
    ParamDesc::new(
        "torsion",
        "Torsion coefficient",
        "Torsion coefficient of the dynamic system",
    ),
    ParamDesc::new("mass", "Mass", "Mass of the dynamic system"),
    ParamDesc::new(
        "inertia",
        "Moment of inertia",
        "Moment of inertia of the dynamic system",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq)]
struct Simulation {
    state: [f64; 4],
    last_time: Time,
}

/// Tip position of a mass on a damped radial spring and torsion spring.
///
/// The simulation memory (`state`, `last_time`) lives in a [`Cell`], so a node
/// is `!Sync`: evaluation of one instance is confined to one thread.
pub struct DynamicNode {
    ty: ValueType,
    links: PhysicalLinks,
    origin_d: RefCell<DerivativeNode>,
    sim: Cell<Simulation>,
    solver: Dopri5,
    diagnostics: Option<Rc<dyn DiagnosticSink>>,
}

impl fmt::Debug for DynamicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicNode")
            .field("ty", &self.ty)
            .field("links", &self.links)
            .field("sim", &self.sim.get())
            .field("solver", &self.solver)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl DynamicNode {
    /// Node whose static tip is `value`, with default physical parameters.
    ///
    /// Only vector values are accepted.
    pub fn new(value: &Value) -> SimResult<Self> {
        if !Self::check_type(value.value_type()) {
            return Err(SimError::type_mismatch(
                "dynamic node",
                ValueType::Vector,
                value.value_type(),
            ));
        }
        let tip = value.as_vector("dynamic node")?;
        let links = PhysicalLinks::with_tip(tip);

        let mut origin_d = DerivativeNode::new(&Value::Vector(Vec2::ZERO))?;
        origin_d.set_link(0, links.origin.clone())?;

        let state = links.rest_state(Time::ZERO)?;
        Ok(Self {
            ty: value.value_type(),
            links,
            origin_d: RefCell::new(origin_d),
            sim: Cell::new(Simulation {
                state,
                last_time: Time::ZERO,
            }),
            solver: Dopri5::default(),
            diagnostics: None,
        })
    }

    /// Output types a dynamic node can produce.
    pub fn check_type(ty: ValueType) -> bool {
        ty == ValueType::Vector
    }

    /// Fresh node of the same type with default links.
    pub fn create_new(&self) -> SimResult<Self> {
        Self::new(&Value::zero(self.ty))
    }

    /// Attach a sink receiving one event per evaluation.
    pub fn with_diagnostics(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Attach or detach the diagnostic sink.
    pub fn set_diagnostics(&mut self, sink: Option<Rc<dyn DiagnosticSink>>) {
        self.diagnostics = sink;
    }

    /// Use a differently configured integrator.
    pub fn with_solver(mut self, solver: Dopri5) -> Self {
        self.solver = solver;
        self
    }

    /// Cached `[radius, radius_velocity, angle, angle_velocity]`.
    pub fn state(&self) -> [f64; 4] {
        self.sim.get().state
    }

    /// Time the cached state belongs to.
    pub fn last_time(&self) -> Time {
        self.sim.get().last_time
    }

    /// Cached tip offset from the origin.
    pub fn tip_offset(&self) -> Vec2 {
        let state = self.sim.get().state;
        from_polar(state[0], state[2])
    }

    /// Drop the simulation memory and return to the rest configuration at time 0.
    pub fn reset(&self) -> SimResult<()> {
        let state = self.links.rest_state(Time::ZERO)?;
        self.sim.set(Simulation {
            state,
            last_time: Time::ZERO,
        });
        Ok(())
    }

    /// Tip position at `t`.
    ///
    /// On error the cached state and time are left as they were.
    #[tracing::instrument(level = "trace", skip_all, fields(t = t.0))]
    pub fn evaluate(&self, t: Time) -> SimResult<Vec2> {
        let mut event = EvalEvent {
            node: "dynamic",
            time: t,
            from: self.sim.get().last_time,
            branch: EvalBranch::Forward,
            steps: 0,
            outcome: EvalOutcome::Value(Vec2::ZERO),
        };
        let result = self.advance(t, &mut event);
        if let Some(sink) = &self.diagnostics {
            event.outcome = match &result {
                Ok(v) => EvalOutcome::Value(*v),
                Err(err) => EvalOutcome::Failed(err.to_string()),
            };
            sink.record(&event);
        }
        result
    }

    fn advance(&self, t: Time, event: &mut EvalEvent) -> SimResult<Vec2> {
        if !t.is_finite() {
            return Err(SimError::validation(format!(
                "evaluation time must be finite, got {}",
                t.0
            )));
        }

        let cached = self.sim.get();
        if t.0 == 0.0 && cached.last_time.0 == 0.0 {
            event.branch = EvalBranch::ColdStart;
            event.from = Time::ZERO;
            let state = self.links.rest_state(Time::ZERO)?;
            let value = self.output(Time::ZERO, &state)?;
            self.sim.set(Simulation {
                state,
                last_time: Time::ZERO,
            });
            return Ok(value);
        }

        let rewind = t.0 < cached.last_time.0 && cached.last_time.0 > 0.0;
        let t0 = if rewind { Time::ZERO } else { cached.last_time };
        if rewind {
            event.branch = EvalBranch::Rewind;
        }
        event.from = t0;
        // At time 0 the state is always the rest configuration of the current links.
        let state = if t0.0 == 0.0 {
            self.links.rest_state(Time::ZERO)?
        } else {
            cached.state
        };

        if t.0 < t0.0 {
            // Before the simulation starts the tip rests at its time-0 offset.
            event.branch = EvalBranch::PreRoll;
            let value = self.output(t, &state)?;
            if rewind {
                self.sim.set(Simulation {
                    state,
                    last_time: Time::ZERO,
                });
            }
            return Ok(value);
        }

        self.sync_origin_derivative()?;
        let origin_d = self.origin_d.try_borrow().map_err(|_| reentrant())?;
        let oscillator = Oscillator::new(&self.links, &origin_d);
        let step_hint = (t.0 - t0.0) / 4.0;
        let run = self
            .solver
            .integrate(&oscillator, state, t0.0, t.0, step_hint)?;
        event.steps = run.steps;
        tracing::debug!(from = t0.0, to = t.0, steps = run.steps, "integrated");

        let value = self.output(t, &run.state)?;
        self.sim.set(Simulation {
            state: run.state,
            last_time: t,
        });
        Ok(value)
    }

    // The helper must always differentiate the origin that is linked right now.
    fn sync_origin_derivative(&self) -> SimResult<()> {
        let mut origin_d = self.origin_d.try_borrow_mut().map_err(|_| reentrant())?;
        origin_d.set_link(0, self.links.origin.clone())
    }

    fn output(&self, t: Time, state: &[f64; 4]) -> SimResult<Vec2> {
        let value = self.links.origin_at(t)? + from_polar(state[0], state[2]);
        if !all_finite(&[value.x, value.y]) {
            return Err(SimError::computation(format!(
                "tip position at t={} is not finite",
                t.0
            )));
        }
        Ok(value)
    }
}

fn reentrant() -> SimError {
    SimError::computation("dynamic node evaluated re-entrantly through its own links")
}

impl ValueNode for DynamicNode {
    fn value_type(&self) -> ValueType {
        self.ty
    }

    fn value_at(&self, t: Time) -> SimResult<Value> {
        self.evaluate(t).map(Value::Vector)
    }

    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn local_name(&self) -> &'static str {
        "Dynamic"
    }
}

impl LinkableNode for DynamicNode {
    fn vocab(&self) -> &'static [ParamDesc] {
        &VOCAB
    }

    fn link(&self, index: usize) -> Option<NodeHandle> {
        self.links.get(index).cloned()
    }

    fn set_link(&mut self, index: usize, node: NodeHandle) -> SimResult<()> {
        let expected = match index {
            0 => self.ty,
            1 | 2 => ValueType::Vector,
            3..=8 => ValueType::Real,
            _ => return Err(bad_index(self.name(), index, VOCAB.len())),
        };
        check_link_type(self.name(), &VOCAB[index], expected, &node)?;
        let slot = self
            .links
            .slot_mut(index)
            .ok_or_else(|| bad_index("dynamic", index, VOCAB.len()))?;
        *slot = node;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dynamics/dynamic.rs"]
mod tests;
