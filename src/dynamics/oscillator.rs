//! Damped radial spring plus torsion spring around a moving origin.
//!
//! The tip sits at polar offset `(r, θ)` from the origin. The radial spring and
//! the torsion spring pull it toward the rest offset `tip_static - origin`.
//! Damping and friction act on the tip's velocity relative to still air, so a
//! translating origin drags the tip along; the origin's acceleration enters as
//! the inertial pseudo-force of the translating frame. The external force is
//! projected onto the radial and tangential directions.

use crate::{
    dynamics::integrate::OdeSystem,
    foundation::{
        core::{Time, Vec2},
        error::{SimError, SimResult},
        math::{all_finite, nearest_branch, to_polar},
    },
    node::{
        constant::ConstNode,
        derivative::{DerivativeNode, Order},
        value::{NodeHandle, real_at, vector_at},
    },
};

// Below this radius the tangential part of the origin velocity has no
// well-defined angular rate.
const MIN_ARM: f64 = 1e-12;

/// The nine parameter links of a dynamic node, in link order.
#[derive(Clone, Debug)]
pub(crate) struct PhysicalLinks {
    pub(crate) tip_static: NodeHandle,
    pub(crate) origin: NodeHandle,
    pub(crate) force: NodeHandle,
    pub(crate) damping: NodeHandle,
    pub(crate) friction: NodeHandle,
    pub(crate) spring: NodeHandle,
    pub(crate) torsion: NodeHandle,
    pub(crate) mass: NodeHandle,
    pub(crate) inertia: NodeHandle,
}

impl PhysicalLinks {
    pub(crate) const COUNT: usize = 9;

    pub(crate) fn with_tip(tip: Vec2) -> Self {
        Self {
            tip_static: ConstNode::handle(tip),
            origin: ConstNode::handle(Vec2::ZERO),
            force: ConstNode::handle(Vec2::ZERO),
            damping: ConstNode::handle(0.1),
            friction: ConstNode::handle(0.1),
            spring: ConstNode::handle(1.0),
            torsion: ConstNode::handle(1.0),
            mass: ConstNode::handle(1.0),
            inertia: ConstNode::handle(1.0),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&NodeHandle> {
        Some(match index {
            0 => &self.tip_static,
            1 => &self.origin,
            2 => &self.force,
            3 => &self.damping,
            4 => &self.friction,
            5 => &self.spring,
            6 => &self.torsion,
            7 => &self.mass,
            8 => &self.inertia,
            _ => return None,
        })
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut NodeHandle> {
        Some(match index {
            0 => &mut self.tip_static,
            1 => &mut self.origin,
            2 => &mut self.force,
            3 => &mut self.damping,
            4 => &mut self.friction,
            5 => &mut self.spring,
            6 => &mut self.torsion,
            7 => &mut self.mass,
            8 => &mut self.inertia,
            _ => return None,
        })
    }

    pub(crate) fn origin_at(&self, t: Time) -> SimResult<Vec2> {
        vector_at(self.origin.as_ref(), t, "dynamic link 'origin'")
    }

    /// `tip_static - origin` at `t`.
    pub(crate) fn rest_offset(&self, t: Time) -> SimResult<Vec2> {
        let tip = vector_at(self.tip_static.as_ref(), t, "dynamic link 'tip_static'")?;
        Ok(tip - self.origin_at(t)?)
    }

    /// Rest configuration at `t`: rest offset in polar form, zero velocities.
    pub(crate) fn rest_state(&self, t: Time) -> SimResult<[f64; 4]> {
        let (radius, angle) = to_polar(self.rest_offset(t)?);
        let state = [radius, 0.0, angle, 0.0];
        if !all_finite(&state) {
            return Err(SimError::computation(format!(
                "rest configuration at t={} is not finite",
                t.0
            )));
        }
        Ok(state)
    }

    /// Every parameter sampled at `t`, with the origin's motion taken from `origin_d`.
    pub(crate) fn sample(&self, t: Time, origin_d: &DerivativeNode) -> SimResult<OscillatorParams> {
        let params = OscillatorParams {
            rest_offset: self.rest_offset(t)?,
            force: vector_at(self.force.as_ref(), t, "dynamic link 'force'")?,
            damping: real_at(self.damping.as_ref(), t, "dynamic link 'damping'")?,
            friction: real_at(self.friction.as_ref(), t, "dynamic link 'friction'")?,
            spring: real_at(self.spring.as_ref(), t, "dynamic link 'spring'")?,
            torsion: real_at(self.torsion.as_ref(), t, "dynamic link 'torsion'")?,
            mass: real_at(self.mass.as_ref(), t, "dynamic link 'mass'")?,
            inertia: real_at(self.inertia.as_ref(), t, "dynamic link 'inertia'")?,
            origin_velocity: origin_d
                .derivative_at(t, Order::First)?
                .as_vector("origin velocity")?,
            origin_acceleration: origin_d
                .derivative_at(t, Order::Second)?
                .as_vector("origin acceleration")?,
        };
        params.check(t)?;
        Ok(params)
    }
}

/// Physical parameters frozen at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorParams {
    /// `tip_static - origin`.
    pub rest_offset: Vec2,
    /// External force on the tip.
    pub force: Vec2,
    /// Radial damping coefficient.
    pub damping: f64,
    /// Angular friction coefficient.
    pub friction: f64,
    /// Radial spring coefficient.
    pub spring: f64,
    /// Torsion spring coefficient.
    pub torsion: f64,
    /// Tip mass, > 0.
    pub mass: f64,
    /// Moment of inertia of the arm about the origin, > 0; the tip's `mass r²` is added on top.
    pub inertia: f64,
    /// Origin velocity.
    pub origin_velocity: Vec2,
    /// Origin acceleration.
    pub origin_acceleration: Vec2,
}

impl OscillatorParams {
    /// Reject degenerate or non-finite parameters.
    pub fn check(&self, t: Time) -> SimResult<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SimError::computation(format!(
                "mass must be positive and finite at t={}, got {}",
                t.0, self.mass
            )));
        }
        if !(self.inertia.is_finite() && self.inertia > 0.0) {
            return Err(SimError::computation(format!(
                "inertia must be positive and finite at t={}, got {}",
                t.0, self.inertia
            )));
        }
        let scalars = [
            self.rest_offset.x,
            self.rest_offset.y,
            self.force.x,
            self.force.y,
            self.damping,
            self.friction,
            self.spring,
            self.torsion,
            self.origin_velocity.x,
            self.origin_velocity.y,
            self.origin_acceleration.x,
            self.origin_acceleration.y,
        ];
        if !all_finite(&scalars) {
            return Err(SimError::computation(format!(
                "non-finite physical parameter at t={}",
                t.0
            )));
        }
        Ok(())
    }

    /// `[dr/dt, d²r/dt², dθ/dt, d²θ/dt²]` for state `[r, ṙ, θ, θ̇]`.
    pub fn derivative(&self, state: &[f64; 4]) -> SimResult<[f64; 4]> {
        let [r, r_dot, theta, theta_dot] = *state;

        let e_r = Vec2::from_angle(theta);
        let e_t = Vec2::new(-e_r.y, e_r.x);

        let (rest_r, rest_theta) = to_polar(self.rest_offset);
        let rest_theta = nearest_branch(rest_theta, theta);

        let v_r = self.origin_velocity.dot(e_r);
        let v_t = self.origin_velocity.dot(e_t);
        let omega_o = if r.abs() > MIN_ARM { v_t / r } else { 0.0 };

        let f_r = self.force.dot(e_r) - self.mass * self.origin_acceleration.dot(e_r);
        let f_t = self.force.dot(e_t) - self.mass * self.origin_acceleration.dot(e_t);

        let r_ddot = (-self.spring * (r - rest_r) - self.damping * (r_dot + v_r) + f_r)
            / self.mass
            + r * theta_dot * theta_dot;
        // The tip is a point mass on the arm: its own r² adds to the rigid inertia.
        let coriolis = 2.0 * self.mass * r * r_dot * theta_dot;
        let theta_ddot = (-self.torsion * (theta - rest_theta)
            - self.friction * (theta_dot + omega_o)
            + r * f_t
            - coriolis)
            / (self.inertia + self.mass * r * r);

        let out = [r_dot, r_ddot, theta_dot, theta_ddot];
        if !all_finite(&out) {
            return Err(SimError::computation(format!(
                "non-finite derivative for state {state:?}"
            )));
        }
        Ok(out)
    }
}

/// The derivative field over live links, sampled at each requested time.
pub(crate) struct Oscillator<'a> {
    links: &'a PhysicalLinks,
    origin_d: &'a DerivativeNode,
}

impl<'a> Oscillator<'a> {
    pub(crate) fn new(links: &'a PhysicalLinks, origin_d: &'a DerivativeNode) -> Self {
        Self { links, origin_d }
    }
}

impl OdeSystem<4> for Oscillator<'_> {
    fn rhs(&self, t: f64, y: &[f64; 4]) -> SimResult<[f64; 4]> {
        self.links.sample(Time(t), self.origin_d)?.derivative(y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dynamics/oscillator.rs"]
mod tests;
