use std::{fs::File, io::BufReader, path::Path};

use crate::{
    animation::anim::Anim,
    dynamics::{
        dynamic::DynamicNode,
        integrate::{Dopri5, Tolerances},
    },
    foundation::{
        core::{Time, Value, Vec2},
        error::{SimError, SimResult},
    },
    node::{
        animated::AnimatedNode,
        constant::ConstNode,
        linkable::LinkableNode,
        value::NodeHandle,
    },
};

/// A parameter given either as a bare constant or as an animation curve.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Param<T> {
    /// Same value at every time.
    Constant(T),
    /// Time-varying curve.
    Animated(Anim<T>),
}

impl Param<f64> {
    fn handle(&self) -> SimResult<NodeHandle> {
        Ok(match self {
            Self::Constant(v) => ConstNode::handle(*v),
            Self::Animated(anim) => AnimatedNode::real(anim.clone())?.into_handle(),
        })
    }
}

impl Param<Vec2> {
    fn handle(&self) -> SimResult<NodeHandle> {
        Ok(match self {
            Self::Constant(v) => ConstNode::handle(*v),
            Self::Animated(anim) => AnimatedNode::vector(anim.clone())?.into_handle(),
        })
    }

    fn at_zero(&self) -> SimResult<Vec2> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Animated(anim) => anim.sample(Time::ZERO),
        }
    }
}

/// Physical parameters; omitted entries keep the node defaults.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneParams {
    /// Basement of the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Param<Vec2>>,
    /// External force on the tip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<Param<Vec2>>,
    /// Radial damping coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<Param<f64>>,
    /// Rotational friction coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<Param<f64>>,
    /// Radial spring coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spring: Option<Param<f64>>,
    /// Torsion coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torsion: Option<Param<f64>>,
    /// Mass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<Param<f64>>,
    /// Moment of inertia.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<Param<f64>>,
}

impl SceneParams {
    fn vectors(&self) -> [(&'static str, Option<&Param<Vec2>>); 2] {
        [("origin", self.origin.as_ref()), ("force", self.force.as_ref())]
    }

    fn reals(&self) -> [(&'static str, Option<&Param<f64>>); 6] {
        [
            ("damping", self.damping.as_ref()),
            ("friction", self.friction.as_ref()),
            ("spring", self.spring.as_ref()),
            ("torsion", self.torsion.as_ref()),
            ("mass", self.mass.as_ref()),
            ("inertia", self.inertia.as_ref()),
        ]
    }
}

/// Uniform sampling grid, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sampling {
    /// First sample time.
    #[serde(default)]
    pub start: f64,
    /// Last sample time (inclusive when it falls on the grid).
    #[serde(default = "default_end")]
    pub end: f64,
    /// Samples per second.
    #[serde(default = "default_fps")]
    pub fps: f64,
}

// Upper bound on the number of grid points a scene may request.
const MAX_SAMPLES: f64 = 1e7;

fn default_end() -> f64 {
    2.0
}

fn default_fps() -> f64 {
    24.0
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: default_end(),
            fps: default_fps(),
        }
    }
}

impl Sampling {
    /// Check that the grid is finite and non-empty.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.start.is_finite() && self.end.is_finite()) {
            return Err(SimError::validation("sampling start/end must be finite"));
        }
        if self.end < self.start {
            return Err(SimError::validation(format!(
                "sampling end ({}) must not precede start ({})",
                self.end, self.start
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(SimError::validation(format!(
                "sampling fps must be positive, got {}",
                self.fps
            )));
        }
        let count = (self.end - self.start) * self.fps;
        if count > MAX_SAMPLES {
            return Err(SimError::validation(format!(
                "sampling grid of {count:e} intervals exceeds the limit of {MAX_SAMPLES:e}"
            )));
        }
        Ok(())
    }

    /// Sample times `start + i / fps` up to `end`; call [`Sampling::validate`] first.
    pub fn times(&self) -> Vec<Time> {
        // Tolerate rounding so an `end` sitting on the grid is included.
        let count = ((self.end - self.start) * self.fps + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| Time(self.start + i as f64 / self.fps))
            .collect()
    }
}

/// One dynamic node plus how to sample it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Equilibrium tip position (`tip_static`).
    pub tip: Param<Vec2>,
    /// Physical parameters.
    #[serde(default)]
    pub params: SceneParams,
    /// Sampling grid used by the command-line tool.
    #[serde(default)]
    pub sampling: Sampling,
    /// Integrator tolerances; defaults to 1e-6 absolute and relative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerances: Option<Tolerances>,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SimResult<Self> {
        serde_json::from_reader(r).map_err(|e| SimError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json(s: &str) -> SimResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SimError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize back to pretty JSON.
    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimError::serde(format!("serialize scene JSON: {e}")))
    }

    /// Check curves, sampling and tolerances.
    pub fn validate(&self) -> SimResult<()> {
        if let Param::Animated(anim) = &self.tip {
            anim.validate()?;
        }
        for (name, param) in self.params.vectors() {
            if let Some(Param::Animated(anim)) = param {
                anim.validate()
                    .map_err(|e| SimError::validation(format!("param '{name}': {e}")))?;
            }
        }
        for (name, param) in self.params.reals() {
            if let Some(Param::Animated(anim)) = param {
                anim.validate()
                    .map_err(|e| SimError::validation(format!("param '{name}': {e}")))?;
            }
        }
        if let Some(tol) = self.tolerances {
            let ok = |v: f64| v.is_finite() && v > 0.0;
            if !(ok(tol.abs) && ok(tol.rel)) {
                return Err(SimError::validation(format!(
                    "tolerances must be positive, got abs={} rel={}",
                    tol.abs, tol.rel
                )));
            }
        }
        self.sampling.validate()
    }

    /// Validate, then build a dynamic node wired to the described parameters.
    pub fn build(&self) -> SimResult<DynamicNode> {
        self.validate()?;
        let mut node = DynamicNode::new(&Value::Vector(self.tip.at_zero()?))?;
        node.set_link_by_name("tip_static", self.tip.handle()?)?;
        for (name, param) in self.params.vectors() {
            if let Some(param) = param {
                node.set_link_by_name(name, param.handle()?)?;
            }
        }
        for (name, param) in self.params.reals() {
            if let Some(param) = param {
                node.set_link_by_name(name, param.handle()?)?;
            }
        }
        if let Some(tol) = self.tolerances {
            node = node.with_solver(Dopri5::with_tolerances(tol));
        }
        // Links changed after construction; start from the wired rest configuration.
        node.reset()?;
        Ok(node)
    }

    /// Sample times of [`Scene::sampling`].
    pub fn sample_times(&self) -> Vec<Time> {
        self.sampling.times()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
