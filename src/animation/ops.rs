use crate::animation::anim::{Anim, Expr, LoopMode};

/// Start `inner` `by_secs` later.
pub fn delay<T>(inner: Anim<T>, by_secs: f64) -> Anim<T> {
    Anim::Expr(Expr::Delay {
        inner: Box::new(inner),
        by: by_secs,
    })
}

/// Play `inner` `factor` times faster.
pub fn speed<T>(inner: Anim<T>, factor: f64) -> Anim<T> {
    Anim::Expr(Expr::Speed {
        inner: Box::new(inner),
        factor,
    })
}

/// Play the first `duration_secs` of `inner` backwards.
pub fn reverse<T>(inner: Anim<T>, duration_secs: f64) -> Anim<T> {
    Anim::Expr(Expr::Reverse {
        inner: Box::new(inner),
        duration: duration_secs,
    })
}

/// Repeat the first `period_secs` of `inner`.
pub fn loop_<T>(inner: Anim<T>, period_secs: f64, mode: LoopMode) -> Anim<T> {
    Anim::Expr(Expr::Loop {
        inner: Box::new(inner),
        period: period_secs,
        mode,
    })
}

/// Blend `a` toward `b` by `t`.
pub fn mix<T>(a: Anim<T>, b: Anim<T>, t: Anim<f64>) -> Anim<T> {
    Anim::Expr(Expr::Mix {
        a: Box::new(a),
        b: Box::new(b),
        t: Box::new(t),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ops.rs"]
mod tests;
