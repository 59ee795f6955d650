//! Easing curves mapping normalized time to normalized progress.
//!
//! See <https://easings.net> for plots of each curve. Back and elastic
//! variants overshoot `[0, 1]` mid-flight; all curves hit 0 and 1 at the ends.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Selectable easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    OutQuad,
    OutExpo,
    OutBounce,
    InOutBounce,
    OutElastic,
    InOutElastic,
    OutBack,
    InOutBack,
}

impl Easing {
    /// Every curve, in declaration order.
    pub const ALL: [Easing; 9] = [
        Easing::Linear,
        Easing::OutQuad,
        Easing::OutExpo,
        Easing::OutBounce,
        Easing::InOutBounce,
        Easing::OutElastic,
        Easing::InOutElastic,
        Easing::OutBack,
        Easing::InOutBack,
    ];

    /// Evaluate the curve at `t`.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::OutQuad => out_quad(t),
            Easing::OutExpo => out_expo(t),
            Easing::OutBounce => out_bounce(t),
            Easing::InOutBounce => in_out_bounce(t),
            Easing::OutElastic => out_elastic(t),
            Easing::InOutElastic => in_out_elastic(t),
            Easing::OutBack => out_back(t),
            Easing::InOutBack => in_out_back(t),
        }
    }

    /// Whether the curve may leave `[0, 1]` between the endpoints.
    pub fn overshoots(self) -> bool {
        matches!(
            self,
            Easing::OutElastic | Easing::InOutElastic | Easing::OutBack | Easing::InOutBack
        )
    }

    /// Whether progress never moves backwards. Bounce curves stay inside
    /// `[0, 1]` but dip between bounces.
    pub fn is_monotone(self) -> bool {
        matches!(self, Easing::Linear | Easing::OutQuad | Easing::OutExpo)
    }
}

fn out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

fn out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

fn out_bounce(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

fn in_out_bounce(t: f64) -> f64 {
    if t < 0.5 {
        (1.0 - out_bounce(1.0 - 2.0 * t)) / 2.0
    } else {
        (1.0 + out_bounce(2.0 * t - 1.0)) / 2.0
    }
}

fn out_elastic(t: f64) -> f64 {
    const C4: f64 = (2.0 * PI) / 3.0;

    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        2f64.powf(-10.0 * t) * ((10.0 * t - 0.75) * C4).sin() + 1.0
    }
}

fn in_out_elastic(t: f64) -> f64 {
    const C5: f64 = (2.0 * PI) / 4.5;

    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else if t < 0.5 {
        -(2f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
    } else {
        (2f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0 + 1.0
    }
}

fn out_back(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;

    1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
}

fn in_out_back(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C2: f64 = C1 * 1.525;

    if t < 0.5 {
        ((2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2)) / 2.0
    } else {
        ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
    }
}
