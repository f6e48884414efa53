use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Vec2 {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Vec2 {
    pub(crate) const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub(crate) fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
    pub(crate) fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp1 = |x: u8, y: u8| -> u8 {
            (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: lerp1(a.r, b.r),
            g: lerp1(a.g, b.g),
            b: lerp1(a.b, b.b),
        }
    }
}

/// Per-frame ball descriptor. Value data, rebuilt every frame from the
/// active driver; offset is relative to the canvas center.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ball {
    pub(crate) offset: Vec2,
    pub(crate) diameter: f32,
}

impl Ball {
    pub(crate) fn new(offset: Vec2, diameter: f32, min_diameter: f32) -> Self {
        Self {
            offset,
            diameter: diameter.max(min_diameter.max(f32::EPSILON)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Single,
    Clubbed,
}

impl Mode {
    pub(crate) fn next(self) -> Self {
        match self {
            Mode::Single => Mode::Clubbed,
            Mode::Clubbed => Mode::Single,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Curve {
    EaseOutCubic,
    /// Damped-spring settle toward the target, shaped by the response
    /// period (seconds) and damping fraction of the original gesture.
    Spring { response: f32, damping: f32 },
}

impl Curve {
    fn progress(self, elapsed: f32, duration: f32) -> f32 {
        match self {
            Curve::EaseOutCubic => {
                let t = (elapsed / duration).clamp(0.0, 1.0);
                1.0 - (1.0 - t).powi(3)
            }
            Curve::Spring { response, damping } => {
                let omega = TAU / response.max(1e-3);
                let zeta = damping.clamp(0.0, 0.999);
                let wd = omega * (1.0 - zeta * zeta).sqrt();
                let decay = (-zeta * omega * elapsed).exp();
                let p = 1.0 - decay * ((wd * elapsed).cos() + (zeta * omega / wd) * (wd * elapsed).sin());
                if elapsed >= duration {
                    1.0
                } else {
                    p
                }
            }
        }
    }
}

/// A scalar in flight between two values. Retargeting starts a new
/// transition from wherever the old one currently is; the newest target
/// always wins.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Eased {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    curve: Curve,
}

impl Eased {
    pub(crate) fn fixed(v: f32) -> Self {
        Self {
            from: v,
            to: v,
            elapsed: 0.0,
            duration: 0.0,
            curve: Curve::EaseOutCubic,
        }
    }

    pub(crate) fn value(&self) -> f32 {
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return self.to;
        }
        let p = self.curve.progress(self.elapsed, self.duration);
        self.from + (self.to - self.from) * p
    }

    pub(crate) fn snap(&mut self, v: f32) {
        *self = Self::fixed(v);
    }

    pub(crate) fn retarget(&mut self, to: f32, duration: f32, curve: Curve) {
        let from = self.value();
        if duration <= 0.0 {
            *self = Self::fixed(to);
            return;
        }
        *self = Self {
            from,
            to,
            elapsed: 0.0,
            duration,
            curve,
        };
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct EasedVec2 {
    pub(crate) x: Eased,
    pub(crate) y: Eased,
}

impl EasedVec2 {
    pub(crate) fn fixed(v: Vec2) -> Self {
        Self {
            x: Eased::fixed(v.x),
            y: Eased::fixed(v.y),
        }
    }
    pub(crate) fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }
    pub(crate) fn snap(&mut self, v: Vec2) {
        self.x.snap(v.x);
        self.y.snap(v.y);
    }
    pub(crate) fn retarget(&mut self, to: Vec2, duration: f32, curve: Curve) {
        self.x.retarget(to.x, duration, curve);
        self.y.retarget(to.y, duration, curve);
    }
    pub(crate) fn advance(&mut self, dt: f32) {
        self.x.advance(dt);
        self.y.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ease_out_hits_both_endpoints() {
        let mut e = Eased::fixed(2.0);
        e.retarget(10.0, 1.0, Curve::EaseOutCubic);
        assert_abs_diff_eq!(e.value(), 2.0, epsilon = 1e-6);
        e.advance(1.0);
        assert_abs_diff_eq!(e.value(), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn ease_out_is_monotone() {
        let mut e = Eased::fixed(0.0);
        e.retarget(1.0, 1.0, Curve::EaseOutCubic);
        let mut prev = e.value();
        for _ in 0..50 {
            e.advance(0.02);
            let v = e.value();
            assert!(v >= prev - 1e-6);
            prev = v;
        }
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut e = Eased::fixed(0.0);
        e.retarget(100.0, 1.0, Curve::EaseOutCubic);
        e.advance(0.5);
        let mid = e.value();
        assert!(mid > 0.0 && mid < 100.0);
        e.retarget(0.0, 1.0, Curve::EaseOutCubic);
        assert_abs_diff_eq!(e.value(), mid, epsilon = 1e-4);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut e = Eased::fixed(1.0);
        e.retarget(5.0, 0.0, Curve::EaseOutCubic);
        assert_abs_diff_eq!(e.value(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn spring_settles_on_target() {
        let mut e = Eased::fixed(50.0);
        e.retarget(
            0.0,
            1.8,
            Curve::Spring {
                response: 0.6,
                damping: 0.7,
            },
        );
        e.advance(1.8);
        assert_abs_diff_eq!(e.value(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn ball_diameter_is_clamped_positive() {
        let b = Ball::new(Vec2::ZERO, -10.0, 1.0);
        assert!(b.diameter >= 1.0);
    }
}
