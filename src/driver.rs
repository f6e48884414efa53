use crate::config::Tuning;
use crate::model::{Ball, Curve, Eased, EasedVec2, Mode, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Single mode: one ball anchored at the center, one glued to the
/// pointer. Releasing the drag springs the loose ball back home, and
/// the two merge as they close in.
pub(crate) struct SingleDriver {
    offset: EasedVec2,
    diameter: f32,
    min_diameter: f32,
    release: Curve,
    release_duration: f32,
}

impl SingleDriver {
    pub(crate) fn new(tuning: &Tuning) -> Self {
        Self {
            offset: EasedVec2::fixed(Vec2::ZERO),
            diameter: tuning.ball_diameter,
            min_diameter: tuning.min_diameter,
            release: Curve::Spring {
                response: tuning.release_response,
                damping: tuning.release_damping,
            },
            // settle horizon; the spring is visually done well before this
            release_duration: tuning.release_response * 3.0,
        }
    }

    /// 1:1 follow while the pointer is down, no easing, no clamp.
    pub(crate) fn drag_move(&mut self, translation: Vec2) {
        self.offset.snap(translation);
    }

    pub(crate) fn drag_end(&mut self) {
        self.offset
            .retarget(Vec2::ZERO, self.release_duration, self.release);
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.offset.advance(dt);
    }

    pub(crate) fn offset(&self) -> Vec2 {
        self.offset.value()
    }

    pub(crate) fn balls(&self) -> Vec<Ball> {
        vec![
            Ball::new(Vec2::ZERO, self.diameter, self.min_diameter),
            Ball::new(self.offset.value(), self.diameter, self.min_diameter),
        ]
    }
}

struct ClubBall {
    offset: EasedVec2,
    diameter: Eased,
}

/// Clubbed mode: N balls re-rolled to random spots on a fixed cycle,
/// each gliding to its new target with an ease-out that finishes
/// before the next roll. A tap pauses everything in the neutral
/// fully-merged stack.
pub(crate) struct ClubbedDriver {
    balls: Vec<ClubBall>,
    animating: bool,
    tick_accum: f32,
    rng: StdRng,
    offset_x: (f32, f32),
    offset_y: (f32, f32),
    diameter: (f32, f32),
    paused_diameter: f32,
    tick_period: f32,
    move_duration: f32,
    min_diameter: f32,
}

impl ClubbedDriver {
    pub(crate) fn new(tuning: &Tuning, seed: u64) -> Self {
        let balls = (0..tuning.ball_count)
            .map(|_| ClubBall {
                offset: EasedVec2::fixed(Vec2::ZERO),
                diameter: Eased::fixed(tuning.paused_diameter),
            })
            .collect();
        let mut d = Self {
            balls,
            animating: true,
            tick_accum: 0.0,
            rng: StdRng::seed_from_u64(seed),
            offset_x: tuning.offset_x_range,
            offset_y: tuning.offset_y_range,
            diameter: tuning.diameter_range,
            paused_diameter: tuning.paused_diameter,
            tick_period: tuning.tick_period,
            move_duration: tuning.move_duration,
            min_diameter: tuning.min_diameter,
        };
        // first layout is already randomized, like the original's
        // timeline view on its first frame
        d.resample();
        d
    }

    pub(crate) fn animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn toggle_animation(&mut self) {
        self.animating = !self.animating;
        if !self.animating {
            for b in &mut self.balls {
                b.offset.snap(Vec2::ZERO);
                b.diameter.snap(self.paused_diameter);
            }
        } else {
            self.tick_accum = 0.0;
            self.resample();
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        for b in &mut self.balls {
            b.offset.advance(dt);
            b.diameter.advance(dt);
        }
        if !self.animating {
            return;
        }
        self.tick_accum += dt;
        while self.tick_accum >= self.tick_period {
            self.tick_accum -= self.tick_period;
            self.resample();
        }
    }

    fn resample(&mut self) {
        for b in &mut self.balls {
            let target = Vec2::new(
                self.rng.gen_range(self.offset_x.0..=self.offset_x.1),
                self.rng.gen_range(self.offset_y.0..=self.offset_y.1),
            );
            let d = self.rng.gen_range(self.diameter.0..=self.diameter.1);
            b.offset
                .retarget(target, self.move_duration, Curve::EaseOutCubic);
            b.diameter
                .retarget(d, self.move_duration, Curve::EaseOutCubic);
        }
    }

    pub(crate) fn balls(&self) -> Vec<Ball> {
        self.balls
            .iter()
            .map(|b| Ball::new(b.offset.value(), b.diameter.value(), self.min_diameter))
            .collect()
    }
}

/// The two modes keep disjoint state; entering a mode builds that
/// driver fresh, the same way the original re-creates its subview.
pub(crate) enum DriverState {
    Single(SingleDriver),
    Clubbed(ClubbedDriver),
}

impl DriverState {
    pub(crate) fn enter(mode: Mode, tuning: &Tuning, seed: u64) -> Self {
        match mode {
            Mode::Single => DriverState::Single(SingleDriver::new(tuning)),
            Mode::Clubbed => DriverState::Clubbed(ClubbedDriver::new(tuning, seed)),
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        match self {
            DriverState::Single(d) => d.advance(dt),
            DriverState::Clubbed(d) => d.advance(dt),
        }
    }

    pub(crate) fn balls(&self) -> Vec<Ball> {
        match self {
            DriverState::Single(d) => d.balls(),
            DriverState::Clubbed(d) => d.balls(),
        }
    }
}
