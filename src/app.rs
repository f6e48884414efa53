use crate::compositor::{composite, fill_gradient};
use crate::config::Tuning;
use crate::driver::DriverState;
use crate::input::{collect_actions, Action, Pointer};
use crate::model::{Ball, Mode, Vec2};
use crate::render::{canvas_to_cells, draw_hud, Terminal};
use crossterm::style::Color;
use std::time::{Duration, Instant};

pub(crate) struct App {
    tuning: Tuning,
    mode: Mode,
    driver: DriverState,
    term: Terminal,
    pointer: Pointer,
    show_hud: bool,
    should_quit: bool,
    frame: u64,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let tuning = Tuning::default();
        let mode = Mode::Single;
        let driver = DriverState::enter(mode, &tuning, 0);
        let term = Terminal::begin()?;
        Ok(Self {
            tuning,
            mode,
            driver,
            term,
            pointer: Pointer::default(),
            show_hud: true,
            should_quit: false,
            frame: 0,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.tuning.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        let mut last = Instant::now();
        let mut last_fps = Instant::now();
        let mut fps_smoothed = fps as f32;
        let mut frames = 0u32;

        while !self.should_quit {
            let actions = collect_actions(&mut self.pointer)?;
            for a in actions {
                self.apply(a);
            }

            let now = Instant::now();
            let dt = (now - last).as_secs_f32().min(0.05);
            last = now;
            self.driver.advance(dt);

            frames += 1;
            let window = (now - last_fps).as_secs_f32();
            if window >= 0.33 {
                fps_smoothed = fps_smoothed * 0.85 + (frames as f32 / window.max(1e-6)) * 0.15;
                frames = 0;
                last_fps = now;
            }

            self.render_frame(fps_smoothed)?;
            self.frame += 1;

            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        Ok(())
    }

    fn switch_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        // reseed from the frame counter so re-entering clubbed mode
        // does not replay the same layout
        self.driver = DriverState::enter(mode, &self.tuning, self.frame);
    }

    fn apply(&mut self, action: Action) {
        let scale = logical_scale(
            self.term.canvas.w as usize,
            self.term.canvas.h as usize,
            &self.tuning,
        );
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectMode(m) => self.switch_mode(m),
            Action::CycleMode => self.switch_mode(self.mode.next()),
            Action::ToggleHud => self.show_hud = !self.show_hud,
            Action::ToggleAnimation | Action::Tapped => {
                if let DriverState::Clubbed(d) = &mut self.driver {
                    d.toggle_animation();
                }
            }
            Action::DragMoved { dx_cells, dy_cells } => {
                if let DriverState::Single(d) = &mut self.driver {
                    // cells -> subpixels -> logical units
                    let t = Vec2::new(dx_cells as f32 * 2.0, dy_cells as f32 * 4.0).mul(1.0 / scale);
                    d.drag_move(t);
                }
            }
            Action::DragEnded => {
                if let DriverState::Single(d) = &mut self.driver {
                    d.drag_end();
                }
            }
            Action::Resized(w, h) => self.term.resize(w, h),
        }
    }

    fn render_frame(&mut self, fps: f32) -> anyhow::Result<()> {
        let pw = self.term.canvas.w as usize;
        let ph = self.term.canvas.h as usize;
        self.term.cur.clear(Color::Black);

        if pw > 0 && ph > 0 {
            let scale = logical_scale(pw, ph, &self.tuning);
            let balls = scale_balls(&self.driver.balls(), scale);
            let blur = match self.mode {
                Mode::Single => self.tuning.blur_radius_single,
                Mode::Clubbed => self.tuning.blur_radius_clubbed,
            } * scale;

            let field = composite(&balls, pw, ph, blur, self.tuning.alpha_threshold);
            self.term.canvas.clear();
            fill_gradient(
                &field,
                self.tuning.gradient_top,
                self.tuning.gradient_bottom,
                &mut self.term.canvas,
            );
            canvas_to_cells(&self.term.canvas, &mut self.term.cur, Color::Black);
        }

        if self.show_hud {
            let animating = match &self.driver {
                DriverState::Clubbed(d) => d.animating(),
                DriverState::Single(_) => true,
            };
            draw_hud(&mut self.term.cur, self.mode, animating, fps);
        }

        self.term.present()
    }
}

/// Uniform logical-to-subpixel scale, aspect preserved. The braille
/// grid is close to square (2 wide, 4 tall per roughly 1:2 cell), so
/// no extra aspect correction is applied.
fn logical_scale(px_w: usize, px_h: usize, tuning: &Tuning) -> f32 {
    if px_w == 0 || px_h == 0 {
        return 1.0;
    }
    (px_w as f32 / tuning.scene_w).min(px_h as f32 / tuning.scene_h)
}

fn scale_balls(balls: &[Ball], scale: f32) -> Vec<Ball> {
    balls
        .iter()
        .map(|b| Ball::new(b.offset.mul(scale), b.diameter * scale, 1.0))
        .collect()
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    let result = app.run();
    if result.is_err() {
        // best-effort restore so the error is readable
        let _ = app.term.end();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scale_fits_the_scene_in_either_dimension() {
        let tuning = Tuning::default();
        // wide canvas: height is the limit
        let s = logical_scale(960, 480, &tuning);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-6);
        // narrow canvas: width is the limit
        let s = logical_scale(180, 960, &tuning);
        assert_abs_diff_eq!(s, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_canvas_scale_is_harmless() {
        let tuning = Tuning::default();
        assert_abs_diff_eq!(logical_scale(0, 0, &tuning), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn scaled_balls_keep_proportions() {
        let balls = [Ball::new(Vec2::new(100.0, -50.0), 150.0, 1.0)];
        let scaled = scale_balls(&balls, 0.5);
        assert_abs_diff_eq!(scaled[0].offset.x, 50.0, epsilon = 1e-6);
        assert_abs_diff_eq!(scaled[0].offset.y, -25.0, epsilon = 1e-6);
        assert_abs_diff_eq!(scaled[0].diameter, 75.0, epsilon = 1e-6);
    }
}
