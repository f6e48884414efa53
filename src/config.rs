use crate::model::Rgb;

/// All the knobs, in logical scene units (a 360x480 canvas centered on
/// the origin). The app scales these into braille subpixels at render
/// time, so the scene looks the same at any terminal size.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tuning {
    pub(crate) scene_w: f32,
    pub(crate) scene_h: f32,

    // Compositor. The blur radius is the merge tunable: larger means
    // stickier blobs.
    pub(crate) blur_radius_single: f32,
    pub(crate) blur_radius_clubbed: f32,
    pub(crate) alpha_threshold: f32,
    pub(crate) gradient_top: Rgb,
    pub(crate) gradient_bottom: Rgb,

    // Single mode: one anchored ball, one chasing the pointer.
    pub(crate) ball_diameter: f32,
    pub(crate) release_response: f32,
    pub(crate) release_damping: f32,

    // Clubbed mode: N balls re-rolled on a timer.
    pub(crate) ball_count: usize,
    pub(crate) offset_x_range: (f32, f32),
    pub(crate) offset_y_range: (f32, f32),
    pub(crate) diameter_range: (f32, f32),
    pub(crate) paused_diameter: f32,
    pub(crate) tick_period: f32,
    // Shorter than tick_period so each glide finishes before the next roll.
    pub(crate) move_duration: f32,

    pub(crate) min_diameter: f32,
    pub(crate) fps_cap: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            scene_w: 360.0,
            scene_h: 480.0,
            blur_radius_single: 35.0,
            blur_radius_clubbed: 30.0,
            alpha_threshold: 0.5,
            gradient_top: Rgb { r: 255, g: 90, b: 140 },
            gradient_bottom: Rgb { r: 130, g: 60, b: 255 },
            ball_diameter: 150.0,
            release_response: 0.6,
            release_damping: 0.7,
            ball_count: 15,
            offset_x_range: (-180.0, 180.0),
            offset_y_range: (-240.0, 240.0),
            diameter_range: (120.0, 160.0),
            paused_diameter: 140.0,
            tick_period: 2.0,
            move_duration: 1.9,
            min_diameter: 1.0,
            fps_cap: 60,
        }
    }
}
