use crate::config::ClockConfiguration;

/// Where the four digit cells and the colon sit inside the viewBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub total_width: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub colon_x: f64,
    pub digit_x: [f64; 4],
}

/// Centre the four-digit block in the background rectangle. Nothing is
/// clamped: a rectangle narrower than the block gives a negative `start_x`.
pub fn compute_layout(cfg: &ClockConfiguration) -> Layout {
    let d = &cfg.digit;
    let r = &cfg.rect;

    let total_width = 4.0 * d.width + 3.0 * d.spacing + d.thickness;
    let start_x = r.x + (r.width - total_width) / 2.0;
    let start_y = r.y + (r.height - d.height) / 2.0;
    let colon_x = start_x + 2.0 * d.width + d.spacing;

    // Minute pair is pushed right by one thickness to leave room for the colon
    let pitch = d.width + d.spacing;
    let digit_x = [
        start_x,
        start_x + pitch,
        start_x + 2.0 * pitch + d.thickness,
        start_x + 3.0 * pitch + d.thickness,
    ];

    Layout { total_width, start_x, start_y, colon_x, digit_x }
}
