use crate::config::ClockConfiguration;
use crate::renderer::RectShape;

/// Colon dots are a fixed size and do not follow the digit scale.
pub const DOT_SIZE: f64 = 8.0;
const DOT_OFFSET: f64 = 5.0;

/// Two square dots at one and two thirds of the digit height.
pub fn draw_colon(x: f64, y: f64, cfg: &ClockConfiguration) -> [RectShape; 2] {
    let h = cfg.digit.height;
    let dot = |cy: f64| RectShape {
        x: x + DOT_OFFSET,
        y: cy - DOT_SIZE / 2.0,
        width: DOT_SIZE,
        height: DOT_SIZE,
        fill: cfg.digit_color.clone(),
        corner_radius: None,
    };
    [dot(y + h / 3.0), dot(y + 2.0 * h / 3.0)]
}
