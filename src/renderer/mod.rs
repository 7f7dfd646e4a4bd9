pub mod glyph;
pub mod layout;
pub mod segment;
pub mod separator;

use std::fmt::Write;

use crate::config::{AlignItems, ClockConfiguration, Justify};
use crate::time_utils::{self, WallClock};

/// Fixed SVG coordinate space every layout value refers to.
pub const VIEW_WIDTH: f64 = 300.0;
pub const VIEW_HEIGHT: f64 = 120.0;
const BACKGROUND_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub corner_radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub points: Vec<(f64, f64)>,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect(RectShape),
    Polygon(PolygonShape),
}

/// Flex container the SVG is placed in.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStyle {
    pub justify_content: Justify,
    pub align_items: AlignItems,
    pub margin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClock {
    pub width: String,
    pub height: String,
    pub container: ContainerStyle,
    pub background: RectShape,
    /// Digit and colon primitives in paint order.
    pub shapes: Vec<Primitive>,
    pub digits: [char; 4],
    /// `HH:MM`, with ` AM`/` PM` in 12-hour mode. Not part of the drawing.
    pub summary: String,
}

/// Render the clock for the data source's `state` string.
///
/// Seconds in the state are ignored. An empty or unparseable state shows the
/// wall-clock time instead.
pub fn render(cfg: &ClockConfiguration, state: &str, clock: &impl WallClock) -> RenderedClock {
    let time = time_utils::resolve_time(state, clock);
    let digits = time.digits(cfg.hour_format);
    let summary = format!("{}{}", time.format_time(cfg.hour_format), time.format_time_suffix(cfg.hour_format));

    let layout = layout::compute_layout(cfg);
    let y = layout.start_y;

    let mut shapes = Vec::with_capacity(32);
    let push_digit = |shapes: &mut Vec<Primitive>, x: f64, ch: char| {
        let glyph = segment::draw_digit(x, y, ch, cfg);
        shapes.extend(glyph.shapes.into_iter().map(|s| {
            Primitive::Polygon(PolygonShape { points: s.points.to_vec(), fill: s.fill })
        }));
    };

    push_digit(&mut shapes, layout.digit_x[0], digits[0]);
    push_digit(&mut shapes, layout.digit_x[1], digits[1]);
    shapes.extend(separator::draw_colon(layout.colon_x, y, cfg).into_iter().map(Primitive::Rect));
    push_digit(&mut shapes, layout.digit_x[2], digits[2]);
    push_digit(&mut shapes, layout.digit_x[3], digits[3]);

    RenderedClock {
        width: cfg.width_svg.clone(),
        height: cfg.height_svg.clone(),
        container: ContainerStyle {
            justify_content: cfg.justify_content,
            align_items: cfg.align_items,
            margin: cfg.margin_div.clone(),
        },
        background: RectShape {
            x: cfg.rect.x,
            y: cfg.rect.y,
            width: cfg.rect.width,
            height: cfg.rect.height,
            fill: cfg.background_color.clone(),
            corner_radius: Some(BACKGROUND_RADIUS),
        },
        shapes,
        digits,
        summary,
    }
}

impl ContainerStyle {
    pub fn to_css(&self) -> String {
        format!(
            "display: flex; justify-content: {}; align-items: {}; margin: {}; width: 100%;",
            self.justify_content.as_css(),
            self.align_items.as_css(),
            self.margin,
        )
    }
}

impl RenderedClock {
    /// Markup for insertion into the card: flex container, SVG, background
    /// rectangle and the clock group.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<div class="clock-container" style="{}">"#,
            escape_attr(&self.container.to_css())
        );
        self.write_svg(&mut out, &self.width, &self.height);
        out.push_str("</div>\n");
        out
    }

    /// Standalone SVG document at an explicit pixel size.
    pub fn to_svg_document(&self, width_px: u32, height_px: u32) -> String {
        let mut out = String::new();
        self.write_svg(&mut out, &width_px.to_string(), &height_px.to_string());
        out
    }

    fn write_svg(&self, out: &mut String, width: &str, height: &str) {
        let _ = writeln!(
            out,
            r#"<svg viewBox="0 0 {} {}" width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">"#,
            num(VIEW_WIDTH),
            num(VIEW_HEIGHT),
            escape_attr(width),
            escape_attr(height),
        );
        write_rect(out, &self.background);
        out.push_str("<g>\n");
        for shape in &self.shapes {
            match shape {
                Primitive::Rect(r) => write_rect(out, r),
                Primitive::Polygon(p) => write_polygon(out, p),
            }
        }
        out.push_str("</g>\n</svg>\n");
    }
}

fn write_rect(out: &mut String, r: &RectShape) {
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
        num(r.x),
        num(r.y),
        num(r.width),
        num(r.height),
        escape_attr(&r.fill),
    );
    if let Some(radius) = r.corner_radius {
        let _ = write!(out, r#" rx="{0}" ry="{0}""#, num(radius));
    }
    out.push_str(" />\n");
}

fn write_polygon(out: &mut String, p: &PolygonShape) {
    let points: Vec<String> = p.points.iter().map(|(x, y)| format!("{},{}", num(*x), num(*y))).collect();
    let _ = writeln!(
        out,
        r#"<polygon points="{}" fill="{}" />"#,
        points.join(" "),
        escape_attr(&p.fill),
    );
}

/// Normalise negative zero so coordinates never print as `-0`.
fn num(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, RawConfig};
    use crate::time_utils::FixedClock;
    use chrono::NaiveTime;

    fn config(raw: RawConfig) -> ClockConfiguration {
        resolve(&RawConfig { entity: Some("sensor.time".into()), ..raw }).unwrap()
    }

    fn noon() -> FixedClock {
        FixedClock(NaiveTime::from_hms_opt(12, 34, 0).unwrap())
    }

    fn polygons(clock: &RenderedClock) -> usize {
        clock.shapes.iter().filter(|s| matches!(s, Primitive::Polygon(_))).count()
    }

    #[test]
    fn digits_follow_hour_format() {
        let h24 = render(&config(RawConfig::default()), "13:05", &noon());
        assert_eq!(h24.digits, ['1', '3', '0', '5']);
        assert_eq!(h24.summary, "13:05");

        let h12 = render(&config(RawConfig { use_24h_format: Some(false), ..RawConfig::default() }), "13:05", &noon());
        assert_eq!(h12.digits, ['0', '1', '0', '5']);
        assert_eq!(h12.summary, "01:05 PM");
    }

    #[test]
    fn seconds_are_ignored() {
        let cfg = config(RawConfig::default());
        assert_eq!(render(&cfg, "08:15:59", &noon()).digits, render(&cfg, "08:15", &noon()).digits);
    }

    #[test]
    fn empty_state_uses_wall_clock() {
        let clock = render(&config(RawConfig::default()), "", &noon());
        assert_eq!(clock.digits, ['1', '2', '3', '4']);
    }

    #[test]
    fn shapes_are_four_glyphs_and_a_colon() {
        let plain = render(&config(RawConfig { outline_one: Some(false), ..RawConfig::default() }), "13:05", &noon());
        assert_eq!(polygons(&plain), 28);
        assert_eq!(plain.shapes.len(), 30);

        // the "1" adds a lit pass over its dimmed outline
        let outlined = render(&config(RawConfig::default()), "13:05", &noon());
        assert_eq!(polygons(&outlined), 30);

        // colon is painted between the hour and minute glyphs
        let Primitive::Rect(dot) = &plain.shapes[14] else { panic!("expected colon dot") };
        assert_eq!((dot.x, dot.y), (146.0, 43.5));
    }

    #[test]
    fn markup_wraps_svg_in_flex_container() {
        let cfg = config(RawConfig {
            justify_content: Some(Justify::FlexEnd),
            margin_div: Some("4px 8px".into()),
            background_color: Some("#222".into()),
            ..RawConfig::default()
        });
        let markup = render(&cfg, "10:20", &noon()).to_markup();
        assert!(markup.starts_with(
            r#"<div class="clock-container" style="display: flex; justify-content: flex-end; align-items: center; margin: 4px 8px; width: 100%;">"#
        ));
        assert!(markup.contains(r#"<svg viewBox="0 0 300 120" width="50%" height="120" xmlns="http://www.w3.org/2000/svg">"#));
        assert!(markup.contains(r##"<rect x="40" y="10" width="220" height="100" fill="#222" rx="5" ry="5" />"##));
        assert!(markup.contains(r#"<polygon points="105,22.5 137,22.5 141,26.5 101,26.5" fill="white" />"#));
        assert_eq!(markup.matches("<polygon").count(), 30);
        assert!(markup.trim_end().ends_with("</div>"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let cfg = config(RawConfig { digit_color: Some(r#"red" onload="x"#.into()), ..RawConfig::default() });
        let markup = render(&cfg, "10:20", &noon()).to_markup();
        assert!(!markup.contains(r#"onload="x""#));
        assert!(markup.contains("red&quot; onload=&quot;x"));
    }

    #[test]
    fn svg_document_uses_pixel_size() {
        let doc = render(&config(RawConfig::default()), "10:20", &noon()).to_svg_document(600, 240);
        assert!(doc.starts_with(r#"<svg viewBox="0 0 300 120" width="600" height="240""#));
        assert!(!doc.contains("clock-container"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let cfg = config(RawConfig::default());
        assert_eq!(render(&cfg, "23:59", &noon()), render(&cfg, "23:59", &noon()));
    }
}
