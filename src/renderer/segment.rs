use crate::config::{ClockConfiguration, DigitGeometry};
use crate::renderer::glyph::segments_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One painted segment polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentShape {
    pub segment: Segment,
    pub points: [(f64, f64); 4],
    pub fill: String,
}

/// The shapes of one digit cell in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub shapes: Vec<SegmentShape>,
}

impl Glyph {
    /// Fill that ends up on top at each segment position, a..g.
    pub fn visible_fills(&self) -> [Option<&str>; 7] {
        let mut out = [None; 7];
        for shape in &self.shapes {
            out[shape.segment.index()] = Some(shape.fill.as_str());
        }
        out
    }

    /// `(min_x, min_y, max_x, max_y)` over every point of every shape.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        self.shapes.iter().flat_map(|s| s.points.iter()).fold(None, |acc, &(x, y)| {
            Some(match acc {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            })
        })
    }
}

/// Mitred outline of `segment` for the cell at `(x, y)`. Corner cuts are half
/// the segment thickness.
pub fn segment_outline(segment: Segment, x: f64, y: f64, d: &DigitGeometry) -> [(f64, f64); 4] {
    let o = d.thickness / 2.0;
    let w = d.width;
    let h = d.height;
    let m = h / 2.0;

    match segment {
        Segment::A => [(x + o, y), (x + w - o, y), (x + w, y + o), (x, y + o)],
        Segment::B => [(x + w, y + o), (x + w, y + m - o), (x + w - o, y + m), (x + w - o, y + 2.0 * o)],
        Segment::C => [(x + w, y + m + o), (x + w, y + h), (x + w - o, y + h - 2.0 * o), (x + w - o, y + m)],
        Segment::D => [(x, y + h), (x + w, y + h), (x + w - o, y + h - o), (x + 2.0 * o, y + h - o)],
        Segment::E => [(x, y + m + o), (x, y + h), (x + o, y + h - 2.0 * o), (x + o, y + m)],
        Segment::F => [(x, y + o), (x, y + m - o), (x + o, y + m), (x + o, y + 2.0 * o)],
        Segment::G => [(x + 2.0 * o, y + m - o), (x + w - 2.0 * o, y + m - o), (x + w - o, y + m), (x + o, y + m)],
    }
}

/// Draw `ch` as seven segments, lit ones in the digit color and the rest in
/// the dimmed color. Unknown characters come out fully dimmed.
pub fn draw_digit(x: f64, y: f64, ch: char, cfg: &ClockConfiguration) -> Glyph {
    if ch == '1' && cfg.outline_one {
        return draw_outlined_one(x, y, cfg);
    }

    let lit = segments_for(ch);
    let shapes = Segment::ALL
        .iter()
        .map(|&segment| SegmentShape {
            segment,
            points: segment_outline(segment, x, y, &cfg.digit),
            fill: if lit[segment.index()] { cfg.digit_color.clone() } else { cfg.dimmed_color.clone() },
        })
        .collect();
    Glyph { shapes }
}

/// "1": a dimmed pass over all seven outlines, then b and c lit on top, so the
/// glyph keeps the same footprint as every other digit.
fn draw_outlined_one(x: f64, y: f64, cfg: &ClockConfiguration) -> Glyph {
    let mut shapes: Vec<SegmentShape> = Segment::ALL
        .iter()
        .map(|&segment| SegmentShape {
            segment,
            points: segment_outline(segment, x, y, &cfg.digit),
            fill: cfg.dimmed_color.clone(),
        })
        .collect();
    for segment in [Segment::B, Segment::C] {
        shapes.push(SegmentShape {
            segment,
            points: segment_outline(segment, x, y, &cfg.digit),
            fill: cfg.digit_color.clone(),
        });
    }
    Glyph { shapes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, RawConfig};

    const ON: &str = "#00FF00";
    const OFF: &str = "#003300";

    fn config(outline_one: bool) -> ClockConfiguration {
        resolve(&RawConfig {
            entity: Some("sensor.time".into()),
            digit_color: Some(ON.into()),
            dimmed_color: Some(OFF.into()),
            outline_one: Some(outline_one),
            ..RawConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn every_digit_has_seven_segments_matching_the_table() {
        let cfg = config(false);
        for ch in '0'..='9' {
            let glyph = draw_digit(0.0, 0.0, ch, &cfg);
            assert_eq!(glyph.shapes.len(), 7, "digit {ch}");
            let lit = segments_for(ch);
            for shape in &glyph.shapes {
                let expected = if lit[shape.segment.index()] { ON } else { OFF };
                assert_eq!(shape.fill, expected, "digit {ch} segment {:?}", shape.segment);
            }
        }
    }

    #[test]
    fn outlined_one_lights_b_and_c_over_a_dimmed_pass() {
        let cfg = config(true);
        let glyph = draw_digit(10.0, 20.0, '1', &cfg);

        let fills = glyph.visible_fills();
        let lit = fills.iter().filter(|f| **f == Some(ON)).count();
        let dimmed = fills.iter().filter(|f| **f == Some(OFF)).count();
        assert_eq!((lit, dimmed), (2, 5));
        assert_eq!(fills[Segment::B.index()], Some(ON));
        assert_eq!(fills[Segment::C.index()], Some(ON));

        // background pass comes first and covers all seven positions
        assert!(glyph.shapes[..7].iter().all(|s| s.fill == OFF));
        assert_eq!(glyph.shapes.len(), 9);
    }

    #[test]
    fn outlined_one_has_the_same_footprint_as_other_digits() {
        let cfg = config(true);
        let one = draw_digit(10.0, 20.0, '1', &cfg).bounding_box();
        for ch in ['0', '4', '7', '8'] {
            assert_eq!(draw_digit(10.0, 20.0, ch, &cfg).bounding_box(), one);
        }
        assert_eq!(one, Some((10.0, 20.0, 50.0, 95.0)));
    }

    #[test]
    fn plain_one_uses_the_table_path() {
        let cfg = config(false);
        let glyph = draw_digit(0.0, 0.0, '1', &cfg);
        assert_eq!(glyph.shapes.len(), 7);
        assert_eq!(glyph.shapes.iter().filter(|s| s.fill == ON).count(), 2);
    }

    #[test]
    fn unknown_character_is_fully_dimmed() {
        let cfg = config(true);
        let glyph = draw_digit(0.0, 0.0, 'x', &cfg);
        assert_eq!(glyph.shapes.len(), 7);
        assert!(glyph.shapes.iter().all(|s| s.fill == OFF));
    }

    #[test]
    fn top_segment_outline() {
        let d = DigitGeometry { width: 40.0, height: 75.0, spacing: 10.0, thickness: 8.0 };
        assert_eq!(
            segment_outline(Segment::A, 0.0, 0.0, &d),
            [(4.0, 0.0), (36.0, 0.0), (40.0, 4.0), (0.0, 4.0)]
        );
        assert_eq!(
            segment_outline(Segment::G, 0.0, 0.0, &d),
            [(8.0, 33.5), (32.0, 33.5), (36.0, 37.5), (4.0, 37.5)]
        );
    }
}
