//! Interpreter for the compact path mini-language (move/line/horizontal/
//! vertical/cubic/smooth/arc/close) used by path-shaped scene nodes.
//!
//! Parsing is best-effort: tokens that are neither a known command letter nor
//! a well-formed number are skipped, and a coordinate run that overflows a
//! `M`/`m` command continues as implicit line-to commands. A conversion never
//! aborts because of malformed path data.

use crate::error::PathError;
use crate::geom::Segment;

const DEG_PER_RAD: f64 = 180.0 / std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cmd {
    Undef,
    Move,
    HLine,
    VLine,
    Line,
    Cubic,
    Smooth,
    Arc,
}

/// Insert separating whitespace so the content can be split on whitespace:
/// spaces around command letters, commas become spaces, a space lands before
/// every sign character.
fn normalize(content: &str) -> String {
    let mut buf = String::with_capacity(content.len() + 16);
    for c in content.chars() {
        match c.to_ascii_lowercase() {
            'c' | 's' | 'm' | 'l' | 'h' | 'v' | 'a' => {
                buf.push(' ');
                buf.push(c);
                buf.push(' ');
            }
            'z' => {
                buf.push(' ');
                buf.push(c);
            }
            ',' => buf.push(' '),
            '-' | '+' => {
                buf.push(' ');
                buf.push(c);
            }
            _ => buf.push(c),
        }
    }
    buf
}

/// An optionally-signed decimal number: `[+-]?digits[.digits]?`.
/// No exponents and no leading-dot forms; anything else is skipped.
fn parse_number(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let mut i = 0;
    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    token.parse::<f64>().ok()
}

/// Parse path data into segments.
///
/// Returns `Err(PathError::Empty)` only when no drawable segment could be
/// produced at all; token-level failures are recovered by skipping.
pub fn parse(content: &str) -> Result<Vec<Segment>, PathError> {
    let normalized = normalize(content);
    let mut segs: Vec<Segment> = Vec::new();
    // Nothing is drawable until the first moveto; anything emitted before it
    // is dropped so a non-empty result always starts with MoveTo.
    let mut started = false;

    let mut x = 0.0f64;
    let mut y = 0.0f64;
    let mut x1 = 0.0f64;
    let mut y1 = 0.0f64;
    let mut x2 = 0.0f64;
    let mut y2 = 0.0f64;
    let mut rx = 0.0f64;
    let mut ry = 0.0f64;
    let mut axis_rotation = 0.0f64;
    let mut large_arc = false;
    let mut sweep = false;

    let mut cmd = Cmd::Undef;
    let mut relative = false;
    let mut count = 0u32;
    // Number of coordinates the current command accepts before an implicit
    // switch to line-to; 0 means unlimited.
    let mut max_count = 0u32;

    for token in normalized.split_whitespace() {
        match token {
            "z" | "Z" => {
                if started {
                    segs.push(Segment::Close);
                }
                count = 0;
                max_count = 0;
            }
            "m" | "M" => {
                relative = token == "m";
                cmd = Cmd::Move;
                count = 0;
                max_count = 2;
            }
            "h" | "H" => {
                relative = token == "h";
                cmd = Cmd::HLine;
                count = 0;
                max_count = 0;
            }
            "v" | "V" => {
                relative = token == "v";
                cmd = Cmd::VLine;
                count = 0;
                max_count = 0;
            }
            "l" | "L" => {
                relative = token == "l";
                cmd = Cmd::Line;
                count = 0;
                max_count = 0;
            }
            "c" | "C" => {
                relative = token == "c";
                cmd = Cmd::Cubic;
                count = 0;
                max_count = 0;
            }
            "s" | "S" => {
                relative = token == "s";
                cmd = Cmd::Smooth;
                count = 0;
                max_count = 0;
            }
            "a" | "A" => {
                relative = token == "a";
                cmd = Cmd::Arc;
                count = 0;
                max_count = 0;
            }
            _ => {
                let Some(num) = parse_number(token) else {
                    continue;
                };
                count += 1;
                // Recovery for malformed content: a run of more than two
                // coordinates right after a moveto continues as linetos.
                if max_count != 0 && count > max_count {
                    cmd = Cmd::Line;
                    max_count = 0;
                }
                match cmd {
                    Cmd::HLine => {
                        x = if relative { x + num } else { num };
                        if started {
                            segs.push(Segment::LineTo { x, y });
                        }
                    }
                    Cmd::VLine => {
                        y = if relative { y + num } else { num };
                        if started {
                            segs.push(Segment::LineTo { x, y });
                        }
                    }
                    Cmd::Move => {
                        if count % 2 == 0 {
                            y = if relative { y + num } else { num };
                            started = true;
                            segs.push(Segment::MoveTo { x, y });
                        } else {
                            x = if relative { x + num } else { num };
                        }
                    }
                    Cmd::Line => {
                        if count % 2 == 0 {
                            y = if relative { y + num } else { num };
                            if started {
                                segs.push(Segment::LineTo { x, y });
                            }
                        } else {
                            x = if relative { x + num } else { num };
                        }
                    }
                    // Nonstandard on purpose: the source format reads `S` as
                    // a 4-number quadratic curve, not a smooth cubic. Numbers
                    // past the fourth are ignored until the next command.
                    Cmd::Smooth => match count {
                        1 => x1 = if relative { x + num } else { num },
                        2 => y1 = if relative { y + num } else { num },
                        3 => x = if relative { x + num } else { num },
                        4 => {
                            y = if relative { y + num } else { num };
                            if started {
                                segs.push(Segment::QuadTo {
                                    cx: x1,
                                    cy: y1,
                                    x,
                                    y,
                                });
                            }
                        }
                        _ => {}
                    },
                    // One curve per command; extra coordinate groups are
                    // ignored until the next command letter.
                    Cmd::Cubic => match count {
                        1 => x1 = if relative { x + num } else { num },
                        2 => y1 = if relative { y + num } else { num },
                        3 => x2 = if relative { x + num } else { num },
                        4 => y2 = if relative { y + num } else { num },
                        5 => x = if relative { x + num } else { num },
                        6 => {
                            y = if relative { y + num } else { num };
                            if started {
                                segs.push(Segment::CurveTo {
                                    cx1: x1,
                                    cy1: y1,
                                    cx2: x2,
                                    cy2: y2,
                                    x,
                                    y,
                                });
                            }
                        }
                        _ => {}
                    },
                    Cmd::Arc => match count {
                        1 => rx = num,
                        2 => ry = num,
                        3 => axis_rotation = num,
                        4 => large_arc = num != 0.0,
                        5 => sweep = num != 0.0,
                        6 => x2 = if relative { x + num } else { num },
                        _ => {
                            y2 = if relative { y + num } else { num };
                            if started {
                                segs.push(compute_arc(
                                    x,
                                    y,
                                    rx,
                                    ry,
                                    axis_rotation,
                                    large_arc,
                                    sweep,
                                    x2,
                                    y2,
                                ));
                            }
                            x = x2;
                            y = y2;
                            // ready for another arc of the same command
                            count = 0;
                        }
                    },
                    Cmd::Undef => {}
                }
            }
        }
    }

    if segs.is_empty() {
        Err(PathError::Empty)
    } else {
        Ok(segs)
    }
}

/// Solve the endpoint parameterization of an elliptical arc into a center
/// parameterization.
///
/// The returned `ArcTo` places the ellipse center, possibly-corrected radii,
/// start angle, and signed angular extent such that the parametric point
/// `(cx + rx*cos t, cy + ry*sin t)` (angles in the surface's y-down frame,
/// `t` from start to start+extent) reproduces both endpoints. A nonzero axis
/// rotation is carried in radians and applies about the ellipse center when
/// the arc is materialized.
#[allow(clippy::too_many_arguments)]
pub(crate) fn compute_arc(
    x0: f64,
    y0: f64,
    rx_in: f64,
    ry_in: f64,
    angle_deg: f64,
    large_arc: bool,
    sweep: bool,
    x: f64,
    y: f64,
) -> Segment {
    // Half distance between the current and the final point.
    let dx2 = (x0 - x) / 2.0;
    let dy2 = (y0 - y) / 2.0;
    let angle = (angle_deg % 360.0) / DEG_PER_RAD;
    let cos_angle = libm::cos(angle);
    let sin_angle = libm::sin(angle);

    // Step 1: half displacement in the ellipse's local (unrotated) frame.
    let x1 = cos_angle * dx2 + sin_angle * dy2;
    let y1 = -sin_angle * dx2 + cos_angle * dy2;

    // Step 2: scale radii up when the endpoints are out of reach.
    let mut rx = rx_in.abs();
    let mut ry = ry_in.abs();
    let mut prx = rx * rx;
    let mut pry = ry * ry;
    let px1 = x1 * x1;
    let py1 = y1 * y1;
    let radii_check = px1 / prx + py1 / pry;
    if radii_check > 1.0 {
        let s = libm::sqrt(radii_check);
        rx *= s;
        ry *= s;
        prx = rx * rx;
        pry = ry * ry;
    }

    // Step 3: local-frame center, with the discriminant clamped at zero to
    // absorb floating rounding.
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let mut sq = ((prx * pry) - (prx * py1) - (pry * px1)) / ((prx * py1) + (pry * px1));
    if sq < 0.0 {
        sq = 0.0;
    }
    let coef = sign * libm::sqrt(sq);
    let cx1 = coef * ((rx * y1) / ry);
    let cy1 = coef * -((ry * x1) / rx);

    // Step 4: back to the global frame via the segment midpoint.
    let sx2 = (x0 + x) / 2.0;
    let sy2 = (y0 + y) / 2.0;
    let cx = sx2 + (cos_angle * cx1 - sin_angle * cy1);
    let cy = sy2 + (sin_angle * cx1 + cos_angle * cy1);

    // Step 5: start angle and extent from the unit vectors between the local
    // center and the two endpoints.
    let ux = (x1 - cx1) / rx;
    let uy = (y1 - cy1) / ry;
    let vx = (-x1 - cx1) / rx;
    let vy = (-y1 - cy1) / ry;

    let n = libm::sqrt(ux * ux + uy * uy);
    let p = ux;
    let sign = if uy < 0.0 { -1.0 } else { 1.0 };
    let mut angle_start = sign * libm::acos(p / n) * DEG_PER_RAD;

    let n = libm::sqrt((ux * ux + uy * uy) * (vx * vx + vy * vy));
    let p = ux * vx + uy * vy;
    let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let mut angle_extent = sign * libm::acos(p / n) * DEG_PER_RAD;
    if !sweep && angle_extent > 0.0 {
        angle_extent -= 360.0;
    } else if sweep && angle_extent < 0.0 {
        angle_extent += 360.0;
    }
    angle_extent %= 360.0;
    angle_start %= 360.0;

    Segment::ArcTo {
        cx,
        cy,
        rx,
        ry,
        start_deg: angle_start,
        extent_deg: angle_extent,
        rotation_rad: if angle_deg != 0.0 {
            angle_deg / DEG_PER_RAD
        } else {
            0.0
        },
    }
}

/// The origin of path data: the target of its first moveto command.
pub fn origin(content: &str) -> (f64, f64) {
    let normalized = normalize(content);
    let mut x = 0.0f64;
    let mut y = 0.0f64;
    let mut in_move = false;
    let mut relative = false;
    let mut count = 0u32;
    for token in normalized.split_whitespace() {
        if token.eq_ignore_ascii_case("m") {
            relative = token == "m";
            in_move = true;
            count = 0;
        } else if in_move {
            let Some(num) = parse_number(token) else {
                continue;
            };
            count += 1;
            if count % 2 == 0 {
                y = if relative { y + num } else { num };
                break;
            } else {
                x = if relative { x + num } else { num };
            }
        }
    }
    (x, y)
}

/// Whether the first moveto of the path data is relative. The leading
/// moveto's flavor does not change the rendered shape; some serializers
/// still care about it.
pub fn is_relative(content: &str) -> bool {
    let normalized = normalize(content);
    for token in normalized.split_whitespace() {
        if token.eq_ignore_ascii_case("m") {
            return token == "m";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc_point(cx: f64, cy: f64, rx: f64, ry: f64, deg: f64) -> (f64, f64) {
        let t = deg.to_radians();
        (cx + rx * libm::cos(t), cy + ry * libm::sin(t))
    }

    #[test]
    fn parses_simple_path() {
        let segs = parse("M0 0 L10 0 L10 10 Z").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 10.0 },
                Segment::Close,
            ]
        );
    }

    #[test]
    fn commas_and_glued_signs_separate_tokens() {
        let segs = parse("M0,0L10-5l-2,3").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: -5.0 },
                Segment::LineTo { x: 8.0, y: -2.0 },
            ]
        );
    }

    #[test]
    fn horizontal_and_vertical_accumulate_relative() {
        let segs = parse("M1 2 h3 v4 H0 V0").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 1.0, y: 2.0 },
                Segment::LineTo { x: 4.0, y: 2.0 },
                Segment::LineTo { x: 4.0, y: 6.0 },
                Segment::LineTo { x: 0.0, y: 6.0 },
                Segment::LineTo { x: 0.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn extra_moveto_coordinates_continue_as_linetos() {
        // Defensive rule for malformed content: only the first pair belongs
        // to the moveto.
        let segs = parse("M0 0 10 0 10 10").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 10.0 },
            ]
        );
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let segs = parse("M0 0 Lfoo 10 20 L5 5").expect("segments");
        // "foo" drops out; 10/20 pair up as the lineto coordinates.
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 20.0 },
                Segment::LineTo { x: 5.0, y: 5.0 },
            ]
        );
    }

    #[test]
    fn empty_or_garbage_input_reports_empty() {
        assert_eq!(parse(""), Err(PathError::Empty));
        assert_eq!(parse("not a path"), Err(PathError::Empty));
    }

    #[test]
    fn curve_commands_emit_one_segment_per_letter() {
        // Extra coordinate groups after a complete C or S curve are
        // ignored until the next command letter.
        let segs = parse("M0 0 C1 1 2 2 3 3 4 4 5 5 6 6").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::CurveTo {
                    cx1: 1.0,
                    cy1: 1.0,
                    cx2: 2.0,
                    cy2: 2.0,
                    x: 3.0,
                    y: 3.0
                },
            ]
        );

        let segs = parse("M0 0 S1 1 2 2 3 3 4 4").expect("segments");
        assert_eq!(segs.len(), 2);
        assert_eq!(
            segs[1],
            Segment::QuadTo {
                cx: 1.0,
                cy: 1.0,
                x: 2.0,
                y: 2.0
            }
        );
    }

    #[test]
    fn segments_before_the_first_moveto_are_dropped() {
        // A drawable path always opens with a moveto; commands that arrive
        // before one establish position but draw nothing.
        assert_eq!(parse("L5 5"), Err(PathError::Empty));
        assert_eq!(parse("z"), Err(PathError::Empty));
        assert_eq!(
            parse("L5 5 M0 0 L1 1"),
            Ok(vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 1.0, y: 1.0 },
            ])
        );
    }

    #[test]
    fn smooth_command_is_a_quadratic_curve() {
        // Origin-format quirk, preserved on purpose: S takes four numbers
        // and produces a quadratic segment, not a smooth cubic.
        let segs = parse("M0 0 S5 5 10 0").expect("segments");
        assert_eq!(
            segs,
            vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::QuadTo {
                    cx: 5.0,
                    cy: 5.0,
                    x: 10.0,
                    y: 0.0
                },
            ]
        );
    }

    #[test]
    fn cubic_relative_accumulates_from_current_point() {
        let segs = parse("M10 10 c1 2 3 4 5 6").expect("segments");
        assert_eq!(
            segs[1],
            Segment::CurveTo {
                cx1: 11.0,
                cy1: 12.0,
                cx2: 13.0,
                cy2: 14.0,
                x: 15.0,
                y: 16.0
            }
        );
    }

    #[test]
    fn arc_solves_half_circle_center() {
        let segs = parse("M10 10 A5 5 0 0 1 20 10").expect("segments");
        let Segment::ArcTo {
            cx,
            cy,
            rx,
            ry,
            start_deg,
            extent_deg,
            rotation_rad,
        } = segs[1]
        else {
            panic!("expected an arc, got {:?}", segs[1]);
        };
        assert!((cx - 15.0).abs() < 1e-9);
        assert!((cy - 10.0).abs() < 1e-9);
        assert!((rx - 5.0).abs() < 1e-9);
        assert!((ry - 5.0).abs() < 1e-9);
        assert!((start_deg - 180.0).abs() < 1e-9);
        // sweep=1 keeps the extent positive
        assert!((extent_deg - 180.0).abs() < 1e-9);
        assert_eq!(rotation_rad, 0.0);
    }

    #[test]
    fn arc_radii_scale_up_when_endpoints_unreachable() {
        // Endpoints 20 apart cannot sit on a radius-5 circle; both radii
        // scale by the same factor.
        let segs = parse("M0 0 A5 5 0 0 1 20 0").expect("segments");
        let Segment::ArcTo { rx, ry, .. } = segs[1] else {
            panic!("expected an arc");
        };
        assert!((rx - 10.0).abs() < 1e-9);
        assert!((ry - 10.0).abs() < 1e-9);
    }

    #[test]
    fn arc_endpoints_round_trip_through_center_parameterization() {
        let cases: &[(f64, f64, f64, f64, f64, bool, bool, f64, f64)] = &[
            (0.0, 0.0, 5.0, 5.0, 0.0, false, true, 0.0, 10.0),
            (0.0, 0.0, 5.0, 5.0, 0.0, false, false, 0.0, 10.0),
            (10.0, 10.0, 5.0, 5.0, 0.0, false, true, 20.0, 10.0),
            (0.0, 0.0, 8.0, 4.0, 0.0, true, false, 6.0, 2.0),
            (0.0, 0.0, 8.0, 4.0, 0.0, true, true, 6.0, 2.0),
            (1.0, 2.0, 7.0, 3.0, 0.0, false, false, 5.0, -1.0),
            (-3.0, 4.0, 6.0, 6.0, 0.0, true, true, 3.0, 4.0),
        ];
        for &(x0, y0, rx, ry, rot, large, sweep, x, y) in cases {
            let seg = compute_arc(x0, y0, rx, ry, rot, large, sweep, x, y);
            let Segment::ArcTo {
                cx,
                cy,
                rx,
                ry,
                start_deg,
                extent_deg,
                ..
            } = seg
            else {
                panic!("expected an arc");
            };
            let (sx, sy) = arc_point(cx, cy, rx, ry, start_deg);
            let (ex, ey) = arc_point(cx, cy, rx, ry, start_deg + extent_deg);
            assert!(
                (sx - x0).abs() < 1e-6 && (sy - y0).abs() < 1e-6,
                "start point drifted for case ({x0},{y0})->({x},{y}): got ({sx},{sy})"
            );
            assert!(
                (ex - x).abs() < 1e-6 && (ey - y).abs() < 1e-6,
                "end point drifted for case ({x0},{y0})->({x},{y}): got ({ex},{ey})"
            );
        }
    }

    #[test]
    fn arc_sweep_flag_signs_the_extent() {
        let pos = compute_arc(0.0, 0.0, 5.0, 5.0, 0.0, false, true, 0.0, 10.0);
        let neg = compute_arc(0.0, 0.0, 5.0, 5.0, 0.0, false, false, 0.0, 10.0);
        let Segment::ArcTo {
            extent_deg: pos_ext,
            ..
        } = pos
        else {
            panic!("expected an arc");
        };
        let Segment::ArcTo {
            extent_deg: neg_ext,
            ..
        } = neg
        else {
            panic!("expected an arc");
        };
        assert!(pos_ext > 0.0);
        assert!(neg_ext < 0.0);
    }

    #[test]
    fn rotated_arc_is_tagged_with_rotation() {
        let seg = compute_arc(0.0, 0.0, 5.0, 2.0, 30.0, false, true, 4.0, 3.0);
        let Segment::ArcTo { rotation_rad, .. } = seg else {
            panic!("expected an arc");
        };
        assert!((rotation_rad - 30.0f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn origin_reads_first_moveto() {
        assert_eq!(origin("M5 7 L1 1"), (5.0, 7.0));
        assert_eq!(origin("m5 7 L1 1"), (5.0, 7.0));
        assert_eq!(origin(""), (0.0, 0.0));
    }

    #[test]
    fn relative_flag_reads_first_moveto_flavor() {
        assert!(is_relative("m1 1"));
        assert!(!is_relative("M1 1"));
        assert!(!is_relative("L1 1"));
    }
}
