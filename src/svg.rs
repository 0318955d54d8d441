// Copyright 2018 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG path data.

use core::fmt::{self, Write};

use alloc::string::String;

use thiserror::Error;

use crate::{BezPath, PathEl, Point, Vec2};

impl BezPath {
    /// Convert the path to SVG path data.
    ///
    /// Elements are separated by spaces and coordinates are written in
    /// full precision, absolute.
    pub fn to_svg(&self) -> String {
        let mut result = String::new();
        // Writing to a `String` cannot fail.
        let _ = self.write_svg(&mut result);
        result
    }

    /// Write the path as SVG path data.
    ///
    /// # Errors
    ///
    /// Only those raised by `w`.
    pub fn write_svg<W: Write>(&self, w: &mut W) -> fmt::Result {
        for (i, el) in self.elements().iter().enumerate() {
            if i > 0 {
                w.write_char(' ')?;
            }
            match *el {
                PathEl::MoveTo(p) => write!(w, "M{} {}", p.x, p.y)?,
                PathEl::LineTo(p) => write!(w, "L{} {}", p.x, p.y)?,
                PathEl::CurveTo(p1, p2, p3) => write!(
                    w,
                    "C{} {} {} {} {} {}",
                    p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
                )?,
                PathEl::ClosePath => w.write_char('Z')?,
            }
        }
        Ok(())
    }

    /// Try to parse SVG path data.
    ///
    /// Absolute and relative moves, lines and cubics are understood, along
    /// with close path. Repeated coordinates after a command repeat it, and
    /// extra pairs after a move are lines.
    ///
    /// # Errors
    ///
    /// [`SvgParseError`] on unknown commands or malformed numbers.
    pub fn from_svg(data: &str) -> Result<BezPath, SvgParseError> {
        let mut lexer = SvgLexer::new(data);
        let mut path = BezPath::new();
        let mut last_cmd = 0;
        let mut subpath_start = Point::ORIGIN;
        while let Some(c) = lexer.get_cmd(last_cmd)? {
            match c {
                b'm' | b'M' => {
                    let pt = lexer.get_maybe_relative(c)?;
                    path.move_to(pt);
                    lexer.last_pt = pt;
                    subpath_start = pt;
                    last_cmd = if c == b'm' { b'l' } else { b'L' };
                }
                b'l' | b'L' => {
                    let pt = lexer.get_maybe_relative(c)?;
                    path.line_to(pt);
                    lexer.last_pt = pt;
                    last_cmd = c;
                }
                b'c' | b'C' => {
                    let p1 = lexer.get_maybe_relative(c)?;
                    let p2 = lexer.get_maybe_relative(c)?;
                    let p3 = lexer.get_maybe_relative(c)?;
                    path.curve_to(p1, p2, p3);
                    lexer.last_pt = p3;
                    last_cmd = c;
                }
                b'z' | b'Z' => {
                    path.close_path();
                    lexer.last_pt = subpath_start;
                    last_cmd = 0;
                }
                _ => return Err(SvgParseError::UnknownCommand(char::from(c))),
            }
        }
        Ok(path)
    }
}

impl fmt::Display for BezPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_svg(f)
    }
}

/// An error which can be returned when parsing SVG path data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SvgParseError {
    /// A number was expected.
    #[error("a number was expected")]
    Wrong,
    /// The input string ended while still expecting input.
    #[error("unexpected end of path data")]
    UnexpectedEof,
    /// Encountered an unknown or unsupported command.
    #[error("unsupported path command `{0}`")]
    UnknownCommand(char),
}

struct SvgLexer<'a> {
    data: &'a str,
    ix: usize,
    last_pt: Point,
}

impl SvgLexer<'_> {
    fn new(data: &str) -> SvgLexer<'_> {
        SvgLexer {
            data,
            ix: 0,
            last_pt: Point::ORIGIN,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(&c) = self.data.as_bytes().get(self.ix) {
            if !(c == b' ' || c == 9 || c == 10 || c == 12 || c == 13) {
                break;
            }
            self.ix += 1;
        }
    }

    fn get_cmd(&mut self, last_cmd: u8) -> Result<Option<u8>, SvgParseError> {
        self.skip_ws();
        let Some(c) = self.get_byte() else {
            return Ok(None);
        };
        if c.is_ascii_alphabetic() {
            Ok(Some(c))
        } else if last_cmd != 0 && (c == b'-' || c == b'+' || c == b'.' || c.is_ascii_digit()) {
            // Plausible number start
            self.unget();
            Ok(Some(last_cmd))
        } else {
            Err(SvgParseError::Wrong)
        }
    }

    fn get_byte(&mut self) -> Option<u8> {
        self.data.as_bytes().get(self.ix).map(|&c| {
            self.ix += 1;
            c
        })
    }

    fn unget(&mut self) {
        self.ix -= 1;
    }

    fn get_number(&mut self) -> Result<f64, SvgParseError> {
        self.skip_ws();
        let start = self.ix;
        let c = self.get_byte().ok_or(SvgParseError::UnexpectedEof)?;
        if !(c == b'-' || c == b'+') {
            self.unget();
        }
        let mut digit_count = 0;
        let mut seen_period = false;
        while let Some(c) = self.get_byte() {
            if c.is_ascii_digit() {
                digit_count += 1;
            } else if c == b'.' && !seen_period {
                seen_period = true;
            } else {
                self.unget();
                break;
            }
        }
        if let Some(c) = self.get_byte() {
            if c == b'e' || c == b'E' {
                let mut c = self.get_byte().ok_or(SvgParseError::Wrong)?;
                if c == b'-' || c == b'+' {
                    c = self.get_byte().ok_or(SvgParseError::Wrong)?;
                }
                if !c.is_ascii_digit() {
                    return Err(SvgParseError::Wrong);
                }
                while let Some(c) = self.get_byte() {
                    if !c.is_ascii_digit() {
                        self.unget();
                        break;
                    }
                }
            } else {
                self.unget();
            }
        }
        if digit_count > 0 {
            self.data[start..self.ix]
                .parse()
                .map_err(|_| SvgParseError::Wrong)
        } else {
            Err(SvgParseError::Wrong)
        }
    }

    fn get_number_pair(&mut self) -> Result<Vec2, SvgParseError> {
        let x = self.get_number()?;
        self.opt_comma();
        let y = self.get_number()?;
        self.opt_comma();
        Ok(Vec2::new(x, y))
    }

    fn get_maybe_relative(&mut self, cmd: u8) -> Result<Point, SvgParseError> {
        let pt = self.get_number_pair()?;
        if cmd.is_ascii_lowercase() {
            Ok(self.last_pt + pt)
        } else {
            Ok(pt.to_point())
        }
    }

    fn opt_comma(&mut self) {
        self.skip_ws();
        if let Some(c) = self.get_byte() {
            if c != b',' {
                self.unget();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::{BezPath, PathEl, Point, SvgParseError};

    #[test]
    fn parse_relative() {
        let path = BezPath::from_svg("m10 10 100 0 0 100 -100 0z").unwrap();
        assert_eq!(path.elements().len(), 5);
        assert_eq!(path.elements()[2], PathEl::LineTo(Point::new(110.0, 110.0)));
        assert_eq!(path.elements()[4], PathEl::ClosePath);
    }

    #[test]
    fn parse_curves() {
        let path = BezPath::from_svg("M0,0 C1,1 2,1 3,0 c1 -1 2 -1 3 0").unwrap();
        assert_eq!(
            path.elements()[2],
            PathEl::CurveTo(
                Point::new(4.0, -1.0),
                Point::new(5.0, -1.0),
                Point::new(6.0, 0.0)
            )
        );
        let path = BezPath::from_svg("M1e2 -2.5E-1 L.5 +3").unwrap();
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(100.0, -0.25)));
        assert_eq!(path.elements()[1], PathEl::LineTo(Point::new(0.5, 3.0)));
    }

    #[test]
    fn close_resets_current_point() {
        let path = BezPath::from_svg("M1 1 L2 1 Z l1 0").unwrap();
        assert_eq!(path.elements()[3], PathEl::LineTo(Point::new(2.0, 1.0)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(BezPath::from_svg("M1"), Err(SvgParseError::UnexpectedEof));
        assert_eq!(BezPath::from_svg("M1 x"), Err(SvgParseError::Wrong));
        assert_eq!(
            BezPath::from_svg("M0 0 Q1 1 2 2"),
            Err(SvgParseError::UnknownCommand('Q'))
        );
        assert_eq!(BezPath::from_svg("12"), Err(SvgParseError::Wrong));
    }

    #[test]
    fn svg_round_trip() {
        let data = "M0 0 L1.5 0 C2 0.5 2 1 1.5 1.5 Z";
        let path = BezPath::from_svg(data).unwrap();
        assert_eq!(path.to_svg(), data);
        assert_eq!(path.to_string(), data);
        assert_eq!(BezPath::new().to_svg(), "");
    }
}
