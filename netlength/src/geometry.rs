//! 2D vector math used by the board model and tracer.
//!
//! All coordinates are in mils once they leave the parser.

use std::ops::{Add, Div, Mul, Sub};

use serde::Serialize;

/// A point or displacement in the board plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Absolute angle of the vector in the plane, `atan2(y, x)`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Magnitude.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn unit(self) -> Self {
        self / self.length()
    }

    pub fn normal(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unsigned angle between two vectors in `[0, π]`.
    pub fn angle_between(self, other: Vec2) -> f64 {
        (self.dot(other) / (self.length() * other.length())).acos()
    }

    pub fn midpoint(self, other: Vec2) -> Self {
        (self + other) / 2.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        self * (1.0 / rhs)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (a - b).length()
}

/// Direction of the vector going from `from` to `to`.
pub fn angle_between_points(from: Vec2, to: Vec2) -> f64 {
    (to - from).angle()
}

/// Point of segment `p1..p2` closest to `pt`, clamped to the segment ends.
pub fn closest_point_on_segment(p1: Vec2, p2: Vec2, pt: Vec2) -> Vec2 {
    let seg = p2 - p1;
    let len_sq = seg.dot(seg);
    if len_sq == 0.0 {
        return p1;
    }

    let t = (pt - p1).dot(seg) / len_sq;
    if t < 0.0 {
        p1
    } else if t > 1.0 {
        p2
    } else {
        p1 + seg * t
    }
}

pub fn distance_to_segment(p1: Vec2, p2: Vec2, pt: Vec2) -> f64 {
    distance(closest_point_on_segment(p1, p2, pt), pt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_distance_is_symmetric() {
        let a = Vec2::new(1.5, -2.0);
        let b = Vec2::new(-4.0, 7.25);
        assert_eq!(distance(a, b), distance(b, a));
        assert!((distance(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_and_normal() {
        assert!((Vec2::new(0.0, 2.0).angle() - FRAC_PI_2).abs() < 1e-12);
        assert!((Vec2::new(-1.0, 0.0).angle() - PI).abs() < 1e-12);
        assert_eq!(Vec2::new(1.0, 0.0).normal(), Vec2::new(0.0, -1.0));
        assert!((angle_between_points(Vec2::new(1.0, 1.0), Vec2::new(1.0, 5.0)) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_unit_and_angle_between() {
        let u = Vec2::new(3.0, 4.0).unit();
        assert!((u.length() - 1.0).abs() < 1e-12);
        let a = Vec2::new(1.0, 0.0).angle_between(Vec2::new(0.0, 3.0));
        assert!((a - FRAC_PI_2).abs() < 1e-12);
        let v = Vec2::from_angle(PI);
        assert!((v.x + 1.0).abs() < 1e-12 && v.y.abs() < 1e-12);
    }

    #[test]
    fn test_operators() {
        let a = Vec2::new(2.0, 4.0);
        assert_eq!(a + Vec2::new(1.0, 1.0), Vec2::new(3.0, 5.0));
        assert_eq!(a - Vec2::new(1.0, 1.0), Vec2::new(1.0, 3.0));
        assert_eq!(2.0 * a, Vec2::new(4.0, 8.0));
        assert_eq!(a / 2.0, Vec2::new(1.0, 2.0));
        assert_eq!(a.midpoint(Vec2::ZERO), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(p1, p2, Vec2::new(5.0, 3.0)), Vec2::new(5.0, 0.0));
        assert_eq!(closest_point_on_segment(p1, p2, Vec2::new(-5.0, 3.0)), p1);
        assert_eq!(closest_point_on_segment(p1, p2, Vec2::new(15.0, -3.0)), p2);
        assert_eq!(closest_point_on_segment(p1, p1, Vec2::new(15.0, -3.0)), p1);
        assert!((distance_to_segment(p1, p2, Vec2::new(5.0, 3.0)) - 3.0).abs() < 1e-12);
    }
}
