//! Length conversions to points and transformation matrices
//!
//! All coordinates in a document are in points, 72 to the inch.

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

pub fn inches(value: f64) -> f64 {
    value * POINTS_PER_INCH
}

pub fn millimeters(value: f64) -> f64 {
    value * POINTS_PER_INCH / 25.4
}

pub fn centimeters(value: f64) -> f64 {
    millimeters(value * 10.0)
}

/// Identity conversion, for call sites that spell out their unit
pub fn points(value: f64) -> f64 {
    value
}

/// Affine transform `[ a b c d e f ]`, as used by `cm`, `Tm` and `/Matrix`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform([f64; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Counter-clockwise rotation by `degrees`
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// Apply `self` first, then `next`
    pub fn then(self, next: Transform) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = next.0;
        Self([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    /// Map a point through the transform
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    pub fn to_array(self) -> [f64; 6] {
        self.0
    }
}

impl From<Transform> for [f64; 6] {
    fn from(t: Transform) -> Self {
        t.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lengths() {
        assert_eq!(inches(2.0), 144.0);
        assert!(close(millimeters(25.4), 72.0));
        assert!(close(centimeters(2.54), 72.0));
        assert_eq!(points(12.0), 12.0);
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Transform::scale(2.0, 3.0).then(Transform::translate(10.0, 20.0));
        assert_eq!(t.to_array(), [2.0, 0.0, 0.0, 3.0, 10.0, 20.0]);
        assert_eq!(t.apply(1.0, 1.0), (12.0, 23.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let (x, y) = Transform::rotate(90.0).apply(1.0, 0.0);
        assert!(close(x, 0.0) && close(y, 1.0));
    }
}
