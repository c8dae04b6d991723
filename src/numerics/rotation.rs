use nalgebra as na;

/// Elementary rotation axes, in the fixed order they are applied to a
/// satellite basis each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Elementary rotation matrix about a single body axis.
pub fn rotation_matrix(angle: f64, axis: Axis) -> na::Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    match axis {
        Axis::X => na::Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c),
        Axis::Y => na::Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c),
        Axis::Z => na::Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
    }
}

/// Express a point given in the (ux, uy, uz) basis in world coordinates.
/// The basis vectors become the columns of the transform.
pub fn from_basis(
    point: &na::Vector3<f64>,
    ux: &na::Vector3<f64>,
    uy: &na::Vector3<f64>,
    uz: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    na::Matrix3::from_columns(&[*ux, *uy, *uz]) * point
}

pub fn normalize(v: &na::Vector3<f64>) -> na::Vector3<f64> {
    v / v.norm()
}

pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}
