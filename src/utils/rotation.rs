use nalgebra::{Matrix3, Vector3};

/// Rotation matrix for a right-handed rotation of `angle` radians about x.
pub fn rotation_matrix_x(angle: f64) -> Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, cos, -sin, 0.0, sin, cos)
}

/// Tilts `vector` by `angle` radians about the x axis (launch-plane axis),
/// moving +z toward +y for positive angles.
pub fn pitch_about_x(vector: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    rotation_matrix_x(angle).transpose() * vector
}
