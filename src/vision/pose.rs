// SPDX-License-Identifier: GPL-3.0-only

//! POSIT pose estimation
//!
//! Pose from Orthography and Scaling with Iterations, for a square planar
//! marker of known physical size. Image points must be centered on the
//! principal point with y growing upward. POSIT always produces two pose
//! hypotheses; both are returned with their reprojection errors so callers
//! can expose the ambiguity.

use nalgebra::{Matrix3, Vector3};

/// One pose hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSolution {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Mean absolute corner-angle deviation, in degrees.
    pub error: f64,
}

/// The two POSIT hypotheses, ordered by error.
#[derive(Debug, Clone, PartialEq)]
pub struct PosePair {
    pub best: PoseSolution,
    pub alternative: PoseSolution,
}

/// Pose estimator for a square marker. The model and its pseudo-inverse only
/// depend on the marker size, so one instance serves any number of frames.
pub struct PoseEstimator {
    model: [Vector3<f64>; 4],
    focal_length: f64,
    model_vectors: Matrix3<f64>,
    model_normal: Vector3<f64>,
    model_pseudo_inverse: Matrix3<f64>,
}

impl PoseEstimator {
    /// `model_size` is the physical marker edge length; `focal_length` the
    /// camera focal length in pixels.
    pub fn new(model_size: f64, focal_length: f64) -> Self {
        let half = model_size / 2.0;
        let model = [
            Vector3::new(-half, half, 0.0),
            Vector3::new(half, half, 0.0),
            Vector3::new(half, -half, 0.0),
            Vector3::new(-half, -half, 0.0),
        ];

        let model_vectors = Matrix3::from_rows(&[
            (model[1] - model[0]).transpose(),
            (model[2] - model[0]).transpose(),
            (model[3] - model[0]).transpose(),
        ]);

        let svd = model_vectors.svd(true, true);
        let u = svd.u.unwrap_or_else(Matrix3::identity);
        let v = svd.v_t.unwrap_or_else(Matrix3::identity).transpose();
        let d = svd.singular_values;

        // The planar model has a zero singular value; its direction in V is
        // the model plane normal.
        let d_inv = Vector3::new(
            if d.x != 0.0 { 1.0 / d.x } else { 0.0 },
            if d.y != 0.0 { 1.0 / d.y } else { 0.0 },
            if d.z != 0.0 { 1.0 / d.z } else { 0.0 },
        );
        let model_pseudo_inverse = v * Matrix3::from_diagonal(&d_inv) * u.transpose();
        let model_normal = v.column(d.imin()).into_owned();

        Self {
            model,
            focal_length,
            model_vectors,
            model_normal,
            model_pseudo_inverse,
        }
    }

    /// Estimates both pose hypotheses for the four centered corner points.
    pub fn estimate(&self, points: &[[f64; 2]; 4]) -> PosePair {
        let eps = Vector3::new(1.0, 1.0, 1.0);
        let (mut first, mut second) = self.pos(points, &eps);

        let error1 = self.iterate(points, &mut first);
        let error2 = self.iterate(points, &mut second);

        let solution = |pose: (Matrix3<f64>, Vector3<f64>), error| PoseSolution {
            rotation: pose.0,
            translation: pose.1,
            error,
        };

        if error1 < error2 {
            PosePair {
                best: solution(first, error1),
                alternative: solution(second, error2),
            }
        } else {
            PosePair {
                best: solution(second, error2),
                alternative: solution(first, error1),
            }
        }
    }

    /// One orthographic step: the two scaled-orthographic poses consistent
    /// with the corrected image points.
    #[allow(clippy::type_complexity)]
    fn pos(
        &self,
        points: &[[f64; 2]; 4],
        eps: &Vector3<f64>,
    ) -> ((Matrix3<f64>, Vector3<f64>), (Matrix3<f64>, Vector3<f64>)) {
        let xi = Vector3::new(points[1][0], points[2][0], points[3][0]);
        let yi = Vector3::new(points[1][1], points[2][1], points[3][1]);

        let xs = xi.component_mul(eps).add_scalar(-points[0][0]);
        let ys = yi.component_mul(eps).add_scalar(-points[0][1]);

        let i0 = self.model_pseudo_inverse * xs;
        let j0 = self.model_pseudo_inverse * ys;

        let s = j0.norm_squared() - i0.norm_squared();
        let ij = i0.dot(&j0);

        let r;
        let mut theta;
        if s == 0.0 {
            r = (2.0 * ij).abs().sqrt();
            theta = if ij == 0.0 {
                0.0
            } else {
                (-std::f64::consts::PI / 2.0) * ij.signum()
            };
        } else {
            r = (s * s + 4.0 * ij * ij).sqrt().sqrt();
            theta = (-2.0 * ij / s).atan();
            if s < 0.0 {
                theta += std::f64::consts::PI;
            }
            theta /= 2.0;
        }

        let lambda = r * theta.cos();
        let mu = r * theta.sin();

        let build = |i_raw: Vector3<f64>, j_raw: Vector3<f64>| {
            let mut i = i_raw;
            let mut j = j_raw;
            let inorm = i.normalize_mut();
            let jnorm = j.normalize_mut();
            let k = i.cross(&j);
            let rotation = Matrix3::from_columns(&[i, j, k]);

            let scale = (inorm + jnorm) / 2.0;
            let temp = rotation * self.model[0];
            let translation = Vector3::new(
                points[0][0] / scale - temp.x,
                points[0][1] / scale - temp.y,
                self.focal_length / scale,
            );
            (rotation, translation)
        };

        (
            build(i0 + self.model_normal * lambda, j0 + self.model_normal * mu),
            build(i0 - self.model_normal * lambda, j0 - self.model_normal * mu),
        )
    }

    /// Refines one hypothesis until the error stops improving.
    fn iterate(
        &self,
        points: &[[f64; 2]; 4],
        pose: &mut (Matrix3<f64>, Vector3<f64>),
    ) -> f64 {
        let mut prev_error = f64::INFINITY;
        let mut error = 0.0;

        for _ in 0..100 {
            let row2 = pose.0.row(2).transpose();
            let eps = ((self.model_vectors * row2) * (1.0 / pose.1.z)).add_scalar(1.0);

            let (first, second) = self.pos(points, &eps);
            let error1 = self.reprojection_error(points, &first);
            let error2 = self.reprojection_error(points, &second);

            if error1 < error2 {
                *pose = first;
                error = error1;
            } else {
                *pose = second;
                error = error2;
            }

            if error <= 2.0 || error > prev_error {
                break;
            }
            prev_error = error;
        }

        error
    }

    /// Compares the corner angles of the observed quad against those of the
    /// reprojected model.
    fn reprojection_error(
        &self,
        points: &[[f64; 2]; 4],
        pose: &(Matrix3<f64>, Vector3<f64>),
    ) -> f64 {
        let project = |index: usize| {
            let v = pose.0 * self.model[index] + pose.1;
            [
                v.x * self.focal_length / v.z,
                v.y * self.focal_length / v.z,
            ]
        };
        let modeled = [project(0), project(1), project(2), project(3)];

        let mut total = 0.0;
        for i in 0..4 {
            let prev = (i + 3) % 4;
            let next = (i + 1) % 4;
            let observed = angle(&points[i], &points[next], &points[prev]);
            let reprojected = angle(&modeled[i], &modeled[next], &modeled[prev]);
            total += (observed - reprojected).abs();
        }
        total / 4.0
    }
}

/// Angle at `a` between rays toward `b` and `c`, in degrees.
fn angle(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    let x1 = b[0] - a[0];
    let y1 = b[1] - a[1];
    let x2 = c[0] - a[0];
    let y2 = c[1] - a[1];

    let dot = x1 * x2 + y1 * y2;
    let mag1 = (x1 * x1 + y1 * y1).sqrt();
    let mag2 = (x2 * x2 + y2 * y2).sqrt();

    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
