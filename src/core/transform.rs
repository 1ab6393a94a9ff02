//! Objects are usually modelled in their own coordinate space and
//! moved into the scene with a transformation. Their bounding boxes
//! then have to be recomputed (see **BoundingBox::recompute**), which
//! is the only reason the slab hierarchy needs transformations.
//!
//! ## 4 x 4 Matrices
//!
//! The **Matrix4x4** structure provides a low-level representation of
//! 4 x 4 matrices. It is an integral part of the **Transform** class.
//!
//! ## Transformations
//!
//! When a new **Transform** is created, it defaults to the *identity
//! transformation*. A **Transform** stores the matrix and its inverse,
//! so inverse transformations are free.

// std
use std::ops::Mul;
// others
use log::warn;
// slabs
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::slabs::{radians, Float};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Matrix4x4 {
    pub fn new(m: [[Float; 4]; 4]) -> Self {
        Matrix4x4 { m }
    }
    pub fn transpose(m: &Matrix4x4) -> Matrix4x4 {
        let mut r: Matrix4x4 = Matrix4x4::default();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = m.m[j][i];
            }
        }
        r
    }
    /// Gauss-Jordan elimination with full pivoting.
    pub fn inverse(m: &Matrix4x4) -> Matrix4x4 {
        let mut indxc: [usize; 4] = [0; 4];
        let mut indxr: [usize; 4] = [0; 4];
        let mut ipiv: [usize; 4] = [0; 4];
        let mut minv: Matrix4x4 = *m;
        for i in 0..4 {
            let mut irow: usize = 0;
            let mut icol: usize = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, item) in ipiv.iter().enumerate() {
                        if *item == 0 {
                            let abs: Float = minv.m[j][k].abs();
                            if abs >= big {
                                big = abs;
                                irow = j;
                                icol = k;
                            }
                        } else if *item > 1 {
                            warn!("Singular matrix in Matrix4x4::inverse()");
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            // swap rows _irow_ and _icol_ for pivot
            if irow != icol {
                minv.m.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv.m[icol][icol] == 0.0 {
                warn!("Singular matrix in Matrix4x4::inverse()");
            }
            // set $m[icol][icol]$ to one by scaling row _icol_ appropriately
            let pivinv: Float = 1.0 / minv.m[icol][icol];
            minv.m[icol][icol] = 1.0;
            for j in 0..4 {
                minv.m[icol][j] *= pivinv;
            }
            // subtract this row from others to zero out their columns
            for j in 0..4 {
                if j != icol {
                    let save: Float = minv.m[j][icol];
                    minv.m[j][icol] = 0.0;
                    for k in 0..4 {
                        minv.m[j][k] -= minv.m[icol][k] * save;
                    }
                }
            }
        }
        // swap columns to reflect permutation
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    minv.m[k].swap(indxr[j], indxc[j]);
                }
            }
        }
        minv
    }
}

/// The product of two matrices.
pub fn mtx_mul(m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = m1.m[i][0] * m2.m[0][j]
                + m1.m[i][1] * m2.m[1][j]
                + m1.m[i][2] * m2.m[2][j]
                + m1.m[i][3] * m2.m[3][j];
        }
    }
    r
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transform {
    pub m: Matrix4x4,
    pub m_inv: Matrix4x4,
}

impl Transform {
    pub fn new(m: Matrix4x4) -> Self {
        Transform {
            m,
            m_inv: Matrix4x4::inverse(&m),
        }
    }
    pub fn inverse(t: &Transform) -> Transform {
        Transform {
            m: t.m_inv,
            m_inv: t.m,
        }
    }
    pub fn is_identity(&self) -> bool {
        self.m == Matrix4x4::default()
    }
    pub fn translate(delta: &Vector3f) -> Transform {
        let mut m: Matrix4x4 = Matrix4x4::default();
        let mut m_inv: Matrix4x4 = Matrix4x4::default();
        m.m[0][3] = delta.x;
        m.m[1][3] = delta.y;
        m.m[2][3] = delta.z;
        m_inv.m[0][3] = -delta.x;
        m_inv.m[1][3] = -delta.y;
        m_inv.m[2][3] = -delta.z;
        Transform { m, m_inv }
    }
    pub fn scale(x: Float, y: Float, z: Float) -> Transform {
        let mut m: Matrix4x4 = Matrix4x4::default();
        let mut m_inv: Matrix4x4 = Matrix4x4::default();
        m.m[0][0] = x;
        m.m[1][1] = y;
        m.m[2][2] = z;
        m_inv.m[0][0] = 1.0 / x;
        m_inv.m[1][1] = 1.0 / y;
        m_inv.m[2][2] = 1.0 / z;
        Transform { m, m_inv }
    }
    /// Rotation around the x axis, *theta* given in degrees.
    pub fn rotate_x(theta: Float) -> Transform {
        let (sin_theta, cos_theta) = radians(theta).sin_cos();
        let m = Matrix4x4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos_theta, -sin_theta, 0.0],
            [0.0, sin_theta, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    /// Rotation around the y axis, *theta* given in degrees.
    pub fn rotate_y(theta: Float) -> Transform {
        let (sin_theta, cos_theta) = radians(theta).sin_cos();
        let m = Matrix4x4::new([
            [cos_theta, 0.0, sin_theta, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin_theta, 0.0, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    /// Rotation around the z axis, *theta* given in degrees.
    pub fn rotate_z(theta: Float) -> Transform {
        let (sin_theta, cos_theta) = radians(theta).sin_cos();
        let m = Matrix4x4::new([
            [cos_theta, -sin_theta, 0.0, 0.0],
            [sin_theta, cos_theta, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        Transform::apply(&self.m, p)
    }
    pub fn inverse_transform_point(&self, p: &Point3f) -> Point3f {
        Transform::apply(&self.m_inv, p)
    }
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        Transform::apply_vector(&self.m, v)
    }
    pub fn inverse_transform_vector(&self, v: &Vector3f) -> Vector3f {
        Transform::apply_vector(&self.m_inv, v)
    }
    fn apply_vector(m: &Matrix4x4, v: &Vector3f) -> Vector3f {
        Vector3f {
            x: m.m[0][0] * v.x + m.m[0][1] * v.y + m.m[0][2] * v.z,
            y: m.m[1][0] * v.x + m.m[1][1] * v.y + m.m[1][2] * v.z,
            z: m.m[2][0] * v.x + m.m[2][1] * v.y + m.m[2][2] * v.z,
        }
    }
    fn apply(m: &Matrix4x4, p: &Point3f) -> Point3f {
        let xp: Float = m.m[0][0] * p.x + m.m[0][1] * p.y + m.m[0][2] * p.z + m.m[0][3];
        let yp: Float = m.m[1][0] * p.x + m.m[1][1] * p.y + m.m[1][2] * p.z + m.m[1][3];
        let zp: Float = m.m[2][0] * p.x + m.m[2][1] * p.y + m.m[2][2] * p.z + m.m[2][3];
        let wp: Float = m.m[3][0] * p.x + m.m[3][1] * p.y + m.m[3][2] * p.z + m.m[3][3];
        assert!(wp != 0.0, "wp = {:?} != 0.0", wp);
        if wp == 1.0 as Float {
            Point3f {
                x: xp,
                y: yp,
                z: zp,
            }
        } else {
            let inv: Float = 1.0 as Float / wp;
            Point3f {
                x: inv * xp,
                y: inv * yp,
                z: inv * zp,
            }
        }
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            m: mtx_mul(&self.m, &rhs.m),
            m_inv: mtx_mul(&rhs.m_inv, &self.m_inv),
        }
    }
}
