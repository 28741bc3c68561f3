//! 2D仿射变换
//!
//! 行主序 2x3 矩阵 [[a, c, e], [b, d, f]]，对应映射：
//!
//! ```text
//! x' = a*x + c*y + e
//! y' = b*x + d*y + f
//! ```
//!
//! 角度一律使用弧度。

use crate::math::{Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 2D仿射变换矩阵
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// [[a, c, e], [b, d, f]]
    pub matrix: [[f64; 3]; 2],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// 从六个系数创建
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            matrix: [[a, c, e], [b, d, f]],
        }
    }

    /// 从行主序矩阵创建
    pub fn from_matrix(matrix: [[f64; 3]; 2]) -> Self {
        Self { matrix }
    }

    /// 单位变换
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// 平移变换
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    /// 缩放变换
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// 等比缩放
    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s)
    }

    /// 绕原点旋转（弧度）
    pub fn rotate(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// 绕指定中心旋转（弧度）
    pub fn rotate_around(angle: f64, center: Point2) -> Self {
        Transform2D::translate(center.x, center.y)
            .then(&Transform2D::rotate(angle))
            .then(&Transform2D::translate(-center.x, -center.y))
    }

    /// 矩阵乘法：self * other（先应用other，再应用self）
    pub fn then(&self, other: &Self) -> Self {
        let s = &self.matrix;
        let o = &other.matrix;
        Self {
            matrix: [
                [
                    s[0][0] * o[0][0] + s[0][1] * o[1][0],
                    s[0][0] * o[0][1] + s[0][1] * o[1][1],
                    s[0][0] * o[0][2] + s[0][1] * o[1][2] + s[0][2],
                ],
                [
                    s[1][0] * o[0][0] + s[1][1] * o[1][0],
                    s[1][0] * o[0][1] + s[1][1] * o[1][1],
                    s[1][0] * o[0][2] + s[1][1] * o[1][2] + s[1][2],
                ],
            ],
        }
    }

    /// 应用到点
    pub fn apply_to_point(&self, p: &Point2) -> Point2 {
        let m = &self.matrix;
        Point2::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2],
        )
    }

    /// 应用到向量（忽略平移分量）
    pub fn apply_to_vector(&self, v: &Vector2) -> Vector2 {
        let m = &self.matrix;
        Vector2::new(m[0][0] * v.x + m[0][1] * v.y, m[1][0] * v.x + m[1][1] * v.y)
    }

    /// 线性部分的行列式
    ///
    /// 负值表示变换包含反射。
    pub fn determinant(&self) -> f64 {
        let m = &self.matrix;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// 是否为单位变换（考虑容差）
    pub fn is_identity(&self) -> bool {
        let id = Self::identity();
        self.matrix
            .iter()
            .flatten()
            .zip(id.matrix.iter().flatten())
            .all(|(a, b)| (a - b).abs() < EPSILON)
    }
}

impl std::ops::Mul for Transform2D {
    type Output = Transform2D;

    fn mul(self, rhs: Transform2D) -> Transform2D {
        self.then(&rhs)
    }
}
