//! 椭圆弧参数化
//!
//! SVG弧命令存储 (rx, ry, x轴旋转, large-arc标志, sweep标志, 终点)，
//! 本模块按需推导隐式椭圆 (圆心, 半径, 旋转, 起始角, 角跨度)，
//! 并提供：
//! - 参数点求值与解析导数
//! - 轴向驻点角求解（用于包围盒）
//! - 弧转三次Bezier近似
//! - 仿射映射下椭圆主轴的重建（用于保类型变换）

use crate::math::{point_is_close, Point2, Vector2};
use std::f64::consts::{PI, TAU};

/// 椭圆弧的圆心参数化
///
/// 角度均为弧度；`delta_theta`的符号由sweep标志决定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParametrization {
    pub center: Point2,
    pub rx: f64,
    pub ry: f64,
    pub x_rotation: f64,
    pub theta1: f64,
    pub delta_theta: f64,
}

/// 从u到v的有符号夹角
fn vector_angle(u: Vector2, v: Vector2) -> f64 {
    (u.x * v.y - u.y * v.x).atan2(u.dot(&v))
}

impl ArcParametrization {
    /// 端点参数化转圆心参数化
    ///
    /// 半径过小时按比例放大（λ修正）；退化弧（半径为零或端点重合）
    /// 返回None，调用方按直线处理。
    pub fn from_endpoints(
        start: Point2,
        end: Point2,
        rx: f64,
        ry: f64,
        x_rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Self> {
        if rx == 0.0 || ry == 0.0 || point_is_close(&start, &end) {
            return None;
        }
        let phi = x_rotation_deg.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();

        // 中点变换到椭圆自身坐标系
        let dx = (start.x - end.x) / 2.0;
        let dy = (start.y - end.y) / 2.0;
        let x1p = cos_phi * dx + sin_phi * dy;
        let y1p = -sin_phi * dx + cos_phi * dy;

        let mut rx = rx.abs();
        let mut ry = ry.abs();
        let mut rx2 = rx * rx;
        let mut ry2 = ry * ry;
        let x1p2 = x1p * x1p;
        let y1p2 = y1p * y1p;

        // 半径不足以张开弦时等比放大
        let lambda = x1p2 / rx2 + y1p2 / ry2;
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
            rx2 *= lambda;
            ry2 *= lambda;
        }

        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let num = (rx2 * ry2 - rx2 * y1p2 - ry2 * x1p2).max(0.0);
        let multiplier = sign * (num / (rx2 * y1p2 + ry2 * x1p2)).sqrt();
        let cxp = multiplier * rx * y1p / ry;
        let cyp = -multiplier * ry * x1p / rx;

        let center = Point2::new(
            cos_phi * cxp - sin_phi * cyp + (start.x + end.x) / 2.0,
            sin_phi * cxp + cos_phi * cyp + (start.y + end.y) / 2.0,
        );

        let v1 = Vector2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v2 = Vector2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let theta1 = vector_angle(Vector2::new(1.0, 0.0), v1);
        let mut delta_theta = vector_angle(v1, v2);
        if !sweep && delta_theta > 0.0 {
            delta_theta -= TAU;
        } else if sweep && delta_theta < 0.0 {
            delta_theta += TAU;
        }

        Some(Self {
            center,
            rx,
            ry,
            x_rotation: phi,
            theta1,
            delta_theta,
        })
    }

    /// 椭圆上角度theta处的点
    pub fn point_at_angle(&self, theta: f64) -> Point2 {
        let (sin_phi, cos_phi) = self.x_rotation.sin_cos();
        let (sin_t, cos_t) = theta.sin_cos();
        Point2::new(
            self.center.x + self.rx * cos_t * cos_phi - self.ry * sin_t * sin_phi,
            self.center.y + self.rx * cos_t * sin_phi + self.ry * sin_t * cos_phi,
        )
    }

    /// 弧上参数t∈[0,1]处的点
    pub fn point_at(&self, t: f64) -> Point2 {
        self.point_at_angle(self.theta1 + t * self.delta_theta)
    }

    /// 参数t处关于t的n阶导数
    ///
    /// theta(t)关于t是线性的，链式法则给出每求导一次乘一个
    /// delta_theta因子，三角函数相位前移 pi/2。
    pub fn derivative_at(&self, t: f64, n: u32) -> Vector2 {
        let theta = self.theta1 + t * self.delta_theta;
        let shift = n as f64 * PI / 2.0;
        let factor = self.delta_theta.powi(n as i32);
        let (sin_phi, cos_phi) = self.x_rotation.sin_cos();
        let dx = self.rx * (theta + shift).cos() * factor;
        let dy = self.ry * (theta + shift).sin() * factor;
        Vector2::new(
            dx * cos_phi - dy * sin_phi,
            dx * sin_phi + dy * cos_phi,
        )
    }

    /// 参数t处的速度（|dp/dt|）
    pub fn speed_at(&self, t: f64) -> f64 {
        let theta = self.theta1 + t * self.delta_theta;
        let (sin_t, cos_t) = theta.sin_cos();
        let dx = self.rx * sin_t;
        let dy = self.ry * cos_t;
        self.delta_theta.abs() * (dx * dx + dy * dy).sqrt()
    }

    /// 角度是否落在弧的角跨度内
    pub fn contains_angle(&self, theta: f64) -> bool {
        let (lo, hi) = if self.delta_theta >= 0.0 {
            (self.theta1, self.theta1 + self.delta_theta)
        } else {
            (self.theta1 + self.delta_theta, self.theta1)
        };
        let normalized = lo + (theta - lo).rem_euclid(TAU);
        normalized <= hi
    }

    /// 弧跨度内的轴向驻点
    ///
    /// 解旋转椭圆在x、y轴上的驻点条件，再与实际角跨度求交。
    pub fn axis_extrema(&self) -> Vec<Point2> {
        let (sin_phi, cos_phi) = self.x_rotation.sin_cos();
        // dx/dtheta = 0: tan(theta) = -ry*sin(phi) / (rx*cos(phi))
        let theta_x = (-self.ry * sin_phi).atan2(self.rx * cos_phi);
        // dy/dtheta = 0: tan(theta) = ry*cos(phi) / (rx*sin(phi))
        let theta_y = (self.ry * cos_phi).atan2(self.rx * sin_phi);

        let mut points = Vec::with_capacity(4);
        for theta in [theta_x, theta_x + PI, theta_y, theta_y + PI] {
            if self.contains_angle(theta) {
                points.push(self.point_at_angle(theta));
            }
        }
        points
    }
}

/// 2x2线性映射下椭圆主轴的闭式重建
///
/// 椭圆是单位圆在 E = R(phi)·diag(rx,ry) 下的像；仿射变换线性部分L
/// 作用后的新椭圆由 M = L·E 的奇异值分解给出：
/// M = R(phi')·diag(rx', ry')·R(psi)。返回 (rx', ry', phi')。
pub fn transformed_ellipse_axes(m: [[f64; 2]; 2]) -> (f64, f64, f64) {
    let e = (m[0][0] + m[1][1]) / 2.0;
    let f = (m[0][0] - m[1][1]) / 2.0;
    let g = (m[1][0] + m[0][1]) / 2.0;
    let h = (m[1][0] - m[0][1]) / 2.0;

    let q = (e * e + h * h).sqrt();
    let r = (f * f + g * g).sqrt();
    let a1 = g.atan2(f);
    let a2 = h.atan2(e);

    let rx = q + r;
    let ry = (q - r).abs();
    let phi = (a2 + a1) / 2.0;
    (rx, ry, phi)
}

/// 弧转三次Bezier控制点三元组序列
///
/// 返回 [进入控制点, 节点, 离开控制点] 列表，首尾三元组的外侧
/// 控制点与节点重合。把椭圆变换为单位圆后按不超过90度的扇区
/// 逐段近似，半径不足以张开弦时圆心取弦中点。
pub fn arc_to_triples(
    start: Point2,
    rx: f64,
    ry: f64,
    x_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    end: Point2,
) -> Vec<[Point2; 3]> {
    if rx == 0.0 || ry == 0.0 || point_is_close(&start, &end) {
        return vec![[start, start, start], [end, end, end]];
    }
    let phi = x_rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // 把椭圆压成单位圆（未平移到原点）
    let to_unit = |p: &Point2| {
        let x = cos_phi * p.x + sin_phi * p.y;
        let y = -sin_phi * p.x + cos_phi * p.y;
        let (x, y) = (x / rx.abs(), y / ry.abs());
        Point2::new(
            cos_phi * x - sin_phi * y,
            sin_phi * x + cos_phi * y,
        )
    };
    let from_unit = |p: &Point2| {
        let x = cos_phi * p.x + sin_phi * p.y;
        let y = -sin_phi * p.x + cos_phi * p.y;
        let (x, y) = (x * rx.abs(), y * ry.abs());
        Point2::new(
            cos_phi * x - sin_phi * y,
            sin_phi * x + cos_phi * y,
        )
    };

    let a = to_unit(&start);
    let b = to_unit(&end);

    // 弦的单位法线，指向圆心
    let chord = b - a;
    let chord_len2 = chord.norm_squared();
    let mut normal = Vector2::new(-chord.y, chord.x) / chord_len2.sqrt();
    // 单位圆内弦心距
    let mut dist = (1.0 - chord_len2 / 4.0).max(0.0).sqrt();
    if large_arc != sweep {
        dist = -dist;
    }
    normal *= dist;
    let center = Point2::new(
        (a.x + b.x) / 2.0 + normal.x,
        (a.y + b.y) / 2.0 + normal.y,
    );

    let oa = a - center;
    let ob = b - center;
    let mut theta_start = (oa.x / oa.norm()).acos();
    if oa.y < 0.0 {
        theta_start = -theta_start;
    }
    let mut theta_end = (ob.x / ob.norm()).acos();
    if ob.y < 0.0 {
        theta_end = -theta_end;
    }
    if theta_start < theta_end && !sweep {
        theta_start += TAU;
    }
    if theta_end < theta_start && sweep {
        theta_end += TAU;
    }

    let sectors = ((theta_end - theta_start).abs() * 2.0 / PI) as usize + 1;
    let d_theta = (theta_end - theta_start) / sectors as f64;
    // 单位圆扇区的Bezier切线手柄长度
    let v = 4.0 * (d_theta / 4.0).tan() / 3.0;

    let mut triples = Vec::with_capacity(sectors + 1);
    for i in 0..=sectors {
        let angle = theta_start + i as f64 * d_theta;
        let (sin_a, cos_a) = angle.sin_cos();
        let node = Point2::new(center.x + cos_a, center.y + sin_a);
        let tangent = Vector2::new(-sin_a, cos_a);
        let ctrl_in = node - tangent * v;
        let ctrl_out = node + tangent * v;
        triples.push([ctrl_in, node, ctrl_out]);
    }
    triples[0][0] = triples[0][1];
    let last = triples.len() - 1;
    triples[last][2] = triples[last][1];

    for triple in &mut triples {
        for p in triple.iter_mut() {
            *p = from_unit(p);
        }
    }
    triples
}
