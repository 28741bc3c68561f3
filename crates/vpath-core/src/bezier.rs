//! Bezier曲线数值算法
//!
//! 提供：
//! - De Casteljau求值与细分
//! - 导数控制多边形
//! - 单轴极值求解（用于包围盒）
//! - 自适应Simpson积分（用于弧长）
//! - 弧长反函数的二分求根

use crate::math::{Point2, Vector2};

/// 弧长计算设置
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LengthSettings {
    /// 误差容限
    pub error: f64,
    /// 自适应细分的最大深度
    pub max_depth: u32,
}

impl Default for LengthSettings {
    fn default() -> Self {
        Self {
            error: 1e-9,
            max_depth: 30,
        }
    }
}

impl LengthSettings {
    /// 以指定误差容限创建
    pub fn with_error(error: f64) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

/// 点的线性插值
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// De Casteljau求值，控制点数决定曲线阶数
pub fn de_casteljau(points: &[Point2], t: f64) -> Point2 {
    debug_assert!(!points.is_empty());
    let mut work = points.to_vec();
    let mut n = work.len();
    while n > 1 {
        for i in 0..n - 1 {
            work[i] = lerp(&work[i], &work[i + 1], t);
        }
        n -= 1;
    }
    work[0]
}

/// De Casteljau细分：在参数t处拆成两段同阶曲线
pub fn de_casteljau_split(points: &[Point2], t: f64) -> (Vec<Point2>, Vec<Point2>) {
    let mut work = points.to_vec();
    let mut left = Vec::with_capacity(points.len());
    let mut right = Vec::with_capacity(points.len());
    let mut n = work.len();
    left.push(work[0]);
    right.push(work[n - 1]);
    while n > 1 {
        for i in 0..n - 1 {
            work[i] = lerp(&work[i], &work[i + 1], t);
        }
        n -= 1;
        left.push(work[0]);
        right.push(work[n - 1]);
    }
    right.reverse();
    (left, right)
}

/// n阶导数的控制多边形
///
/// 每求导一次，控制点数减一；阶数耗尽后导数恒为零。
pub fn derivative_polygon(points: &[Point2], n: u32) -> Vec<Point2> {
    let mut work = points.to_vec();
    for _ in 0..n {
        if work.len() < 2 {
            return vec![Point2::origin()];
        }
        let degree = (work.len() - 1) as f64;
        work = work
            .windows(2)
            .map(|w| Point2::from((w[1] - w[0]) * degree))
            .collect();
    }
    work
}

/// Bezier曲线在参数t处的n阶导数
pub fn bezier_derivative(points: &[Point2], t: f64, n: u32) -> Vector2 {
    let polygon = derivative_polygon(points, n);
    de_casteljau(&polygon, t).coords
}

/// 三次Bezier单轴极值区间
///
/// 解 d/dt B(t) = 0（关于t的二次方程），只保留(0,1)内的实根，
/// 与两端点合并。
pub fn cubic_extrema_1d(p0: f64, p1: f64, p2: f64, p3: f64) -> (f64, f64) {
    let mut min = p0.min(p3);
    let mut max = p0.max(p3);

    let a = 3.0 * (-p0 + 3.0 * p1 - 3.0 * p2 + p3);
    let b = 6.0 * (p0 - 2.0 * p1 + p2);
    let c = 3.0 * (p1 - p0);

    let mut consider = |t: f64| {
        if t > 0.0 && t < 1.0 {
            let x = eval_cubic_1d(p0, p1, p2, p3, t);
            min = min.min(x);
            max = max.max(x);
        }
    };

    if a.abs() < f64::EPSILON {
        // 退化为线性方程
        if b.abs() > f64::EPSILON {
            consider(-c / b);
        }
        return (min, max);
    }

    let d = b * b - 4.0 * a * c;
    if d < 0.0 {
        return (min, max);
    }
    let sqrt_d = d.sqrt();
    consider((-b - sqrt_d) / (2.0 * a));
    consider((-b + sqrt_d) / (2.0 * a));
    (min, max)
}

/// 二次Bezier单轴极值区间
///
/// d/dt B(t) = 0 是线性方程。
pub fn quadratic_extrema_1d(p0: f64, p1: f64, p2: f64) -> (f64, f64) {
    let mut min = p0.min(p2);
    let mut max = p0.max(p2);

    let denominator = p0 - 2.0 * p1 + p2;
    if denominator.abs() > f64::EPSILON {
        let t = (p0 - p1) / denominator;
        if t > 0.0 && t < 1.0 {
            let x = eval_quadratic_1d(p0, p1, p2, t);
            min = min.min(x);
            max = max.max(x);
        }
    }
    (min, max)
}

fn eval_cubic_1d(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

fn eval_quadratic_1d(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// 自适应Simpson积分
///
/// 细分深度达到 `max_depth` 时直接返回当前近似值，保证终止。
pub fn integrate<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, error: f64, max_depth: u32) -> f64 {
    let fa = f(a);
    let fb = f(b);
    let m = (a + b) / 2.0;
    let fm = f(m);
    let whole = simpson(a, b, fa, fm, fb);
    adaptive_step(f, a, b, fa, fm, fb, whole, error, max_depth)
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[allow(clippy::too_many_arguments)]
fn adaptive_step<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    error: f64,
    depth: u32,
) -> f64 {
    let m = (a + b) / 2.0;
    let lm = (a + m) / 2.0;
    let rm = (m + b) / 2.0;
    let flm = f(lm);
    let frm = f(rm);
    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15.0 * error {
        left + right + delta / 15.0
    } else {
        adaptive_step(f, a, m, fa, flm, fm, left, error / 2.0, depth - 1)
            + adaptive_step(f, m, b, fm, frm, fb, right, error / 2.0, depth - 1)
    }
}

/// 弧长反函数的二分求根
///
/// `length_to` 必须是单调不减的累计弧长函数，返回满足
/// `length_to(t) == s` 的参数t。
pub fn inverse_by_bisection<F: Fn(f64) -> f64>(length_to: F, s: f64, error: f64) -> f64 {
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    // 每次迭代区间减半，误差有限所以必然终止
    for _ in 0..100 {
        let mid = (lo + hi) / 2.0;
        let len = length_to(mid);
        if (len - s).abs() <= error || (hi - lo) / 2.0 < f64::EPSILON {
            return mid;
        }
        if len < s {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}
