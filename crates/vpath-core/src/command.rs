//! 路径命令
//!
//! 封闭的命令种类集合：Move/Line/Horizontal/Vertical/CubicCurve/
//! SmoothCubic/QuadraticCurve/SmoothQuadratic/Arc/ClosePath，
//! 每种都有绝对与相对两种坐标模式。
//!
//! 单个命令不携带自身的位置上下文；所有几何运算都需要外部传入
//! (first, prev, prev_control)：活动子路径起点、当前点、上一个
//! 控制点（绝对坐标）。

use crate::arc::{arc_to_triples, transformed_ellipse_axes, ArcParametrization};
use crate::bezier::{
    bezier_derivative, de_casteljau, de_casteljau_split, integrate, inverse_by_bisection, lerp,
    LengthSettings,
};
use crate::error::PathError;
use crate::math::{Point2, Vector2, EPSILON};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};

/// 命令的几何数据
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Move {
        to: Point2,
    },
    Line {
        to: Point2,
    },
    Horizontal {
        x: f64,
    },
    Vertical {
        y: f64,
    },
    CubicCurve {
        c1: Point2,
        c2: Point2,
        to: Point2,
    },
    SmoothCubic {
        c2: Point2,
        to: Point2,
    },
    QuadraticCurve {
        c: Point2,
        to: Point2,
    },
    SmoothQuadratic {
        to: Point2,
    },
    Arc {
        rx: f64,
        ry: f64,
        /// x轴旋转（度，SVG约定）
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point2,
    },
    ClosePath,
}

/// 路径命令：几何数据 + 坐标模式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub segment: Segment,
    pub relative: bool,
}

/// 语法字母到命令种类的静态映射表
pub const COMMAND_LETTERS: &[(char, usize)] = &[
    ('M', 2),
    ('L', 2),
    ('H', 1),
    ('V', 1),
    ('C', 6),
    ('S', 4),
    ('Q', 4),
    ('T', 2),
    ('A', 7),
    ('Z', 0),
];

/// 字母对应的参数个数；未知字母返回None
pub fn nargs_for_letter(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    COMMAND_LETTERS
        .iter()
        .find(|(l, _)| *l == upper)
        .map(|(_, n)| *n)
}

impl Command {
    /// 创建绝对命令
    pub fn absolute(segment: Segment) -> Self {
        Self {
            segment,
            relative: false,
        }
    }

    /// 创建相对命令
    pub fn relative(segment: Segment) -> Self {
        Self {
            segment,
            relative: true,
        }
    }

    pub fn is_absolute(&self) -> bool {
        !self.relative
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// 语法字母（绝对大写，相对小写）
    pub fn letter(&self) -> char {
        let upper = match self.segment {
            Segment::Move { .. } => 'M',
            Segment::Line { .. } => 'L',
            Segment::Horizontal { .. } => 'H',
            Segment::Vertical { .. } => 'V',
            Segment::CubicCurve { .. } => 'C',
            Segment::SmoothCubic { .. } => 'S',
            Segment::QuadraticCurve { .. } => 'Q',
            Segment::SmoothQuadratic { .. } => 'T',
            Segment::Arc { .. } => 'A',
            Segment::ClosePath => 'Z',
        };
        if self.relative {
            upper.to_ascii_lowercase()
        } else {
            upper
        }
    }

    /// 参数个数
    pub fn nargs(&self) -> usize {
        match self.segment {
            Segment::Move { .. } | Segment::Line { .. } | Segment::SmoothQuadratic { .. } => 2,
            Segment::Horizontal { .. } | Segment::Vertical { .. } => 1,
            Segment::CubicCurve { .. } => 6,
            Segment::SmoothCubic { .. } | Segment::QuadraticCurve { .. } => 4,
            Segment::Arc { .. } => 7,
            Segment::ClosePath => 0,
        }
    }

    /// 数值参数（布尔标志写作0/1）
    pub fn args(&self) -> Vec<f64> {
        match self.segment {
            Segment::Move { to } | Segment::Line { to } | Segment::SmoothQuadratic { to } => {
                vec![to.x, to.y]
            }
            Segment::Horizontal { x } => vec![x],
            Segment::Vertical { y } => vec![y],
            Segment::CubicCurve { c1, c2, to } => vec![c1.x, c1.y, c2.x, c2.y, to.x, to.y],
            Segment::SmoothCubic { c2, to } => vec![c2.x, c2.y, to.x, to.y],
            Segment::QuadraticCurve { c, to } => vec![c.x, c.y, to.x, to.y],
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => vec![
                rx,
                ry,
                x_rotation,
                large_arc as u8 as f64,
                sweep as u8 as f64,
                to.x,
                to.y,
            ],
            Segment::ClosePath => vec![],
        }
    }

    /// 从字母和参数构造命令
    ///
    /// 参数个数不符时立即报错，从不静默补齐或截断。
    pub fn from_letter_args(letter: char, args: &[f64]) -> Result<Self, PathError> {
        let expected = nargs_for_letter(letter).ok_or(PathError::UnknownCommand(letter))?;
        if args.len() != expected {
            return Err(PathError::ArgumentCount {
                letter,
                expected,
                got: args.len(),
            });
        }
        let segment = match letter.to_ascii_uppercase() {
            'M' => Segment::Move {
                to: Point2::new(args[0], args[1]),
            },
            'L' => Segment::Line {
                to: Point2::new(args[0], args[1]),
            },
            'H' => Segment::Horizontal { x: args[0] },
            'V' => Segment::Vertical { y: args[0] },
            'C' => Segment::CubicCurve {
                c1: Point2::new(args[0], args[1]),
                c2: Point2::new(args[2], args[3]),
                to: Point2::new(args[4], args[5]),
            },
            'S' => Segment::SmoothCubic {
                c2: Point2::new(args[0], args[1]),
                to: Point2::new(args[2], args[3]),
            },
            'Q' => Segment::QuadraticCurve {
                c: Point2::new(args[0], args[1]),
                to: Point2::new(args[2], args[3]),
            },
            'T' => Segment::SmoothQuadratic {
                to: Point2::new(args[0], args[1]),
            },
            'A' => Segment::Arc {
                rx: args[0],
                ry: args[1],
                x_rotation: args[2],
                large_arc: args[3] != 0.0,
                sweep: args[4] != 0.0,
                to: Point2::new(args[5], args[6]),
            },
            'Z' => Segment::ClosePath,
            _ => unreachable!(),
        };
        Ok(Self {
            segment,
            relative: letter.is_ascii_lowercase(),
        })
    }

    /// 转换为绝对坐标模式
    pub fn to_absolute(&self, prev: Point2) -> Self {
        if !self.relative {
            return *self;
        }
        let shift = prev.coords;
        let segment = match self.segment {
            Segment::Move { to } => Segment::Move { to: to + shift },
            Segment::Line { to } => Segment::Line { to: to + shift },
            Segment::Horizontal { x } => Segment::Horizontal { x: x + prev.x },
            Segment::Vertical { y } => Segment::Vertical { y: y + prev.y },
            Segment::CubicCurve { c1, c2, to } => Segment::CubicCurve {
                c1: c1 + shift,
                c2: c2 + shift,
                to: to + shift,
            },
            Segment::SmoothCubic { c2, to } => Segment::SmoothCubic {
                c2: c2 + shift,
                to: to + shift,
            },
            Segment::QuadraticCurve { c, to } => Segment::QuadraticCurve {
                c: c + shift,
                to: to + shift,
            },
            Segment::SmoothQuadratic { to } => Segment::SmoothQuadratic { to: to + shift },
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to: to + shift,
            },
            Segment::ClosePath => Segment::ClosePath,
        };
        Self::absolute(segment)
    }

    /// 转换为相对坐标模式
    pub fn to_relative(&self, prev: Point2) -> Self {
        if self.relative {
            return *self;
        }
        let shift = prev.coords;
        let segment = match self.segment {
            Segment::Move { to } => Segment::Move { to: to - shift },
            Segment::Line { to } => Segment::Line { to: to - shift },
            Segment::Horizontal { x } => Segment::Horizontal { x: x - prev.x },
            Segment::Vertical { y } => Segment::Vertical { y: y - prev.y },
            Segment::CubicCurve { c1, c2, to } => Segment::CubicCurve {
                c1: c1 - shift,
                c2: c2 - shift,
                to: to - shift,
            },
            Segment::SmoothCubic { c2, to } => Segment::SmoothCubic {
                c2: c2 - shift,
                to: to - shift,
            },
            Segment::QuadraticCurve { c, to } => Segment::QuadraticCurve {
                c: c - shift,
                to: to - shift,
            },
            Segment::SmoothQuadratic { to } => Segment::SmoothQuadratic { to: to - shift },
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to: to - shift,
            },
            Segment::ClosePath => Segment::ClosePath,
        };
        Self::relative(segment)
    }

    /// 解析命令的绝对终点
    pub fn end_point(&self, first: Point2, prev: Point2) -> Point2 {
        let abs = self.to_absolute(prev);
        match abs.segment {
            Segment::Move { to }
            | Segment::Line { to }
            | Segment::CubicCurve { to, .. }
            | Segment::SmoothCubic { to, .. }
            | Segment::QuadraticCurve { to, .. }
            | Segment::SmoothQuadratic { to }
            | Segment::Arc { to, .. } => to,
            Segment::Horizontal { x } => Point2::new(x, prev.y),
            Segment::Vertical { y } => Point2::new(prev.x, y),
            Segment::ClosePath => first,
        }
    }

    /// 平滑命令的隐式控制点：上一控制点关于当前点的反射
    fn reflected_control(prev: Point2, prev_control: Point2) -> Point2 {
        Point2::from(prev.coords * 2.0 - prev_control.coords)
    }

    /// 命令的定义点（绝对坐标）
    ///
    /// 直线类与弧只给出终点；平滑命令包含推导出的隐式控制点；
    /// ClosePath给出子路径起点。
    pub fn control_points(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
    ) -> Vec<Point2> {
        let end = self.end_point(first, prev);
        let abs = self.to_absolute(prev);
        match abs.segment {
            Segment::Move { .. }
            | Segment::Line { .. }
            | Segment::Horizontal { .. }
            | Segment::Vertical { .. }
            | Segment::Arc { .. } => vec![end],
            Segment::ClosePath => vec![first],
            Segment::CubicCurve { c1, c2, .. } => vec![c1, c2, end],
            Segment::SmoothCubic { c2, .. } => {
                vec![Self::reflected_control(prev, prev_control), c2, end]
            }
            Segment::QuadraticCurve { c, .. } => vec![c, end],
            Segment::SmoothQuadratic { .. } => {
                vec![Self::reflected_control(prev, prev_control), end]
            }
        }
    }

    /// 是否属于直线类（含Move与ClosePath）
    pub fn is_line_like(&self) -> bool {
        matches!(
            self.segment,
            Segment::Move { .. }
                | Segment::Line { .. }
                | Segment::Horizontal { .. }
                | Segment::Vertical { .. }
                | Segment::ClosePath
        )
    }

    /// Horizontal/Vertical 改写为等价的Line（保持坐标模式）
    ///
    /// 其他种类原样返回。
    pub fn to_line(&self, prev: Point2) -> Self {
        match self.segment {
            Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                let end = self.end_point(prev, prev);
                let line = Self::absolute(Segment::Line { to: end });
                if self.relative {
                    line.to_relative(prev)
                } else {
                    line
                }
            }
            _ => *self,
        }
    }

    /// 规范化为等价的绝对三次曲线
    ///
    /// Move与ClosePath没有不破坏子路径拓扑的曲线表示；Arc需要
    /// 曲线序列（用to_curves）。
    pub fn to_curve(&self, prev: Point2, prev_control: Point2) -> Result<Self, PathError> {
        let abs = self.to_absolute(prev);
        let segment = match abs.segment {
            Segment::Move { .. } | Segment::ClosePath | Segment::Arc { .. } => {
                return Err(PathError::NoCurveRepresentation(self.letter()));
            }
            Segment::Line { to } => Segment::CubicCurve {
                c1: prev,
                c2: to,
                to,
            },
            Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                let to = self.end_point(prev, prev);
                Segment::CubicCurve {
                    c1: prev,
                    c2: to,
                    to,
                }
            }
            Segment::CubicCurve { .. } => abs.segment,
            Segment::SmoothCubic { c2, to } => Segment::CubicCurve {
                c1: Self::reflected_control(prev, prev_control),
                c2,
                to,
            },
            Segment::QuadraticCurve { c, to } => {
                // 二次升三次
                let c1 = lerp(&prev, &c, 2.0 / 3.0);
                let c2 = lerp(&to, &c, 2.0 / 3.0);
                Segment::CubicCurve { c1, c2, to }
            }
            Segment::SmoothQuadratic { to } => {
                let c = Self::reflected_control(prev, prev_control);
                let c1 = lerp(&prev, &c, 2.0 / 3.0);
                let c2 = lerp(&to, &c, 2.0 / 3.0);
                Segment::CubicCurve { c1, c2, to }
            }
        };
        Ok(Self::absolute(segment))
    }

    /// 规范化为绝对三次曲线序列
    ///
    /// 弧按不超过90度的扇区逐段近似，其余种类得到单元素序列。
    pub fn to_curves(
        &self,
        prev: Point2,
        prev_control: Point2,
    ) -> Result<Vec<Self>, PathError> {
        let abs = self.to_absolute(prev);
        if let Segment::Arc {
            rx,
            ry,
            x_rotation,
            large_arc,
            sweep,
            to,
        } = abs.segment
        {
            let triples = arc_to_triples(prev, rx, ry, x_rotation, large_arc, sweep, to);
            let curves = triples
                .windows(2)
                .map(|w| {
                    Self::absolute(Segment::CubicCurve {
                        c1: w[0][2],
                        c2: w[1][0],
                        to: w[1][1],
                    })
                })
                .collect();
            return Ok(curves);
        }
        Ok(vec![self.to_curve(prev, prev_control)?])
    }

    /// 曲线类命令的绝对控制多边形（含起点）
    fn control_polygon(&self, prev: Point2, prev_control: Point2) -> Option<Vec<Point2>> {
        let abs = self.to_absolute(prev);
        match abs.segment {
            Segment::CubicCurve { c1, c2, to } => Some(vec![prev, c1, c2, to]),
            Segment::SmoothCubic { c2, to } => Some(vec![
                prev,
                Self::reflected_control(prev, prev_control),
                c2,
                to,
            ]),
            Segment::QuadraticCurve { c, to } => Some(vec![prev, c, to]),
            Segment::SmoothQuadratic { to } => Some(vec![
                prev,
                Self::reflected_control(prev, prev_control),
                to,
            ]),
            _ => None,
        }
    }

    /// 弧命令的圆心参数化（非弧或退化弧返回None）
    fn parametrize(&self, prev: Point2) -> Option<ArcParametrization> {
        if let Segment::Arc {
            rx,
            ry,
            x_rotation,
            large_arc,
            sweep,
            to,
        } = self.to_absolute(prev).segment
        {
            ArcParametrization::from_endpoints(prev, to, rx, ry, x_rotation, large_arc, sweep)
        } else {
            None
        }
    }

    fn check_t(t: f64) -> Result<(), PathError> {
        if !(0.0..=1.0).contains(&t) {
            return Err(PathError::ParameterOutOfRange(t));
        }
        Ok(())
    }

    /// 参数t处的位置
    ///
    /// 直线类用线性插值，Bezier用De Casteljau求值，弧用椭圆
    /// 参数化的三角求值。
    pub fn point(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t: f64,
    ) -> Result<Point2, PathError> {
        Self::check_t(t)?;
        if self.is_line_like() {
            let end = self.end_point(first, prev);
            return Ok(lerp(&prev, &end, t));
        }
        if let Some(polygon) = self.control_polygon(prev, prev_control) {
            return Ok(de_casteljau(&polygon, t));
        }
        match self.parametrize(prev) {
            Some(param) => Ok(param.point_at(t)),
            // 退化弧按直线处理
            None => {
                let end = self.end_point(first, prev);
                Ok(lerp(&prev, &end, t))
            }
        }
    }

    /// 参数t处的n阶导数
    ///
    /// n必须为正整数；零长度的直线类命令导数无定义。
    pub fn derivative(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t: f64,
        n: u32,
    ) -> Result<Vector2, PathError> {
        Self::check_t(t)?;
        if n == 0 {
            return Err(PathError::ZeroDerivativeOrder);
        }
        if self.is_line_like() {
            let d = self.end_point(first, prev) - prev;
            if d.norm() < EPSILON {
                return Err(PathError::ZeroLengthSegment);
            }
            return Ok(if n == 1 { d } else { Vector2::zeros() });
        }
        if let Some(polygon) = self.control_polygon(prev, prev_control) {
            return Ok(bezier_derivative(&polygon, t, n));
        }
        match self.parametrize(prev) {
            Some(param) => Ok(param.derivative_at(t, n)),
            None => {
                let d = self.end_point(first, prev) - prev;
                if d.norm() < EPSILON {
                    return Err(PathError::ZeroLengthSegment);
                }
                Ok(if n == 1 { d } else { Vector2::zeros() })
            }
        }
    }

    /// 参数t处的有符号曲率
    ///
    /// 所有直线类命令曲率恒为零。
    pub fn curvature(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t: f64,
    ) -> Result<f64, PathError> {
        Self::check_t(t)?;
        if self.is_line_like() {
            return Ok(0.0);
        }
        let d1 = self.derivative(first, prev, prev_control, t, 1)?;
        let d2 = self.derivative(first, prev, prev_control, t, 2)?;
        let speed = d1.norm();
        if speed < EPSILON {
            return Err(PathError::ZeroLengthSegment);
        }
        Ok((d1.x * d2.y - d1.y * d2.x) / speed.powi(3))
    }

    /// 参数t处的单位法线：切线逆时针旋转90度
    pub fn normal(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t: f64,
    ) -> Result<Vector2, PathError> {
        let d = self.derivative(first, prev, prev_control, t, 1)?;
        let speed = d.norm();
        if speed < EPSILON {
            return Err(PathError::ZeroLengthSegment);
        }
        Ok(Vector2::new(-d.y / speed, d.x / speed))
    }

    /// 参数区间[t0, t1]上的弧长
    ///
    /// 直线类精确计算；曲线与弧对速度函数做自适应Simpson积分，
    /// 细分深度有界，必然终止。
    pub fn length(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t0: f64,
        t1: f64,
        settings: &LengthSettings,
    ) -> Result<f64, PathError> {
        Self::check_t(t0)?;
        Self::check_t(t1)?;
        if t0 > t1 {
            return Err(PathError::ParameterOutOfRange(t0));
        }
        if self.is_line_like() {
            let d = self.end_point(first, prev) - prev;
            return Ok(d.norm() * (t1 - t0));
        }
        if let Some(polygon) = self.control_polygon(prev, prev_control) {
            let speed = |t: f64| bezier_derivative(&polygon, t, 1).norm();
            return Ok(integrate(&speed, t0, t1, settings.error, settings.max_depth));
        }
        match self.parametrize(prev) {
            Some(param) => {
                let speed = |t: f64| param.speed_at(t);
                Ok(integrate(&speed, t0, t1, settings.error, settings.max_depth))
            }
            None => {
                let d = self.end_point(first, prev) - prev;
                Ok(d.norm() * (t1 - t0))
            }
        }
    }

    /// 弧长反函数：求满足 length(0, t) == s 的参数t
    ///
    /// 弧长函数单调不减，用二分求根。
    pub fn inverse_length(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        s: f64,
        settings: &LengthSettings,
    ) -> Result<f64, PathError> {
        let total = self.length(first, prev, prev_control, 0.0, 1.0, settings)?;
        if s < -settings.error || s > total + settings.error {
            return Err(PathError::LengthOutOfRange(s));
        }
        if total < EPSILON {
            return Ok(0.0);
        }
        if self.is_line_like() {
            return Ok((s / total).clamp(0.0, 1.0));
        }
        let length_to = |t: f64| {
            self.length(first, prev, prev_control, 0.0, t, settings)
                .unwrap_or(0.0)
        };
        Ok(inverse_by_bisection(length_to, s, settings.error.max(1e-12)))
    }

    /// 在参数t处拆分为同族、同坐标模式的两个命令
    ///
    /// 曲线类用De Casteljau细分（平滑简写会实体化为完整曲线，
    /// 因为反射上下文在拆分后不再成立）；直线类做区间拆分；
    /// ClosePath拆成直线加ClosePath；Move拆分会改变子路径拓扑，
    /// 直接报错。
    pub fn split(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        t: f64,
    ) -> Result<(Self, Self), PathError> {
        Self::check_t(t)?;
        let relative = self.relative;
        // 绝对几何拆分后按原坐标模式重新表达
        let remode = |cmd: Self, base: Point2| {
            if relative {
                cmd.to_relative(base)
            } else {
                cmd
            }
        };
        match self.segment {
            Segment::Move { .. } => Err(PathError::NotSplittable(self.letter())),
            Segment::Line { .. } | Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                let end = self.end_point(first, prev);
                let mid = lerp(&prev, &end, t);
                let make = |to: Point2| match self.segment {
                    Segment::Horizontal { .. } => Segment::Horizontal { x: to.x },
                    Segment::Vertical { .. } => Segment::Vertical { y: to.y },
                    _ => Segment::Line { to },
                };
                Ok((
                    remode(Self::absolute(make(mid)), prev),
                    remode(Self::absolute(make(end)), mid),
                ))
            }
            Segment::ClosePath => {
                let mid = lerp(&prev, &first, t);
                Ok((
                    remode(Self::absolute(Segment::Line { to: mid }), prev),
                    Self {
                        segment: Segment::ClosePath,
                        relative,
                    },
                ))
            }
            Segment::CubicCurve { .. } | Segment::SmoothCubic { .. } => {
                let polygon = self
                    .control_polygon(prev, prev_control)
                    .expect("curve kinds have a control polygon");
                let (left, right) = de_casteljau_split(&polygon, t);
                let mid = left[3];
                Ok((
                    remode(
                        Self::absolute(Segment::CubicCurve {
                            c1: left[1],
                            c2: left[2],
                            to: left[3],
                        }),
                        prev,
                    ),
                    remode(
                        Self::absolute(Segment::CubicCurve {
                            c1: right[1],
                            c2: right[2],
                            to: right[3],
                        }),
                        mid,
                    ),
                ))
            }
            Segment::QuadraticCurve { .. } | Segment::SmoothQuadratic { .. } => {
                let polygon = self
                    .control_polygon(prev, prev_control)
                    .expect("curve kinds have a control polygon");
                let (left, right) = de_casteljau_split(&polygon, t);
                let mid = left[2];
                Ok((
                    remode(
                        Self::absolute(Segment::QuadraticCurve {
                            c: left[1],
                            to: left[2],
                        }),
                        prev,
                    ),
                    remode(
                        Self::absolute(Segment::QuadraticCurve {
                            c: right[1],
                            to: right[2],
                        }),
                        mid,
                    ),
                ))
            }
            Segment::Arc {
                x_rotation, sweep, ..
            } => {
                let abs_to = self.end_point(first, prev);
                match self.parametrize(prev) {
                    Some(param) => {
                        let mid = param.point_at(t);
                        // 两半的large-arc标志按各自的角跨度重新计算
                        let delta1 = param.delta_theta * t;
                        let delta2 = param.delta_theta * (1.0 - t);
                        let make = |large: bool, end: Point2| {
                            Self::absolute(Segment::Arc {
                                rx: param.rx,
                                ry: param.ry,
                                x_rotation,
                                large_arc: large,
                                sweep,
                                to: end,
                            })
                        };
                        Ok((
                            remode(make(delta1.abs() > std::f64::consts::PI, mid), prev),
                            remode(make(delta2.abs() > std::f64::consts::PI, abs_to), mid),
                        ))
                    }
                    None => {
                        // 退化弧按直线区间拆分，保持Arc种类
                        let mid = lerp(&prev, &abs_to, t);
                        let make = |end: Point2| {
                            let mut seg = self.to_absolute(prev).segment;
                            if let Segment::Arc { to: ref mut p, .. } = seg {
                                *p = end;
                            }
                            Self::absolute(seg)
                        };
                        Ok((remode(make(mid), prev), remode(make(abs_to), mid)))
                    }
                }
            }
        }
    }

    /// 保持种类的仿射变换
    ///
    /// 绝对命令的点经过完整仿射映射；相对命令的增量只经过线性
    /// 部分。Horizontal/Vertical无法在一般仿射映射下保持自身种类，
    /// 须先用`to_line`改写，否则报错。Arc由变换后椭圆的主轴重建
    /// 半径与旋转，反射（行列式为负）翻转sweep标志。
    pub fn transform(&self, matrix: &Transform2D) -> Result<Self, PathError> {
        let map_point = |p: &Point2| {
            if self.relative {
                Point2::from(matrix.apply_to_vector(&p.coords))
            } else {
                matrix.apply_to_point(p)
            }
        };
        let segment = match self.segment {
            Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                return Err(PathError::UntransformableShorthand(self.letter()));
            }
            Segment::Move { to } => Segment::Move { to: map_point(&to) },
            Segment::Line { to } => Segment::Line { to: map_point(&to) },
            Segment::CubicCurve { c1, c2, to } => Segment::CubicCurve {
                c1: map_point(&c1),
                c2: map_point(&c2),
                to: map_point(&to),
            },
            Segment::SmoothCubic { c2, to } => Segment::SmoothCubic {
                c2: map_point(&c2),
                to: map_point(&to),
            },
            Segment::QuadraticCurve { c, to } => Segment::QuadraticCurve {
                c: map_point(&c),
                to: map_point(&to),
            },
            Segment::SmoothQuadratic { to } => Segment::SmoothQuadratic { to: map_point(&to) },
            Segment::ClosePath => Segment::ClosePath,
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => {
                let m = &matrix.matrix;
                let phi = x_rotation.to_radians();
                let (sin_phi, cos_phi) = phi.sin_cos();
                // 椭圆矩阵 E = R(phi)·diag(rx, ry)，复合 L·E 后取主轴
                let e = [
                    [rx * cos_phi, -ry * sin_phi],
                    [rx * sin_phi, ry * cos_phi],
                ];
                let composed = [
                    [
                        m[0][0] * e[0][0] + m[0][1] * e[1][0],
                        m[0][0] * e[0][1] + m[0][1] * e[1][1],
                    ],
                    [
                        m[1][0] * e[0][0] + m[1][1] * e[1][0],
                        m[1][0] * e[0][1] + m[1][1] * e[1][1],
                    ],
                ];
                let (new_rx, new_ry, new_phi) = transformed_ellipse_axes(composed);
                let new_sweep = if matrix.determinant() < 0.0 {
                    !sweep
                } else {
                    sweep
                };
                Segment::Arc {
                    rx: new_rx,
                    ry: new_ry,
                    x_rotation: new_phi.to_degrees(),
                    large_arc,
                    sweep: new_sweep,
                    to: map_point(&to),
                }
            }
        };
        Ok(Self {
            segment,
            relative: self.relative,
        })
    }

    /// 平移
    pub fn translate(&self, offset: Vector2) -> Result<Self, PathError> {
        self.transform(&Transform2D::translate(offset.x, offset.y))
    }

    /// 缩放
    pub fn scale(&self, sx: f64, sy: f64) -> Result<Self, PathError> {
        self.transform(&Transform2D::scale(sx, sy))
    }

    /// 绕指定中心旋转（弧度）
    pub fn rotate(&self, angle: f64, center: Point2) -> Result<Self, PathError> {
        self.transform(&Transform2D::rotate_around(angle, center))
    }

    /// 命令对包围盒的贡献
    ///
    /// 直线类贡献终点；Bezier按单轴极值方程求内部驻点；弧取
    /// 旋转椭圆的轴向驻点与角跨度的交集。起点由调用方负责。
    pub fn extend_bounding_box(
        &self,
        first: Point2,
        prev: Point2,
        prev_control: Point2,
        bbox: &mut crate::math::BoundingBox2,
    ) {
        let end = self.end_point(first, prev);
        bbox.expand_to_include(&end);
        if self.is_line_like() {
            return;
        }
        if let Some(polygon) = self.control_polygon(prev, prev_control) {
            let (min_x, max_x, min_y, max_y) = match polygon.len() {
                4 => {
                    let (min_x, max_x) = crate::bezier::cubic_extrema_1d(
                        polygon[0].x,
                        polygon[1].x,
                        polygon[2].x,
                        polygon[3].x,
                    );
                    let (min_y, max_y) = crate::bezier::cubic_extrema_1d(
                        polygon[0].y,
                        polygon[1].y,
                        polygon[2].y,
                        polygon[3].y,
                    );
                    (min_x, max_x, min_y, max_y)
                }
                _ => {
                    let (min_x, max_x) = crate::bezier::quadratic_extrema_1d(
                        polygon[0].x,
                        polygon[1].x,
                        polygon[2].x,
                    );
                    let (min_y, max_y) = crate::bezier::quadratic_extrema_1d(
                        polygon[0].y,
                        polygon[1].y,
                        polygon[2].y,
                    );
                    (min_x, max_x, min_y, max_y)
                }
            };
            bbox.expand_to_include(&Point2::new(min_x, min_y));
            bbox.expand_to_include(&Point2::new(max_x, max_y));
            return;
        }
        if let Some(param) = self.parametrize(prev) {
            for p in param.axis_extrema() {
                bbox.expand_to_include(&p);
            }
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
