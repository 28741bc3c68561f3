//! 路径：有序命令序列与整体操作
//!
//! 支持的整体操作：
//! - 文本解析与序列化（数值往返精确）
//! - 绝对/相对坐标改写
//! - 反转、按子路径拆分
//! - 保持种类的仿射变换（平移/缩放/旋转/任意矩阵）
//! - 包围盒聚合
//! - 控制点与端点的惰性序列
//!
//! 整体操作默认返回新Path（写时复制），需要就地修改时使用
//! 显式的 `*_in_place` 变体。

use crate::command::{Command, Segment};
use crate::error::PathError;
use crate::math::{BoundingBox2, Point2, EPSILON};
use crate::parser::PathParser;
use crate::transform::Transform2D;
use crate::walk::{LocatedCommand, PathWalker};
use serde::{Deserialize, Serialize};

/// 路径：有序的命令序列
///
/// 插入顺序即绘制顺序；非空路径在概念上以Move开始，缺少Move的
/// 路径视为从原点隐式开始。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    commands: Vec<Command>,
}

impl Path {
    /// 空路径
    pub fn new() -> Self {
        Self::default()
    }

    /// 从路径数据文本解析（宽容，永不失败）
    pub fn parse(text: &str) -> Self {
        Self {
            commands: PathParser::parse(text),
        }
    }

    /// 从 (字母, 参数) 序列构造
    ///
    /// 参数个数不符立即报错。
    pub fn from_arrays(arrays: &[(char, Vec<f64>)]) -> Result<Self, PathError> {
        let commands = arrays
            .iter()
            .map(|(letter, args)| Command::from_letter_args(*letter, args))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { commands })
    }

    /// 从点列表构造折线（全部为绝对Line命令）
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        Self {
            commands: points
                .into_iter()
                .map(|to| Command::absolute(Segment::Line { to }))
                .collect(),
        }
    }

    /// 导出为 (字母, 参数) 序列
    pub fn to_arrays(&self) -> Vec<(char, Vec<f64>)> {
        self.commands
            .iter()
            .map(|cmd| (cmd.letter(), cmd.args()))
            .collect()
    }

    /// 命令切片
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// 带状态遍历，产生已定位命令
    pub fn walk(&self) -> PathWalker<'_> {
        PathWalker::new(&self.commands)
    }

    /// 路径触及的全部点（包括曲线控制点）的惰性序列
    pub fn control_points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.walk().flat_map(|located| located.control_points())
    }

    /// 每个命令终点的惰性序列
    pub fn end_points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.walk().map(|located| located.end_point())
    }

    /// 全部命令改写为绝对坐标
    pub fn to_absolute(&self) -> Self {
        Self {
            commands: self
                .walk()
                .map(|located| located.command.to_absolute(located.prev))
                .collect(),
        }
    }

    /// 全部命令改写为相对坐标
    pub fn to_relative(&self) -> Self {
        Self {
            commands: self
                .walk()
                .map(|located| located.command.to_relative(located.prev))
                .collect(),
        }
    }

    /// 仿射变换，返回新路径
    ///
    /// 每个命令做保持种类的变换；Horizontal/Vertical在一般仿射
    /// 映射下无法保持，先改写为Line。相对命令相对变换后的当前点
    /// 重新表达。
    pub fn transform(&self, matrix: &Transform2D) -> Self {
        let mut new_first = Point2::origin();
        let mut new_prev = Point2::origin();
        let mut commands = Vec::with_capacity(self.commands.len());
        for located in self.walk() {
            let cmd = located.command.to_line(located.prev);
            let abs = cmd.to_absolute(located.prev);
            let transformed = match abs.transform(matrix) {
                Ok(t) => t,
                // to_line已排除了简写命令
                Err(_) => unreachable!("shorthand commands are rewritten before transforming"),
            };
            let end = transformed.end_point(new_first, new_prev);
            commands.push(if cmd.relative {
                transformed.to_relative(new_prev)
            } else {
                transformed
            });
            if matches!(abs.segment, Segment::Move { .. }) {
                new_first = end;
            }
            new_prev = end;
        }
        Self { commands }
    }

    /// 就地仿射变换
    pub fn transform_in_place(&mut self, matrix: &Transform2D) {
        *self = self.transform(matrix);
    }

    /// 平移
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        self.transform(&Transform2D::translate(dx, dy))
    }

    /// 就地平移
    pub fn translate_in_place(&mut self, dx: f64, dy: f64) {
        self.transform_in_place(&Transform2D::translate(dx, dy));
    }

    /// 缩放
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        self.transform(&Transform2D::scale(sx, sy))
    }

    /// 就地缩放
    pub fn scale_in_place(&mut self, sx: f64, sy: f64) {
        self.transform_in_place(&Transform2D::scale(sx, sy));
    }

    /// 绕指定中心旋转（弧度）
    pub fn rotate(&self, angle: f64, center: Point2) -> Self {
        self.transform(&Transform2D::rotate_around(angle, center))
    }

    /// 就地旋转
    pub fn rotate_in_place(&mut self, angle: f64, center: Point2) {
        self.transform_in_place(&Transform2D::rotate_around(angle, center));
    }

    /// 绕包围盒中心旋转（弧度）；空路径绕原点
    pub fn rotate_centered(&self, angle: f64) -> Self {
        let center = self
            .bounding_box()
            .map(|bbox| bbox.center())
            .unwrap_or_else(Point2::origin);
        self.rotate(angle, center)
    }

    /// 聚合所有命令贡献的包围盒；空路径返回None
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        let mut bbox = BoundingBox2::empty();
        for located in self.walk() {
            if !matches!(located.command.segment, Segment::Move { .. }) {
                bbox.expand_to_include(&located.prev);
            }
            located.command.extend_bounding_box(
                located.first,
                located.prev,
                located.prev_control,
                &mut bbox,
            );
        }
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    /// 按子路径拆分，返回绝对坐标的路径列表
    ///
    /// 显式闭合与尾部未闭合的子路径都各成一条；连续的Move合并为
    /// 最后一个。
    pub fn break_apart(&self) -> Vec<Self> {
        let mut paths: Vec<Self> = Vec::new();
        for cmd in self.to_absolute().commands {
            if matches!(cmd.segment, Segment::Move { .. }) {
                if let Some(last) = paths.last_mut() {
                    // 仅含Move的子路径被后续Move取代
                    if last.commands.len() == 1
                        && matches!(last.commands[0].segment, Segment::Move { .. })
                    {
                        last.commands[0] = cmd;
                        continue;
                    }
                }
                paths.push(Self::default());
            } else if paths.is_empty() {
                paths.push(Self::default());
            }
            if let Some(last) = paths.last_mut() {
                last.commands.push(cmd);
            }
        }
        paths
    }

    /// 反转路径
    ///
    /// 子路径顺序反转，每条子路径反向遍历；闭合子路径仍从原起点
    /// 出发，反向的闭合线显式给出，原先的首个直线段并入尾部的
    /// ClosePath；Arc翻转sweep标志；相对命令重新计算增量；平滑
    /// 简写实体化；闭合标记的数量保持不变；每条输出子路径的Move
    /// 沿用同位置原Move的坐标模式。
    pub fn reverse(&self) -> Self {
        let chunks = self.chunks();
        // Move坐标模式按位置沿用
        let move_slots: Vec<Option<bool>> = chunks
            .iter()
            .map(|c| c.move_cmd.map(|m| m.command.relative))
            .collect();

        let mut out = Self::default();
        let mut position = Point2::origin();
        for (chunk, slot) in chunks.iter().rev().zip(move_slots.iter()) {
            chunk.emit_reversed(*slot, &mut out, &mut position);
        }
        out
    }

    /// 把命令序列切分成子路径块
    fn chunks(&self) -> Vec<SubPathChunk> {
        let mut chunks: Vec<SubPathChunk> = Vec::new();
        let mut needs_new = true;
        for located in self.walk() {
            match located.command.segment {
                Segment::Move { .. } => {
                    chunks.push(SubPathChunk {
                        move_cmd: Some(located),
                        start: located.end_point(),
                        body: Vec::new(),
                        close: None,
                    });
                    needs_new = false;
                }
                Segment::ClosePath => {
                    if needs_new || chunks.is_empty() {
                        chunks.push(SubPathChunk {
                            move_cmd: None,
                            start: located.first,
                            body: Vec::new(),
                            close: None,
                        });
                    }
                    if let Some(chunk) = chunks.last_mut() {
                        chunk.close = Some(located.command.relative);
                    }
                    needs_new = true;
                }
                _ => {
                    if needs_new || chunks.is_empty() {
                        chunks.push(SubPathChunk {
                            move_cmd: None,
                            start: located.prev,
                            body: Vec::new(),
                            close: None,
                        });
                        needs_new = false;
                    }
                    if let Some(chunk) = chunks.last_mut() {
                        chunk.body.push(located);
                    }
                }
            }
        }
        chunks
    }
}

/// 一条子路径：可选的Move、主体命令与可选的闭合标记
struct SubPathChunk {
    move_cmd: Option<LocatedCommand>,
    /// 子路径起点（Move之后的位置）
    start: Point2,
    body: Vec<LocatedCommand>,
    /// Some表示闭合，值为ClosePath的坐标模式
    close: Option<bool>,
}

impl SubPathChunk {
    /// 命令是否为可并入ClosePath的直线段
    fn is_straight(cmd: &Command) -> bool {
        matches!(
            cmd.segment,
            Segment::Line { .. } | Segment::Horizontal { .. } | Segment::Vertical { .. }
        )
    }

    /// 按原坐标模式输出一条命令，并推进当前位置
    fn emit(out: &mut Path, position: &mut Point2, absolute_cmd: Command, relative: bool) {
        let end = absolute_cmd.end_point(*position, *position);
        out.push(if relative {
            absolute_cmd.to_relative(*position)
        } else {
            absolute_cmd
        });
        *position = end;
    }

    /// 反向输出单个绘制命令：从from回到to
    fn emit_segment_reversed(
        located: &LocatedCommand,
        to: Point2,
        out: &mut Path,
        position: &mut Point2,
    ) {
        let relative = located.command.relative;
        let abs = located.to_absolute();
        let segment = match abs.segment {
            Segment::Line { .. } => Segment::Line { to },
            Segment::Horizontal { .. } => Segment::Horizontal { x: to.x },
            Segment::Vertical { .. } => Segment::Vertical { y: to.y },
            Segment::CubicCurve { c1, c2, .. } => Segment::CubicCurve {
                c1: c2,
                c2: c1,
                to,
            },
            // 平滑简写的反射上下文在反转后不再成立，实体化处理
            Segment::SmoothCubic { c2, .. } => {
                let c1 = Point2::from(located.prev.coords * 2.0 - located.prev_control.coords);
                Segment::CubicCurve { c1: c2, c2: c1, to }
            }
            Segment::QuadraticCurve { c, .. } => Segment::QuadraticCurve { c, to },
            Segment::SmoothQuadratic { .. } => {
                let c = Point2::from(located.prev.coords * 2.0 - located.prev_control.coords);
                Segment::QuadraticCurve { c, to }
            }
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                ..
            } => Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep: !sweep,
                to,
            },
            Segment::Move { .. } | Segment::ClosePath => {
                // 主体中不会出现
                return;
            }
        };
        Self::emit(out, position, Command::absolute(segment), relative);
    }

    /// 输出本块的反转形式
    fn emit_reversed(&self, move_slot: Option<bool>, out: &mut Path, position: &mut Point2) {
        let end = self
            .body
            .last()
            .map(|located| located.end_point())
            .unwrap_or(self.start);

        match self.close {
            Some(close_relative) => {
                // 闭合子路径：从原起点出发
                if let Some(relative) = move_slot {
                    Self::emit(
                        out,
                        position,
                        Command::absolute(Segment::Move { to: self.start }),
                        relative,
                    );
                }
                // 反向的闭合线
                if (end - self.start).norm() > EPSILON {
                    Self::emit(
                        out,
                        position,
                        Command::absolute(Segment::Line { to: end }),
                        close_relative,
                    );
                }
                // 主体反向，首段另行处理
                for i in (1..self.body.len()).rev() {
                    let to = self.body[i].prev;
                    Self::emit_segment_reversed(&self.body[i], to, out, position);
                }
                if let Some(first_seg) = self.body.first() {
                    if !Self::is_straight(&first_seg.command) {
                        // 曲线段无法并入ClosePath，显式反向输出
                        Self::emit_segment_reversed(first_seg, self.start, out, position);
                    }
                    // 直线段被尾部的ClosePath隐式绘制
                }
                out.push(Command {
                    segment: Segment::ClosePath,
                    relative: close_relative,
                });
                *position = self.start;
            }
            None => {
                // 未闭合子路径：从末端出发全部反向
                if let Some(relative) = move_slot {
                    Self::emit(
                        out,
                        position,
                        Command::absolute(Segment::Move { to: end }),
                        relative,
                    );
                }
                for i in (0..self.body.len()).rev() {
                    let to = self.body[i].prev;
                    Self::emit_segment_reversed(&self.body[i], to, out, position);
                }
            }
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Command;

    fn index(&self, index: usize) -> &Command {
        &self.commands[index]
    }
}

impl FromIterator<Command> for Path {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl Extend<Command> for Path {
    fn extend<T: IntoIterator<Item = Command>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl IntoIterator for Path {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    /// 数值逐项比较两条路径
    fn assert_paths_close(a: &Path, b: &Path, tol: f64) {
        let aa = a.to_arrays();
        let bb = b.to_arrays();
        assert_eq!(
            aa.len(),
            bb.len(),
            "command count mismatch: {a} vs {b}"
        );
        for ((la, argsa), (lb, argsb)) in aa.iter().zip(bb.iter()) {
            assert_eq!(la, lb, "{a} vs {b}");
            assert_eq!(argsa.len(), argsb.len());
            for (x, y) in argsa.iter().zip(argsb.iter()) {
                assert!((x - y).abs() < tol, "{a}\nvs\n{b}");
            }
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(Path::new().to_string(), "");
        assert!(Path::parse("").bounding_box().is_none());
    }

    #[test]
    fn test_parse_scenario() {
        let path = Path::parse("M12 34L56 78Z");
        assert_eq!(path.to_string(), "M 12 34 L 56 78 Z");
        let again = Path::parse(&path.to_string());
        assert_eq!(path, again);
    }

    #[test]
    fn test_passthrough() {
        for text in [
            "M 50 50 L 10 10 m 10 10 l 2.1 2",
            "m 150 150 c 10 10 6 6 20 10 L 10 10",
        ] {
            assert_eq!(Path::parse(text).to_string(), text);
        }
    }

    #[test]
    fn test_from_points() {
        let path = Path::from_points([
            pt(10.0, 10.0),
            pt(4.0, 5.0),
            pt(16.0, -9.0),
            pt(20.0, 20.0),
        ]);
        assert_eq!(path.to_string(), "L 10 10 L 4 5 L 16 -9 L 20 20");
    }

    #[test]
    fn test_from_arrays_strict() {
        let path =
            Path::from_arrays(&[('m', vec![50.0, 50.0]), ('l', vec![20.0, 20.0])]).unwrap();
        assert_eq!(path.to_string(), "m 50 50 l 20 20");
        assert!(Path::from_arrays(&[('L', vec![40.0])]).is_err());
    }

    #[test]
    fn test_control_points() {
        let cases: &[(&str, &[(f64, f64)])] = &[
            ("M 100 100", &[(100.0, 100.0)]),
            ("L 100 100", &[(100.0, 100.0)]),
            ("H 133", &[(133.0, 0.0)]),
            ("V 144", &[(0.0, 144.0)]),
            (
                "Q 40 20 12 99 T 100 100",
                &[(40.0, 20.0), (12.0, 99.0), (-16.0, 178.0), (100.0, 100.0)],
            ),
            (
                "C 12 12 15 15 20 20",
                &[(12.0, 12.0), (15.0, 15.0), (20.0, 20.0)],
            ),
            ("S 50 90 30 10", &[(0.0, 0.0), (50.0, 90.0), (30.0, 10.0)]),
            ("A 1,2,3,0,0,10,20", &[(10.0, 20.0)]),
            ("Z", &[(0.0, 0.0)]),
        ];
        for (text, want) in cases {
            let got: Vec<Point2> = Path::parse(text).control_points().collect();
            assert_eq!(got.len(), want.len(), "{text}");
            for (g, (x, y)) in got.iter().zip(want.iter()) {
                assert!((g - pt(*x, *y)).norm() < 1e-9, "{text}: {g:?}");
            }
        }
    }

    #[test]
    fn test_bounding_box_lines() {
        let bbox = Path::parse("M 20,20 L 90,90 l 10,10 Z").bounding_box().unwrap();
        assert_eq!((bbox.min.x, bbox.max.x), (20.0, 100.0));
        assert_eq!((bbox.min.y, bbox.max.y), (20.0, 100.0));

        let bbox = Path::parse("M 10 10 h 10 v 10 h -10 Z").bounding_box().unwrap();
        assert_eq!((bbox.min.x, bbox.max.x), (10.0, 20.0));
        assert_eq!((bbox.min.y, bbox.max.y), (10.0, 20.0));
    }

    #[test]
    fn test_bounding_box_curves() {
        let path = Path::parse(
            "M 85,14 C 104.63953,33.639531 104.71989,65.441157 85,85 \
             65.441157,104.71989 33.558843,104.71989 14,85 \
             -5.7198883,65.441157 -5.6395306,33.639531 14,14 \
             33.639531,-5.6395306 65.360469,-5.6395306 85,14 Z",
        );
        let bbox = path.bounding_box().unwrap();
        assert!((bbox.min.x - -0.760).abs() < 1e-3, "{}", bbox.min.x);
        assert!((bbox.max.x - (-0.760 + 100.520)).abs() < 1e-3);
        assert!((bbox.min.y - -0.730).abs() < 1e-3);
        assert!((bbox.max.y - (-0.730 + 100.520)).abs() < 1e-3);
    }

    #[test]
    fn test_bounding_box_arcs() {
        // 半径50的圆，包围盒应为 (0,0)-(100,100)
        let path = Path::parse(
            "M 85.355333,14.644651 \
             A 50,50 0 0 1 85.355333,85.355341 \
             50,50 0 0 1 14.644657,85.355341 \
             50,50 0 0 1 14.644676,14.644651 \
             50,50 0 0 1 85.355333,14.644651 Z",
        );
        let bbox = path.bounding_box().unwrap();
        assert!(bbox.min.x.abs() < 1e-4, "{}", bbox.min.x);
        assert!(bbox.min.y.abs() < 1e-4);
        assert!((bbox.max.x - 100.0).abs() < 1e-4);
        assert!((bbox.max.y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_translate() {
        let ret = Path::parse("M 20,20 L 90,90 l 10,10 Z").translate(50.0, 50.0);
        assert_eq!(ret.to_string(), "M 70 70 L 140 140 l 10 10 Z");

        let ret = Path::parse("M 20,20 L 90,90 l 10,10 Z").translate(-10.0, -10.0);
        assert_eq!(ret.to_string(), "M 10 10 L 80 80 l 10 10 Z");
    }

    #[test]
    fn test_scale() {
        let ret = Path::parse("M 10,10 L 30,30 C 20 20 10 10 10 10 l 10 10").scale(2.5, 3.0);
        assert_eq!(ret.to_string(), "M 25 30 L 75 90 C 50 60 25 30 25 30 l 25 30");
    }

    #[test]
    fn test_scale_arc() {
        let ret = Path::parse(
            "M 29.867708,101.68274 A 14.867708,14.867708 0 0 1 15,116.55045 14.867708,\
             14.867708 0 0 1 0.13229179,101.68274 14.867708,14.867708 0 0 1 15,86.815031 \
             14.867708,14.867708 0 0 1 29.867708,101.68274 Z",
        )
        .scale(1.2, 0.8);
        let want = Path::parse(
            "M 35.8412 81.3462 \
             A 17.8412 11.8942 0 0 1 18 93.2404 \
             A 17.8412 11.8942 0 0 1 0.15875 81.3462 \
             A 17.8412 11.8942 0 0 1 18 69.452 \
             A 17.8412 11.8942 0 0 1 35.8412 81.3462 Z",
        );
        assert_paths_close(&ret, &want, 1e-3);
    }

    #[test]
    fn test_scale_relative_after_close() {
        // ClosePath之后当前位置回到子路径起点
        let ret = Path::parse("M 10,10 l 10,10 Z l 10,10").scale(2.0, 2.0);
        assert_eq!(ret.to_string(), "M 20 20 l 20 20 Z l 20 20");
    }

    #[test]
    fn test_scale_multiple_zones() {
        // ClosePath回到所在子路径的起点，而不是整条路径的起点
        let ret = Path::parse("M 100 100 Z M 200 200 Z h 0").scale(1.0, 1.0);
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 100 100 Z M 200 200 Z L 200 200"
        );
    }

    #[test]
    fn test_to_absolute() {
        let ret = Path::parse("M 100 100 l 10 10 10 10 10 10");
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 100 100 L 110 110 L 120 120 L 130 130"
        );

        let ret = Path::parse("M 100 100 h 10 10 10 v 10 10 10");
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 100 100 H 110 H 120 H 130 V 110 V 120 V 130"
        );

        let ret = Path::parse("M 150,150 a 76,55 0 1 1 283,128");
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 150 150 A 76 55 0 1 1 433 278"
        );

        let ret = Path::parse("m 5 5 h 5 v 5 h -5 z M 15 15 l 5 5 z m 10 10 h 5 v 5 h -5 z");
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 5 5 H 10 V 10 H 5 Z M 15 15 L 20 20 Z M 25 25 H 30 V 30 H 25 Z"
        );

        let ret = Path::parse("m 1 2 h 2 v 1 z m 4 0 h 2 v 1 z m 0 2 h 2 v 1 z");
        assert_eq!(
            ret.to_absolute().to_string(),
            "M 1 2 H 3 V 3 Z M 5 2 H 7 V 3 Z M 5 4 H 7 V 5 Z"
        );
    }

    #[test]
    fn test_to_relative() {
        let ret = Path::parse("M 100 100 L 110 120 140 140 300 300");
        assert_eq!(
            ret.to_relative().to_string(),
            "m 100 100 l 10 20 l 30 20 l 160 160"
        );

        let ret = Path::parse("M 150,150 A 76,55 0 1 1 433,278");
        assert_eq!(
            ret.to_relative().to_string(),
            "m 150 150 a 76 55 0 1 1 283 128"
        );

        let ret = Path::parse("M 1 2 H 3 V 3 Z M 5 2 H 7 V 3 Z M 5 4 H 7 V 5 Z");
        assert_eq!(
            ret.to_relative().to_string(),
            "m 1 2 h 2 v 1 z m 4 0 h 2 v 1 z m 0 2 h 2 v 1 z"
        );
    }

    #[test]
    fn test_absolute_relative_roundtrip() {
        let path = Path::parse("m 5 5 h 5 v 5 h -5 z M 15 15 l 5 5 z m 10 10 h 5 v 5 h -5 z");
        let roundtrip = path.to_absolute().to_relative();
        assert_eq!(roundtrip.to_string(), path.to_string());
    }

    #[test]
    fn test_transform_translate_roundtrip() {
        let ret = Path::parse("M 100 100 L 110 120 L 140 140 L 300 300");
        let moved = ret.transform(&Transform2D::translate(10.0, 10.0));
        assert_eq!(moved.to_string(), "M 110 110 L 120 130 L 150 150 L 310 310");
        let back = moved.transform(&Transform2D::translate(-10.0, -10.0));
        assert_paths_close(&back, &ret, 1e-9);
    }

    #[test]
    fn test_transform_shorthand_becomes_line() {
        let ret = Path::parse("M 5 5 H 10 V 15")
            .transform(&Transform2D::rotate((-10.0_f64).to_radians()));
        let want = Path::parse("M 5.79228 4.0558 L 10.7163 3.18756 L 12.4528 13.0356");
        assert_paths_close(&ret, &want, 1e-4);
    }

    #[test]
    fn test_transform_arc_uniform_scale() {
        let ret = Path::parse("M 10 10 A 50,50 0 0 1 85.355333,85.355341 L 100 0")
            .transform(&Transform2D::uniform_scale(10.0));
        let want = Path::parse("M 100 100 A 500 500 0 0 1 853.55333 853.55341 L 1000 0");
        assert_paths_close(&ret, &want, 1e-6);
    }

    #[test]
    fn test_transformation_preserves_kind() {
        let matrix = Transform2D::new(1.0, 4.0, 2.0, 5.0, 3.0, 6.0);
        for text in [
            "M 10 10 A 100 100 0 1 0 100 100 C 10 15 20 20 5 5 Z",
            "m 10 10 a 100 100 0 1 0 100 100 c 10 15 20 20 5 5 z",
            "m 10 10 l 100 200 L 20 30 C 10 20 30 40 11 12",
            "M 10 10 Q 12 13 14 15 T 11 32 T 32 11",
            "m 10 10 q 12 13 14 15 t 11 32 t 32 11",
        ] {
            let path = Path::parse(text);
            let transformed = path.transform(&matrix);
            let got: String = transformed.iter().map(|c| c.letter()).collect();
            let want: String = path.iter().map(|c| c.letter()).collect();
            assert_eq!(got, want, "{text}");

            // 变换后的控制点 == 控制点的变换
            let a: Vec<Point2> = path
                .control_points()
                .map(|p| matrix.apply_to_point(&p))
                .collect();
            let b: Vec<Point2> = transformed.control_points().collect();
            assert_eq!(a.len(), b.len(), "{text}");
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).norm() < 1e-6, "{text}: {x:?} vs {y:?}");
            }
        }
    }

    #[test]
    fn test_arc_transformation_cases() {
        let cases: &[(&str, [[f64; 3]; 2], &str)] = &[
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
                "M 11 10 A 100 100 0 1 0 101 100 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[1.0, 0.0, 0.0], [0.0, 1.0, 1.0]],
                "M 10 11 A 100 100 0 1 0 100 101 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                "M 20 10 A 200 100 0 1 0 200 100 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
                "M 10 20 A 200 100 90 1 0 100 200 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
                "M 10 -10 A 100 100 0 1 1 100 -100 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 Z",
                [[1.0, 2.0, 0.0], [0.0, 2.0, 0.0]],
                "M 30 20 A 292.081 68.4742 41.4375 1 0 300 200 Z",
            ),
            (
                "M 10 10 A 100 100 0 1 0 100 100 A 300 200 0 1 0 50 20 Z",
                [[1.0, 2.0, 0.0], [5.0, 6.0, 0.0]],
                "M 30,110 A 810.90492,49.327608 74.368134 1 1 \
                 300,1100 1981.2436,121.13604 75.800007 1 1 90,370 Z",
            ),
        ];
        for (text, matrix, want) in cases {
            let result = Path::parse(text).transform(&Transform2D::from_matrix(*matrix));
            let expected = Path::parse(want);
            // 旋转角以180度为周期等价，用采样点比较几何
            let aa = result.to_arrays();
            let bb = expected.to_arrays();
            assert_eq!(aa.len(), bb.len(), "{text}");
            for ((la, argsa), (lb, argsb)) in aa.iter().zip(bb.iter()) {
                assert_eq!(la, lb, "{text}");
                if *la == 'A' {
                    // 半径与标志、终点
                    assert!((argsa[0] - argsb[0]).abs() < 1e-3, "{text}: rx");
                    assert!((argsa[1] - argsb[1]).abs() < 1e-3, "{text}: ry");
                    let rot_diff = (argsa[2] - argsb[2]).rem_euclid(180.0);
                    assert!(
                        rot_diff < 1e-3 || rot_diff > 180.0 - 1e-3,
                        "{text}: rotation {} vs {}",
                        argsa[2],
                        argsb[2]
                    );
                    for i in 3..7 {
                        assert!((argsa[i] - argsb[i]).abs() < 1e-3, "{text}: arg {i}");
                    }
                } else {
                    for (x, y) in argsa.iter().zip(argsb.iter()) {
                        assert!((x - y).abs() < 1e-3, "{text}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_rotate() {
        let source = "M 0.24999949,0.24999949 H 12.979167 V 12.979167 H 0.24999949 Z";

        let ret = Path::parse(source).rotate(35.0_f64.to_radians(), Point2::origin());
        let want = Path::parse(
            "M 0.0613938 0.348181 L 10.4885 7.64933 L 3.18737 18.0765 L -7.23976 10.7753 Z",
        );
        assert_paths_close(&ret, &want, 1e-4);

        let ret = Path::parse(source).rotate((-35.0_f64).to_radians(), Point2::origin());
        let want = Path::parse(
            "M 0.348181 0.0613938 L 10.7753 -7.23976 L 18.0765 3.18737 L 7.64933 10.4885 Z",
        );
        assert_paths_close(&ret, &want, 1e-4);

        let ret = Path::parse(source).rotate(90.0_f64.to_radians(), pt(10.0, -10.0));
        let want = Path::parse(
            "M -0.249999 -19.75 L -0.249999 -7.02083 L -12.9792 -7.02083 L -12.9792 -19.75 Z",
        );
        assert_paths_close(&ret, &want, 1e-4);

        // 不给中心时绕包围盒中心旋转
        let ret = Path::parse(source).rotate_centered(90.0_f64.to_radians());
        let want = Path::parse(
            "M 12.9792 0.249999 L 12.9792 12.9792 L 0.249999 12.9792 L 0.249999 0.249999 Z",
        );
        assert_paths_close(&ret, &want, 1e-4);
    }

    #[test]
    fn test_in_place_variants() {
        let source = Path::parse("M 10 10 L 20 20");
        let mut path = source.clone();
        // 写时复制：返回新路径，原路径不变
        let moved = path.translate(5.0, 5.0);
        assert_eq!(path, source);
        assert_ne!(moved, source);
        // 显式就地修改
        path.translate_in_place(5.0, 5.0);
        assert_eq!(path, moved);
    }

    #[test]
    fn test_to_arrays() {
        let arrays = Path::parse("M 100 100 L 110 120 H 20 C 120 0 6 10 10 2 Z").to_arrays();
        assert_eq!(arrays.len(), 5);
        assert_eq!(arrays[0].0, 'M');
        assert_eq!(arrays[1].0, 'L');
        assert_eq!(arrays[2].0, 'H');
        assert_eq!(arrays[3].0, 'C');
        assert_eq!(arrays[4].0, 'Z');
        assert_eq!(arrays[3].1, vec![120.0, 0.0, 6.0, 10.0, 10.0, 2.0]);
    }

    #[test]
    fn test_reverse_absolute_closed() {
        let ret = Path::parse("M 100 35 L 100 25 L 60 10 C 45 23 32 33 10 35 L 60 75 L 60 35 Z")
            .reverse();
        assert_eq!(
            ret.to_string(),
            "M 100 35 L 60 35 L 60 75 L 10 35 C 32 33 45 23 60 10 L 100 25 Z"
        );
    }

    #[test]
    fn test_reverse_absolute_open() {
        let ret = Path::parse(
            "M 100 35 L 100 25 L 60 10 C 45 23 32 33 10 35 L 60 75 L 60 35 L 100 35",
        )
        .reverse();
        assert_eq!(
            ret.to_string(),
            "M 100 35 L 60 35 L 60 75 L 10 35 C 32 33 45 23 60 10 L 100 25 L 100 35"
        );
    }

    #[test]
    fn test_reverse_relative() {
        // 相对坐标、闭合路径
        let ret = Path::parse("m 10 50 h 40 v -40 l 50 40 c -22 2 -35 12 -50 25 l -40 -15 l 0 -10 z")
            .reverse();
        assert_paths_close(
            &ret,
            &Path::parse("m 10 50 l 0 10 l 40 15 c 15 -13 28 -23 50 -25 l -50 -40 v 40 z"),
            1e-9,
        );
        // 相对坐标、未闭合路径
        let ret = Path::parse("m 10 50 h 40 v -40 l 50 40 c -22 2 -35 12 -50 25 l -40 -15 l 0 -10")
            .reverse();
        assert_paths_close(
            &ret,
            &Path::parse("m 10 50 l 0 10 l 40 15 c 15 -13 28 -23 50 -25 l -50 -40 v 40 h -40"),
            1e-9,
        );
    }

    #[test]
    fn test_reverse_quadratic() {
        let ret = Path::parse("M 100,250 q 250,100 400,250").reverse();
        assert_eq!(ret.to_string(), "M 500 500 q -150 -150 -400 -250");
    }

    #[test]
    fn test_reverse_multiple_subpaths() {
        let ret = Path::parse("M 128,64 L 128,128 M 128,196 L 128,256").reverse();
        assert_eq!(ret.to_string(), "M 128 256 L 128 196 M 128 128 L 128 64");

        let ret = Path::parse("M 128,64 L 128,128 m 128,196 L 128,256").reverse();
        assert_eq!(ret.to_string(), "M 128 256 L 256 324 m -128 -196 L 128 64");

        let ret = Path::parse(
            "m 58,88 c -10,2 3,13 10,4 z M 32,67 c 14,-5 23,-3 35,7 m 2,-21 c \
             10,11 20,19 34,11 M 24,43 c 23,-14 18,-5 39,4",
        )
        .reverse();
        assert_eq!(
            ret.to_string(),
            "m 63 47 c -21 -9 -16 -18 -39 -4 M 103 64 c -14 8 -24 0 -34 -11 \
             m -2 21 c -12 -10 -21 -12 -35 -7 M 58 88 l 10 4 c -7 9 -20 -2 -10 -4 z"
        );
    }

    #[test]
    fn test_reverse_preserves_close_count() {
        for text in [
            "m 50,20 v -10 h -10 z m 30,-20 v 20 h 20 z m -50,20 v -15 h -15 z",
            "M 100 35 L 100 25 L 60 10 Z",
            "m 58,88 c -10,2 3,13 10,4 z M 32,67 c 14,-5 23,-3 35,7",
        ] {
            let path = Path::parse(text);
            let closes = |p: &Path| {
                p.iter()
                    .filter(|c| matches!(c.segment, Segment::ClosePath))
                    .count()
            };
            assert_eq!(closes(&path), closes(&path.reverse()), "{text}");
        }
    }

    #[test]
    fn test_reverse_end_points_roundtrip() {
        let path = Path::parse("m 50,20 v -10 h -10 z m 30,-20 v 20 h 20 z m -50,20 v -15 h -15 z");
        let pts: Vec<Point2> = path.end_points().collect();
        let rev_pts: Vec<Point2> = path.reverse().end_points().collect();
        let mut back = rev_pts.clone();
        back.reverse();
        assert_eq!(pts.len(), back.len());
        for (a, b) in pts.iter().zip(back.iter()) {
            assert!((a - b).norm() < 1e-9, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_break_apart() {
        for text in [
            "m 233,142 a 12,13 0 0 1 16,0 12,13 0 0 1 2,17 12,13 0 0 1 -15,4 l 5,-12 z \
             m 30,-55 c 0,0 -22,25 2,35 24,9 31,1 23,15 -7,13 -7,13 -7,13 m -40,-28 -35,-20 35,-20 z",
            // 连续两个Move应产生相同的结果
            "m 233,142 a 12,13 0 0 1 16,0 12,13 0 0 1 2,17 12,13 0 0 1 -15,4 l 5,-12 z \
             m 20,-55 m 10,0 c 0,0 -22,25 2,35 24,9 31,1 23,15 -7,13 -7,13 -7,13 m -40,-28 -35,-20 35,-20 z",
        ] {
            let ret = Path::parse(text).break_apart();
            assert_eq!(ret.len(), 3);
            assert_paths_close(
                &ret[2],
                &Path::parse("M 241,122 206,102 241,82 Z").to_absolute(),
                1e-9,
            );
            assert_paths_close(
                &ret[1],
                &Path::parse("m 263,87 c 0,0 -22,25 2,35 24,9 31,1 23,15 -7,13 -7,13 -7,13")
                    .to_absolute(),
                1e-9,
            );
            assert_paths_close(
                &ret[0],
                &Path::parse(
                    "m 233,142 a 12,13 0 0 1 16,0 12,13 0 0 1 2,17 12,13 0 0 1 -15,4 l 5,-12 z",
                )
                .to_absolute(),
                1e-9,
            );
        }
    }

    #[test]
    fn test_point_within_bounding_box() {
        // 采样点都应落在包围盒内
        for text in [
            "M 0 0 L 10 5",
            "M 0 0 C 10 20 30 -20 40 0",
            "M 0 0 Q 20 40 40 0",
            "M 0 0 A 30 20 15 0 1 40 10",
            "M 0 0 A 30 20 15 1 0 40 10",
        ] {
            let path = Path::parse(text);
            let bbox = path.bounding_box().unwrap();
            for located in path.walk() {
                if matches!(located.command.segment, Segment::Move { .. }) {
                    continue;
                }
                for i in 0..=20 {
                    let t = i as f64 / 20.0;
                    let p = located.point(t).unwrap();
                    assert!(
                        p.x >= bbox.min.x - 1e-6
                            && p.x <= bbox.max.x + 1e-6
                            && p.y >= bbox.min.y - 1e-6
                            && p.y <= bbox.max.y + 1e-6,
                        "{text}: t={t} point {p:?} outside {bbox:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_length_monotone_and_inverse() {
        use crate::bezier::LengthSettings;
        let settings = LengthSettings::with_error(1e-10);
        let path = Path::parse("M 0 0 C 10 20 30 -20 40 0");
        let located: Vec<_> = path.walk().collect();
        let curve = &located[1];
        let mut last = 0.0;
        for i in 1..=10 {
            let t = i as f64 / 10.0;
            let len = curve
                .command
                .length(curve.first, curve.prev, curve.prev_control, 0.0, t, &settings)
                .unwrap();
            assert!(len >= last, "length must be non-decreasing");
            // 反函数往返
            let back = curve
                .command
                .inverse_length(curve.first, curve.prev, curve.prev_control, len, &settings)
                .unwrap();
            assert!((back - t).abs() < 1e-5, "t={t}, back={back}");
            last = len;
        }
    }

    #[test]
    fn test_arc_nonuniform_scale_samples() {
        // 非均匀缩放改变弧的半径与旋转，但种类仍是Arc，
        // 且缩放后的采样点等于采样点的缩放
        let matrix = Transform2D::scale(2.0, 3.0);
        let path = Path::parse("M 0 0 A 30 20 15 0 1 40 10");
        let transformed = path.transform(&matrix);
        assert_eq!(transformed[1].letter(), 'A');

        let orig: Vec<_> = path.walk().collect();
        let new: Vec<_> = transformed.walk().collect();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let expected = matrix.apply_to_point(&orig[1].point(t).unwrap());
            let got = new[1].point(t).unwrap();
            assert!((got - expected).norm() < 1e-6, "t={t}: {got:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let path = Path::parse("M 10 10 A 50,50 0 0 1 85.3,85.3 L 100 0 Z");
        let json = serde_json::to_string(&path).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, back);
    }
}
