//! 带状态的路径遍历
//!
//! SVG路径语义本质上是有状态的：没有任何单个命令能自我描述。
//! 本模块把每个命令与解析它所需的绝对上下文配对：
//! - `first`: 活动子路径起点（ClosePath的目标）
//! - `prev`: 前一命令的绝对终点
//! - `prev_control`: 前一个控制点（平滑简写命令的反射来源）
//!
//! 遍历是惰性、有限、可重启的，对路径本身没有副作用。

use crate::command::{Command, Segment};
use crate::math::Point2;

/// 已定位命令：命令加上解析其几何所需的上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedCommand {
    pub command: Command,
    /// 活动子路径起点
    pub first: Point2,
    /// 前一命令终点
    pub prev: Point2,
    /// 前一控制点
    pub prev_control: Point2,
}

impl LocatedCommand {
    /// 命令的绝对终点
    pub fn end_point(&self) -> Point2 {
        self.command.end_point(self.first, self.prev)
    }

    /// 命令的定义点（绝对坐标）
    pub fn control_points(&self) -> Vec<Point2> {
        self.command
            .control_points(self.first, self.prev, self.prev_control)
    }

    /// 命令的绝对坐标形式
    pub fn to_absolute(&self) -> Command {
        self.command.to_absolute(self.prev)
    }

    /// 参数t处的位置
    pub fn point(&self, t: f64) -> Result<Point2, crate::error::PathError> {
        self.command.point(self.first, self.prev, self.prev_control, t)
    }
}

/// 路径遍历器
///
/// 在迭代过程中维护运行状态；重新迭代同一路径总是产生相同的
/// 已定位命令序列。
pub struct PathWalker<'a> {
    commands: std::slice::Iter<'a, Command>,
    first: Point2,
    prev: Point2,
    prev_control: Point2,
}

impl<'a> PathWalker<'a> {
    /// 从命令序列创建，隐式起点为原点
    pub fn new(commands: &'a [Command]) -> Self {
        Self {
            commands: commands.iter(),
            first: Point2::origin(),
            prev: Point2::origin(),
            prev_control: Point2::origin(),
        }
    }
}

impl Iterator for PathWalker<'_> {
    type Item = LocatedCommand;

    fn next(&mut self) -> Option<LocatedCommand> {
        let command = *self.commands.next()?;
        let located = LocatedCommand {
            command,
            first: self.first,
            prev: self.prev,
            prev_control: self.prev_control,
        };

        let end = command.end_point(self.first, self.prev);
        let abs = command.to_absolute(self.prev);
        self.prev_control = match abs.segment {
            Segment::CubicCurve { c2, .. } | Segment::SmoothCubic { c2, .. } => c2,
            Segment::QuadraticCurve { c, .. } => c,
            Segment::SmoothQuadratic { .. } => {
                // 本命令的有效控制点：上一控制点关于当前点的反射
                Point2::from(self.prev.coords * 2.0 - self.prev_control.coords)
            }
            _ => end,
        };
        if let Segment::Move { .. } = abs.segment {
            self.first = end;
        }
        self.prev = end;
        Some(located)
    }
}
