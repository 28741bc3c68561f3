//! VPath 核心几何引擎
//!
//! 2D矢量路径数据（SVG路径语法）的表示、解析、查询与变换：
//! - `Command`: 封闭的路径命令集合（绝对/相对两种模式）
//! - `Path`: 有序命令序列与整体操作（反转、变换、拆分、包围盒）
//! - `PathWalker`: 解析命令绝对几何的带状态遍历
//! - `SuperPath`: 控制点三元组表示，用于化简与直线退化检测
//! - 数值算法：De Casteljau、弧长及其反函数、极值求解、椭圆弧参数化
//!
//! # 示例
//!
//! ```rust
//! use vpath_core::prelude::*;
//!
//! // 解析一条路径并求包围盒
//! let path = Path::parse("M 10 10 h 10 v 10 h -10 Z");
//! let bbox = path.bounding_box().unwrap();
//! assert_eq!((bbox.min.x, bbox.max.x), (10.0, 20.0));
//!
//! // 仿射变换返回新路径，简写命令改写为Line
//! let scaled = path.scale(2.0, 2.0);
//! assert_eq!(scaled.to_string(), "M 20 20 l 20 0 l 0 20 l -20 0 Z");
//! ```

pub mod arc;
pub mod bezier;
pub mod command;
pub mod error;
pub mod math;
pub mod parser;
pub mod path;
pub mod superpath;
pub mod transform;
pub mod walk;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::arc::ArcParametrization;
    pub use crate::bezier::LengthSettings;
    pub use crate::command::{Command, Segment};
    pub use crate::error::PathError;
    pub use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
    pub use crate::parser::PathParser;
    pub use crate::path::Path;
    pub use crate::superpath::{ControlTriple, SubPath, SuperPath};
    pub use crate::transform::Transform2D;
    pub use crate::walk::{LocatedCommand, PathWalker};
}
