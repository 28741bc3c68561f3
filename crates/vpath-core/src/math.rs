//! 数学基础类型
//!
//! 基于nalgebra提供：
//! - 2D点与向量别名 (Point2 / Vector2)
//! - 极坐标转换
//! - 容差比较
//! - 轴对齐包围盒 (BoundingBox2)

/// 2D点
pub type Point2 = nalgebra::Point2<f64>;

/// 2D向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 几何容差
pub const EPSILON: f64 = 1e-9;

/// 从极坐标构造向量
pub fn polar(radius: f64, angle: f64) -> Vector2 {
    Vector2::new(radius * angle.cos(), radius * angle.sin())
}

/// 向量的极坐标分解，返回 (模长, 角度)
pub fn to_polar(v: &Vector2) -> (f64, f64) {
    (v.norm(), v.y.atan2(v.x))
}

/// 检查两点是否在容差内重合
pub fn point_is_close(a: &Point2, b: &Point2) -> bool {
    (a - b).norm() <= EPSILON
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 从两个角点创建（自动规范化min/max）
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 空包围盒（哨兵值，任何扩展操作都会覆盖它）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// 从点集创建
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 与另一个包围盒合并
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// 检查点是否在包围盒内
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// 宽度
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// 高度
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 中心点
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_roundtrip() {
        let v = polar(5.0, std::f64::consts::FRAC_PI_4);
        let (r, a) = to_polar(&v);
        assert!((r - 5.0).abs() < EPSILON);
        assert!((a - std::f64::consts::FRAC_PI_4).abs() < EPSILON);
    }

    #[test]
    fn test_point_is_close() {
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(1.0 + 1e-12, 2.0);
        assert!(point_is_close(&a, &b));
        assert!(!point_is_close(&a, &Point2::new(1.1, 2.0)));
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BoundingBox2::from_points([
            Point2::new(3.0, -1.0),
            Point2::new(-2.0, 4.0),
            Point2::new(0.0, 0.0),
        ]);
        assert_eq!(bbox.min, Point2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point2::new(3.0, 4.0));
        assert_eq!(bbox.width(), 5.0);
        assert_eq!(bbox.height(), 5.0);
    }

    #[test]
    fn test_bbox_empty_union() {
        let empty = BoundingBox2::empty();
        assert!(empty.is_empty());
        let other = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert_eq!(empty.union(&other), other);
        assert_eq!(other.union(&empty), other);
    }
}
