//! 超路径：控制点三元组的嵌套列表表示
//!
//! 每条子路径是 [进入控制点, 节点, 离开控制点] 三元组的有序列表，
//! 节点无曲率时两个控制点默认与节点重合，用于直线退化检测。
//! 由Path构建，可转换回Path；首次转换之后的往返是逐字节稳定的。

use crate::command::{Command, Segment};
use crate::math::{point_is_close, Point2};
use crate::path::Path;
use serde::{Deserialize, Serialize};

/// 控制点三元组
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlTriple {
    /// 进入节点的控制点
    pub ctrl_in: Point2,
    /// 节点本身
    pub node: Point2,
    /// 离开节点的控制点
    pub ctrl_out: Point2,
}

impl ControlTriple {
    pub fn new(ctrl_in: Point2, node: Point2, ctrl_out: Point2) -> Self {
        Self {
            ctrl_in,
            node,
            ctrl_out,
        }
    }

    /// 无曲率节点：两个控制点都与节点重合
    pub fn corner(node: Point2) -> Self {
        Self {
            ctrl_in: node,
            node,
            ctrl_out: node,
        }
    }
}

/// 子路径：三元组序列
pub type SubPath = Vec<ControlTriple>;

/// 超路径：子路径的有序列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperPath {
    pub subpaths: Vec<SubPath>,
}

/// 共线容差（叉积判据）
const COLLINEAR_TOLERANCE: f64 = 1e-8;

impl SuperPath {
    /// 从子路径列表构造
    pub fn from_subpaths(subpaths: Vec<SubPath>) -> Self {
        Self { subpaths }
    }

    /// 从路径构建
    ///
    /// 所有可绘制命令规范化为三次曲线（弧做扇区近似）；Move开始
    /// 新子路径；ClosePath追加回到子路径起点的节点，使闭合在
    /// 往返转换中保留。
    pub fn from_path(path: &Path) -> Self {
        let mut subpaths: Vec<SubPath> = Vec::new();
        let mut current: SubPath = Vec::new();
        for located in path.walk() {
            match located.command.segment {
                Segment::Move { .. } => {
                    if !current.is_empty() {
                        subpaths.push(std::mem::take(&mut current));
                    }
                    current.push(ControlTriple::corner(located.end_point()));
                }
                Segment::ClosePath => {
                    if let Some(last) = current.last() {
                        if !point_is_close(&last.node, &located.first) {
                            current.push(ControlTriple::corner(located.first));
                        }
                    }
                    if !current.is_empty() {
                        subpaths.push(std::mem::take(&mut current));
                    }
                }
                _ => {
                    if current.is_empty() {
                        current.push(ControlTriple::corner(located.prev));
                    }
                    let curves = match located.command.to_curves(located.prev, located.prev_control)
                    {
                        Ok(curves) => curves,
                        // Move与ClosePath已在上面分支处理
                        Err(_) => unreachable!("drawable commands always convert to curves"),
                    };
                    for curve in curves {
                        if let Segment::CubicCurve { c1, c2, to } = curve.segment {
                            if let Some(last) = current.last_mut() {
                                last.ctrl_out = c1;
                            }
                            current.push(ControlTriple {
                                ctrl_in: c2,
                                node: to,
                                ctrl_out: to,
                            });
                        }
                    }
                }
            }
        }
        if !current.is_empty() {
            subpaths.push(current);
        }
        Self { subpaths }
    }

    /// 转换回路径（绝对命令）
    ///
    /// 控制点共线且位于端点之间的曲线段无损退化为Line；闭合
    /// 子路径的末段若是这样的直线，则用ClosePath代替显式线段。
    pub fn to_path(&self) -> Path {
        let mut path = Path::new();
        for subpath in &self.subpaths {
            let Some(first) = subpath.first() else {
                continue;
            };
            path.push(Command::absolute(Segment::Move { to: first.node }));
            if subpath.len() < 2 {
                continue;
            }
            let closed = point_is_close(&subpath[subpath.len() - 1].node, &first.node);
            for i in 1..subpath.len() {
                let from = &subpath[i - 1];
                let to = &subpath[i];
                let is_last = i == subpath.len() - 1;
                if Self::is_line(from, to) {
                    if is_last && closed {
                        // 闭合线由ClosePath隐式绘制
                        break;
                    }
                    path.push(Command::absolute(Segment::Line { to: to.node }));
                } else {
                    path.push(Command::absolute(Segment::CubicCurve {
                        c1: from.ctrl_out,
                        c2: to.ctrl_in,
                        to: to.node,
                    }));
                }
            }
            if closed {
                path.push(Command::absolute(Segment::ClosePath));
            }
        }
        path
    }

    /// 三点是否共线（叉积容差判据）
    pub fn collinear(a: &Point2, b: &Point2, c: &Point2) -> bool {
        let ab = b - a;
        let ac = c - a;
        (ab.x * ac.y - ab.y * ac.x).abs() < COLLINEAR_TOLERANCE
    }

    /// 标量x是否落在a与b之间（与顺序无关，含端点）
    pub fn within(x: f64, a: f64, b: f64) -> bool {
        (a..=b).contains(&x) || (b..=a).contains(&x)
    }

    /// 两个三元组之间的段是否退化为直线
    ///
    /// 两个控制点都必须与端点共线，且位于端点之间（逐坐标的
    /// 区间包含判据），这样退化回Line不丢失几何。
    pub fn is_line(p1: &ControlTriple, p2: &ControlTriple) -> bool {
        let point_within = |p: &Point2| {
            Self::within(p.x, p1.node.x, p2.node.x) && Self::within(p.y, p1.node.y, p2.node.y)
        };
        Self::collinear(&p1.node, &p1.ctrl_out, &p2.node)
            && Self::collinear(&p1.node, &p2.ctrl_in, &p2.node)
            && point_within(&p1.ctrl_out)
            && point_within(&p2.ctrl_in)
    }

    pub fn len(&self) -> usize {
        self.subpaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

impl std::ops::Index<usize> for SuperPath {
    type Output = SubPath;

    fn index(&self, index: usize) -> &SubPath {
        &self.subpaths[index]
    }
}

impl Path {
    /// 转换为超路径表示
    pub fn to_superpath(&self) -> SuperPath {
        SuperPath::from_path(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_closing_splits_subpaths() {
        let path = Path::parse(
            "M 0,0 C 1.505,0 2.727,-0.823 2.727,-1.841 V -4.348 C 2.727,-5.363 \
             1.505,-6.189 0,-6.189 H -8.3 V 0 Z m -10.713,1.991 h -0.211 V -8.178 \
             H 0 c 2.954,0 5.345,1.716 5.345,3.83 v 2.507 C 5.345,0.271 2.954,1.991 \
             0,1.991 Z",
        );
        let csp = path.to_superpath();
        assert_eq!(csp.len(), 2);
    }

    #[test]
    fn test_closing_without_z() {
        let path = Path::parse(
            "m 51.553104,253.58572 c -11.644086,-0.14509 -4.683516,-19.48876 \
             2.096523,-8.48973 1.722993,2.92995 0.781608,6.73867 -2.096523,8.48973 \
             m -3.100522,-13.02176 c -18.971587,17.33811 15.454875,20.05577 \
             6.51412,3.75474 -1.362416,-2.30812 -3.856221,-3.74395 -6.51412,-3.75474",
        );
        let csp = path.to_superpath();
        assert_eq!(csp.len(), 2);
    }

    #[test]
    fn test_from_triples() {
        let csp = SuperPath::from_subpaths(vec![
            vec![
                ControlTriple::new(pt(14.0, 173.0), pt(14.0, 173.0), pt(14.0, 173.0)),
                ControlTriple::new(pt(15.0, 171.0), pt(17.0, 168.0), pt(18.0, 168.0)),
            ],
            vec![
                ControlTriple::new(pt(18.0, 167.0), pt(18.0, 167.0), pt(20.0, 165.0)),
                ControlTriple::new(pt(21.0, 164.0), pt(22.0, 162.0), pt(23.0, 162.0)),
            ],
        ]);
        assert_eq!(
            csp.to_path().to_string(),
            "M 14 173 C 14 173 15 171 17 168 M 18 167 C 20 165 21 164 22 162"
        );
    }

    #[test]
    fn test_is_line_detection() {
        let path = Path::parse(
            "m 49,88 70,-1 c 18,17 1,59 1.7,59 \
             0,0 -48.7,18 -70.5,-1 18,-15 25,-32.4 -1.5,-57.2 z",
        );
        let csp = path.to_superpath();
        assert!(SuperPath::is_line(&csp[0][0], &csp[0][1]), "should be a line");
        assert!(
            !SuperPath::is_line(&csp[0][3], &csp[0][4]),
            "both controls not detected"
        );
        assert!(
            !SuperPath::is_line(&csp[0][1], &csp[0][2]),
            "start control not detected"
        );
        assert!(
            !SuperPath::is_line(&csp[0][2], &csp[0][3]),
            "end control not detected"
        );

        // 闭合处理：直线段回退为Line，末端用Z闭合
        let out = csp.to_path();
        let letters: String = out.iter().map(|c| c.letter()).collect();
        assert_eq!(letters, "MLCCCZ");
    }

    #[test]
    fn test_is_line_simplify() {
        let path = Path::parse("M 10 10 C 20,20 30,30 40,40 C 100, 100 50, 50 60, 60");
        let csp = path.to_superpath();

        // 控制点在端点之间：可以退化
        assert!(SuperPath::is_line(&csp[0][0], &csp[0][1]));
        // 共线但控制点越过端点：不能退化
        assert!(!SuperPath::is_line(&csp[0][1], &csp[0][2]));

        assert_eq!(
            csp.to_path().to_string(),
            "M 10 10 L 40 40 C 100 100 50 50 60 60"
        );
    }

    #[test]
    fn test_collinear() {
        assert!(!SuperPath::collinear(
            &pt(1.0, 2.0),
            &pt(2.0, 2.00001),
            &pt(3.0, 2.0)
        ));
        assert!(SuperPath::collinear(
            &pt(1.0, 2.0),
            &pt(2.0, 2.0),
            &pt(3.0, 2.0)
        ));
        assert!(SuperPath::collinear(
            &pt(3.0, 2.0),
            &pt(2.0, 2.0),
            &pt(1.0, 2.0)
        ));
    }

    #[test]
    fn test_within() {
        assert!(SuperPath::within(2.0, 1.0, 3.0));
        assert!(SuperPath::within(2.0, 3.0, 1.0));
        assert!(SuperPath::within(2.0, 2.0, 2.0));
        assert!(SuperPath::within(2.0, 3.0, 2.0));
        assert!(!SuperPath::within(3.0, 2.9999, 2.0));
    }

    #[test]
    fn test_roundtrip_stable() {
        let path = Path::parse("M 10 10 h 10 v 10 h -10 Z");
        let mut csp = path.to_superpath();
        let reference = csp.clone();
        for _ in 0..15 {
            csp = csp.to_path().to_superpath();
            assert_eq!(csp, reference);
        }
    }

    #[test]
    fn test_roundtrip_stable_with_curves() {
        // 首次转换有损（弧变曲线、可退化曲线变直线），之后稳定
        let path = Path::parse("M 0 0 A 50 50 0 0 1 85 85 C 100 100 120 90 130 85 Z");
        let once = path.to_superpath().to_path();
        let twice = once.to_superpath().to_path();
        assert_eq!(once, twice);
        let thrice = twice.to_superpath().to_path();
        assert_eq!(twice, thrice);
    }

    #[test]
    fn test_arc_becomes_curves() {
        let path = Path::parse("M 0 0 A 50 50 0 0 1 85 85");
        let csp = path.to_superpath();
        assert_eq!(csp.len(), 1);
        // 180度的弧近似为3段曲线：4个节点
        assert_eq!(csp[0].len(), 4);
    }
}
