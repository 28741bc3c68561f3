//! 路径几何错误定义

use thiserror::Error;

/// 路径命令与几何运算错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    #[error("unknown path command letter '{0}'")]
    UnknownCommand(char),

    #[error("wrong argument count for command '{letter}': expected {expected}, got {got}")]
    ArgumentCount {
        letter: char,
        expected: usize,
        got: usize,
    },

    #[error("parameter t={0} is outside [0, 1]")]
    ParameterOutOfRange(f64),

    #[error("derivative order must be a positive integer")]
    ZeroDerivativeOrder,

    #[error("derivative of a zero-length segment is undefined")]
    ZeroLengthSegment,

    #[error("command '{0}' has no curve representation")]
    NoCurveRepresentation(char),

    #[error("command '{0}' cannot be split")]
    NotSplittable(char),

    #[error("command '{0}' must be rewritten as a line before transforming")]
    UntransformableShorthand(char),

    #[error("arc length {0} is outside the segment's total length")]
    LengthOutOfRange(f64),
}
