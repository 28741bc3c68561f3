//! 路径数据文本解析器
//!
//! 按SVG路径语法的宽容错误恢复规则解析：
//! - 命令字母后跟坐标组，逗号与空白等价
//! - 没有新字母的坐标组重复当前命令（Move链为Line，ClosePath链为Move）
//! - 数字支持简写拼接（"1.5.6" 是 1.5 和 0.6）与科学计数法
//! - 首个有效字母之前的无法识别文本跳过并记录诊断
//! - 尾部残缺的参数组丢弃并记录诊断，不报错
//!
//! 文本解析是宽容的；程序化构造命令时参数个数错误仍然立即报错
//! （见 `Command::from_letter_args`）。

use crate::command::{nargs_for_letter, Command, Segment};
use tracing::{debug, warn};

/// 路径数据解析器
pub struct PathParser;

/// 字符是否为命令字母
fn is_command_letter(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'M' | 'L' | 'H' | 'V' | 'C' | 'S' | 'Q' | 'T' | 'A' | 'Z'
    )
}

/// 字符是否为参数分隔符
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// 坐标组链中的隐式后继命令
fn implicit_next(letter: char) -> char {
    match letter {
        'M' => 'L',
        'm' => 'l',
        'Z' => 'M',
        'z' => 'm',
        other => other,
    }
}

impl PathParser {
    /// 解析路径数据文本
    ///
    /// 永不失败；语法问题按宽容规则就地恢复。
    pub fn parse(text: &str) -> Vec<Command> {
        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0;
        let mut commands = Vec::new();

        // 跳过首个命令字母之前的所有内容
        let start = pos;
        while pos < chars.len() && !is_command_letter(chars[pos]) {
            pos += 1;
        }
        if chars[start..pos].iter().any(|c| !c.is_whitespace()) {
            warn!(
                skipped = %chars[start..pos].iter().collect::<String>().trim(),
                "skipping unrecognized text before first path command"
            );
        }

        while pos < chars.len() {
            let letter = chars[pos];
            pos += 1;

            // 收集到下一个命令字母为止的全部数字
            let mut numbers = Vec::new();
            loop {
                while pos < chars.len() && is_separator(chars[pos]) {
                    pos += 1;
                }
                if pos >= chars.len() || is_command_letter(chars[pos]) {
                    break;
                }
                match scan_number(&chars, &mut pos) {
                    Some(value) => numbers.push(value),
                    None => {
                        debug!(at = pos, "skipping unrecognized character in path data");
                        pos += 1;
                    }
                }
            }

            Self::assemble(letter, &numbers, &mut commands);
        }
        commands
    }

    /// 把一个字母与其数字序列装配成命令链
    fn assemble(letter: char, numbers: &[f64], commands: &mut Vec<Command>) {
        let mut current = letter;
        let mut idx = 0;
        let mut first_group = true;
        loop {
            let nargs = match nargs_for_letter(current) {
                Some(n) => n,
                None => return,
            };
            if numbers.len() - idx < nargs {
                if numbers.len() - idx > 0 {
                    // 残缺的尾组：按语法的恢复规则丢弃
                    warn!(
                        letter = %current,
                        discarded = numbers.len() - idx,
                        "discarding incomplete trailing argument group"
                    );
                }
                return;
            }
            if nargs == 0 {
                if first_group {
                    // ClosePath本身
                    commands.push(Command {
                        segment: Segment::ClosePath,
                        relative: current.is_ascii_lowercase(),
                    });
                    first_group = false;
                    current = implicit_next(current);
                    if idx >= numbers.len() {
                        return;
                    }
                    continue;
                }
                return;
            }
            match Command::from_letter_args(current, &numbers[idx..idx + nargs]) {
                Ok(cmd) => commands.push(cmd),
                Err(_) => return,
            }
            idx += nargs;
            first_group = false;
            current = implicit_next(current);
            if idx >= numbers.len() {
                return;
            }
        }
    }
}

/// 从pos处扫描一个SVG数字
///
/// 语法：[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?
/// 扫描失败时pos不动，返回None。
fn scan_number(chars: &[char], pos: &mut usize) -> Option<f64> {
    let start = *pos;
    let mut i = *pos;
    let len = chars.len();

    if i < len && (chars[i] == '+' || chars[i] == '-') {
        i += 1;
    }
    let int_start = i;
    while i < len && chars[i].is_ascii_digit() {
        i += 1;
    }
    let has_int = i > int_start;
    let mut has_frac = false;
    if i < len && chars[i] == '.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < len && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            has_frac = true;
            i = j;
        } else if has_int {
            // "1." 形式：小数点属于这个数字
            i = frac_start;
        }
    }
    if !has_int && !has_frac {
        return None;
    }
    // 指数部分只有后面真的跟着数字才消费
    if i < len && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < len && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    match text.parse::<f64>() {
        Ok(value) => {
            *pos = i;
            Some(value)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(cmds: &[Command]) -> String {
        cmds.iter().map(|c| c.letter()).collect()
    }

    fn render(cmds: &[Command]) -> String {
        cmds.iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_basic_parse() {
        let cmds = PathParser::parse("M12 34L56 78Z");
        assert_eq!(letters(&cmds), "MLZ");
        assert_eq!(render(&cmds), "M 12 34 L 56 78 Z");
    }

    #[test]
    fn test_separators_interchangeable() {
        let cmds = PathParser::parse("M 50,50 L 10,10 m 10 10 l 2.1,2");
        assert_eq!(render(&cmds), "M 50 50 L 10 10 m 10 10 l 2.1 2");
    }

    #[test]
    fn test_chained_groups() {
        // Move链为Line
        assert_eq!(render(&PathParser::parse("M 100 100 20 20")), "M 100 100 L 20 20");
        // ClosePath链为Move
        assert_eq!(
            render(&PathParser::parse("M 100 100 Z 20 20")),
            "M 100 100 Z M 20 20"
        );
        assert_eq!(
            render(&PathParser::parse("M 100 100 L 20 20 40 40 30 10 Z")),
            "M 100 100 L 20 20 L 40 40 L 30 10 Z"
        );
        // 相对Move链为相对Line
        assert_eq!(render(&PathParser::parse("m 50 50 20 20")), "m 50 50 l 20 20");
        assert_eq!(
            render(&PathParser::parse("m 50 50 l 20 20 40 40")),
            "m 50 50 l 20 20 l 40 40"
        );
    }

    #[test]
    fn test_number_shorthand() {
        let cmds = PathParser::parse("M 1.5.6 2");
        // "1.5.6" 是两个数：1.5 与 0.6，随后的2落入残缺组被丢弃
        assert_eq!(cmds.len(), 1);
        let args = cmds[0].args();
        assert!((args[0] - 1.5).abs() < 1e-12);
        assert!((args[1] - 0.6).abs() < 1e-12);

        let cmds = PathParser::parse("M 1-2");
        assert_eq!(cmds[0].args(), vec![1.0, -2.0]);

        let cmds = PathParser::parse("M 1e2 2e-1");
        assert_eq!(cmds[0].args(), vec![100.0, 0.2]);
    }

    #[test]
    fn test_leading_junk_skipped() {
        let cmds = PathParser::parse("& 10 10 M 20 20");
        assert_eq!(render(&cmds), "M 20 20");
    }

    #[test]
    fn test_incomplete_trailing_group_discarded() {
        let cmds = PathParser::parse("M 10,10 L 20,20,30");
        assert_eq!(render(&cmds), "M 10 10 L 20 20");
    }

    #[test]
    fn test_empty_input() {
        assert!(PathParser::parse("").is_empty());
        assert!(PathParser::parse("   ").is_empty());
        assert!(PathParser::parse("not a path").is_empty());
    }

    #[test]
    fn test_arc_flags() {
        let cmds = PathParser::parse("M 150,150 a 76,55 0 1 1 283,128");
        assert_eq!(letters(&cmds), "Ma");
        assert_eq!(cmds[1].args(), vec![76.0, 55.0, 0.0, 1.0, 1.0, 283.0, 128.0]);
    }
}
