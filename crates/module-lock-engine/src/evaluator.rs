//! 条件评估器
//!
//! 对单个锁定条件在上下文中求值。评估永远不会报错：缺失的键、类型不符
//! 或无法识别的操作符都按不匹配处理。

use crate::models::{Comparison, EvaluationContext, LockCondition};
use serde_json::Value;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// 以条件类型名作为键从上下文取值，再按比较方式求值。
    pub fn evaluate(condition: &LockCondition, context: &EvaluationContext) -> bool {
        let field_value = context.get_condition(condition.condition_type);
        Self::compare(field_value, &condition.comparison)
    }

    /// 按比较方式比较上下文取值
    pub fn compare(field_value: Option<&Value>, comparison: &Comparison) -> bool {
        match comparison {
            Comparison::Equals(expected) => {
                field_value.is_some_and(|field| Self::strict_eq(field, expected))
            }
            Comparison::Contains(needle) => {
                matches!(field_value, Some(Value::String(s)) if s.contains(needle.as_str()))
            }
            // NaN 参与的比较恒为 false
            Comparison::GreaterThan(threshold) => Self::coerce_number(field_value) > *threshold,
            Comparison::LessThan(threshold) => Self::coerce_number(field_value) < *threshold,
            Comparison::Unsupported { .. } => false,
        }
    }

    /// 严格相等：数字按数值比较（100 == 100.0），其余按 JSON 值比较
    fn strict_eq(field: &Value, expected: &Value) -> bool {
        match (field, expected) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => a == b,
            },
            _ => field == expected,
        }
    }

    /// 数值转换
    ///
    /// - 缺失、数组、对象 -> NaN
    /// - null -> 0，布尔 -> 0/1
    /// - 字符串去除首尾空白后：空串 -> 0，十进制字面量、`0x`/`0o`/`0b` 整数与
    ///   `Infinity`（可带符号）取其值，其余一律 NaN
    pub fn coerce_number(value: Option<&Value>) -> f64 {
        match value {
            None => f64::NAN,
            Some(Value::Null) => 0.0,
            Some(Value::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => Self::parse_numeric_str(s),
            Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
        }
    }

    fn parse_numeric_str(s: &str) -> f64 {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return 0.0;
        }

        match trimmed {
            "Infinity" | "+Infinity" => return f64::INFINITY,
            "-Infinity" => return f64::NEG_INFINITY,
            _ => {}
        }

        let radix = match trimmed.get(..2) {
            Some("0x") | Some("0X") => Some(16),
            Some("0o") | Some("0O") => Some(8),
            Some("0b") | Some("0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return Self::parse_radix_digits(&trimmed[2..], radix);
        }

        // `str::parse` 还接受 inf / nan 等拼写，先限定为十进制字面量字符
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        {
            return f64::NAN;
        }
        trimmed.parse().unwrap_or(f64::NAN)
    }

    /// 带前缀的整数字面量不允许符号，且至少有一位数字
    fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
        if digits.is_empty() {
            return f64::NAN;
        }
        digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix)
                    .map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN)
    }
}
