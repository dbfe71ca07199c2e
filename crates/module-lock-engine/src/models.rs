//! 模块锁定领域模型

use crate::evaluator::ConditionEvaluator;
use crate::operators::{ConditionOperator, ConditionType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

// ==================== 模块状态 ====================

/// 主模块状态
///
/// 任意字符串都能被接收，未知取值保存在 `Unrecognized` 中，同步时按 locked 处理。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleStatus {
    #[default]
    Locked,
    Available,
    Completed,
    Unrecognized(String),
}

impl ModuleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::Completed => "completed",
            Self::Unrecognized(s) => s,
        }
    }
}

impl From<String> for ModuleStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "locked" => Self::Locked,
            "available" => Self::Available,
            "completed" => Self::Completed,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<&str> for ModuleStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ModuleStatus> for String {
    fn from(status: ModuleStatus) -> Self {
        match status {
            ModuleStatus::Unrecognized(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 计分模块状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreModuleStatus {
    #[default]
    Locked,
    Unlocked,
    Completed,
}

impl ScoreModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ScoreModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== 模块 ====================

/// 关卡
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: u32,
}

impl Level {
    pub fn new(id: u32, score: u32) -> Self {
        Self {
            id,
            title: String::new(),
            score,
        }
    }
}

/// 主模块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// 稳定键，如 "1" 或 "HL2"
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: ModuleStatus,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Module {
    pub fn new(id: impl Into<String>, status: ModuleStatus) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            status,
            levels: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_levels(mut self, levels: Vec<Level>) -> Self {
        self.levels = levels;
        self
    }

    /// 复制模块并替换状态
    pub fn with_status(&self, status: ModuleStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.status)
    }
}

/// 计分模块，完全由主模块派生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreModule {
    pub id: u8,
    pub status: ScoreModuleStatus,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl ScoreModule {
    /// 锁定的占位模块
    pub fn locked(id: u8) -> Self {
        Self {
            id,
            status: ScoreModuleStatus::Locked,
            levels: Vec::new(),
        }
    }
}

impl fmt::Display for ScoreModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.status)
    }
}

// ==================== 条件与规则 ====================

/// 比较方式及其比较值
///
/// 比较值的类型随操作符确定：数值比较只接受数字，`contains` 只接受字符串。
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equals(Value),
    Contains(String),
    GreaterThan(f64),
    LessThan(f64),
    /// 无法识别的操作符，永远不匹配
    Unsupported { operator: String, value: Value },
}

impl Comparison {
    /// 操作符名称
    pub fn operator_name(&self) -> &str {
        match self {
            Self::Equals(_) => ConditionOperator::Equals.as_str(),
            Self::Contains(_) => ConditionOperator::Contains.as_str(),
            Self::GreaterThan(_) => ConditionOperator::GreaterThan.as_str(),
            Self::LessThan(_) => ConditionOperator::LessThan.as_str(),
            Self::Unsupported { operator, .. } => operator,
        }
    }

    /// 比较值的 JSON 表示（NaN 表示为 null）
    pub fn value(&self) -> Value {
        match self {
            Self::Equals(v) | Self::Unsupported { value: v, .. } => v.clone(),
            Self::Contains(s) => Value::String(s.clone()),
            Self::GreaterThan(n) | Self::LessThan(n) => {
                Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
            }
        }
    }
}

/// 锁定条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLockCondition", into = "RawLockCondition")]
pub struct LockCondition {
    pub condition_type: ConditionType,
    pub comparison: Comparison,
}

impl LockCondition {
    pub fn new(condition_type: ConditionType, comparison: Comparison) -> Self {
        Self {
            condition_type,
            comparison,
        }
    }

    pub fn equals(condition_type: ConditionType, value: impl Into<Value>) -> Self {
        Self::new(condition_type, Comparison::Equals(value.into()))
    }

    pub fn contains(condition_type: ConditionType, needle: impl Into<String>) -> Self {
        Self::new(condition_type, Comparison::Contains(needle.into()))
    }

    pub fn greater_than(condition_type: ConditionType, threshold: f64) -> Self {
        Self::new(condition_type, Comparison::GreaterThan(threshold))
    }

    pub fn less_than(condition_type: ConditionType, threshold: f64) -> Self {
        Self::new(condition_type, Comparison::LessThan(threshold))
    }

    /// 用户邮箱精确匹配
    pub fn user_email(email: impl Into<String>) -> Self {
        Self::equals(ConditionType::UserEmail, Value::String(email.into()))
    }
}

impl fmt::Display for LockCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.condition_type,
            self.comparison.operator_name(),
            self.comparison.value()
        )
    }
}

/// 规则文档中的条件形态：`{ "type", "value", "operator"? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLockCondition {
    #[serde(rename = "type")]
    condition_type: ConditionType,
    #[serde(default)]
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<String>,
}

impl From<RawLockCondition> for LockCondition {
    fn from(raw: RawLockCondition) -> Self {
        // 缺省操作符按 equals 处理
        let operator = raw.operator.as_deref().unwrap_or("equals");

        let comparison = match operator.parse::<ConditionOperator>() {
            Ok(ConditionOperator::Equals) => Comparison::Equals(raw.value),
            Ok(ConditionOperator::Contains) => Comparison::Contains(match raw.value {
                Value::String(s) => s,
                other => other.to_string(),
            }),
            Ok(ConditionOperator::GreaterThan) => {
                Comparison::GreaterThan(ConditionEvaluator::coerce_number(Some(&raw.value)))
            }
            Ok(ConditionOperator::LessThan) => {
                Comparison::LessThan(ConditionEvaluator::coerce_number(Some(&raw.value)))
            }
            Err(unknown) => Comparison::Unsupported {
                operator: unknown,
                value: raw.value,
            },
        };

        Self::new(raw.condition_type, comparison)
    }
}

impl From<LockCondition> for RawLockCondition {
    fn from(condition: LockCondition) -> Self {
        Self {
            condition_type: condition.condition_type,
            value: condition.comparison.value(),
            operator: Some(condition.comparison.operator_name().to_string()),
        }
    }
}

/// 锁定规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRule {
    /// 仅用于后续删除，不要求唯一
    pub id: String,
    #[serde(alias = "module_id")]
    pub module_id: String,
    pub condition: LockCondition,
    #[serde(alias = "unlock_action")]
    pub unlock_action: ModuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LockRule {
    pub fn new(
        id: impl Into<String>,
        module_id: impl Into<String>,
        condition: LockCondition,
        unlock_action: ModuleStatus,
    ) -> Self {
        Self {
            id: id.into(),
            module_id: module_id.into(),
            condition,
            unlock_action,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ==================== 评估上下文 ====================

/// 评估上下文 - 条件类型名到运行时取值的映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    data: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// 设置用户邮箱；邮箱缺失时不写入该键
    pub fn with_user_email(mut self, email: Option<&str>) -> Self {
        if let Some(email) = email {
            self.data.insert(
                ConditionType::UserEmail.as_str().to_string(),
                Value::String(email.to_string()),
            );
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// 合并另一个上下文，同名键以 `other` 为准
    pub fn merged(mut self, other: &EvaluationContext) -> Self {
        for (key, value) in &other.data {
            self.data.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// 按条件类型取值
    pub fn get_condition(&self, condition_type: ConditionType) -> Option<&Value> {
        self.data.get(condition_type.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
