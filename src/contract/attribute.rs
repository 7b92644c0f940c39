use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
    Flag(bool),
}

impl Value {
    fn ordered(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparator {
    Eq,
    Min,
    Greater,
    Max,
    Less,
    InRange,
    OutRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureConstraint {
    pub comparator: Comparator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default)]
    pub dynamic: bool,
}

impl FeatureConstraint {
    pub fn equal(value: Value) -> Self {
        Self {
            comparator: Comparator::Eq,
            value,
            minimum: None,
            maximum: None,
            dynamic: false,
        }
    }

    pub fn at_least(value: Value) -> Self {
        Self {
            comparator: Comparator::Min,
            ..Self::equal(value)
        }
    }

    pub fn in_range(minimum: Value, maximum: Value) -> Self {
        Self {
            comparator: Comparator::InRange,
            value: minimum.clone(),
            minimum: Some(minimum),
            maximum: Some(maximum),
            dynamic: false,
        }
    }

    pub fn dynamic(value: Value) -> Self {
        Self {
            dynamic: true,
            ..Self::equal(value)
        }
    }

    pub fn admits(&self, offered: &Value) -> bool {
        match self.comparator {
            Comparator::Eq => offered == &self.value,
            Comparator::Min => {
                matches!(offered.ordered(&self.value), Some(Ordering::Greater | Ordering::Equal))
            }
            Comparator::Greater => matches!(offered.ordered(&self.value), Some(Ordering::Greater)),
            Comparator::Max => {
                matches!(offered.ordered(&self.value), Some(Ordering::Less | Ordering::Equal))
            }
            Comparator::Less => matches!(offered.ordered(&self.value), Some(Ordering::Less)),
            Comparator::InRange => self.within_bounds(offered).unwrap_or(false),
            Comparator::OutRange => self.within_bounds(offered).map(|inside| !inside).unwrap_or(false),
        }
    }

    fn within_bounds(&self, offered: &Value) -> Option<bool> {
        let minimum = self.minimum.as_ref()?;
        let maximum = self.maximum.as_ref()?;
        let above = matches!(
            offered.ordered(minimum)?,
            Ordering::Greater | Ordering::Equal
        );
        let below = matches!(offered.ordered(maximum)?, Ordering::Less | Ordering::Equal);
        Some(above && below)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Attribute {
    Feature(FeatureConstraint),
    CostEstimate { units: Vec<u64> },
}
