use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A keyed node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: Value,
}

/// Either a scalar leaf or an ordered list of children, never both.
///
/// Children keep source order and may repeat keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Leaf(String),
    Branch(Vec<Property>),
}

impl Property {
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Leaf(value.into()),
        }
    }

    pub fn branch(key: impl Into<String>, children: Vec<Property>) -> Self {
        Self {
            key: key.into(),
            value: Value::Branch(children),
        }
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Leaf(value) => Some(value),
            Value::Branch(_) => None,
        }
    }

    pub fn children(&self) -> &[Property] {
        match self {
            Value::Leaf(_) => &[],
            Value::Branch(children) => children,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Value::Branch(_))
    }

    /// First child whose key matches `key`, ignoring ASCII case as Steam does.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.children()
            .iter()
            .find(|child| child.key.eq_ignore_ascii_case(key))
            .map(|child| &child.value)
    }

    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Scalar value under `key`, if it exists and is a leaf.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Scalar value under `key` with surrounding whitespace removed, or `None` when blank.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.str(key).map(str::trim).filter(|value| !value.is_empty())
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.non_blank(key).and_then(|value| value.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Value {
        Value::Branch(vec![
            Property::branch(
                "common",
                vec![
                    Property::leaf("name", "Game"),
                    Property::leaf("icon", "  "),
                ],
            ),
            Property::leaf("buildid", "42"),
            Property::leaf("buildid", "43"),
        ])
    }

    #[test]
    fn lookups_fail_closed() {
        let root = sample();
        assert_eq!(root.get_path(&["common", "name"]).and_then(Value::as_str), Some("Game"));
        assert_eq!(root.get_path(&["common", "missing"]), None);
        assert_eq!(root.get_path(&["buildid", "deeper"]), None);
        assert_eq!(root.str("common"), None);
        assert_eq!(root.get("common").and_then(|c| c.non_blank("icon")), None);
    }

    #[test]
    fn first_duplicate_key_wins_and_case_is_ignored() {
        let root = sample();
        assert_eq!(root.parse::<u32>("BuildID"), Some(42));
        assert_eq!(root.children().len(), 3);
    }

    #[test]
    fn leaves_have_no_children() {
        let leaf = Value::Leaf("x".into());
        assert!(leaf.children().is_empty());
        assert!(!leaf.is_branch());
        assert_eq!(leaf.get("x"), None);
    }
}
