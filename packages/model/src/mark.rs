//! # Marks
//!
//! A [`Mark`] is a named, data-bearing annotation applied to runs of text.
//! Marks compare by value so that runs carrying equal marks can be merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed data attached to marks and elements
pub type Data = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default)]
    pub data: Data,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            data: Data::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Produce a new mark with `properties` applied on top of this one
    pub fn merge(&self, properties: &MarkProperties) -> Mark {
        Mark {
            mark_type: properties
                .mark_type
                .clone()
                .unwrap_or_else(|| self.mark_type.clone()),
            data: properties.data.clone().unwrap_or_else(|| self.data.clone()),
        }
    }

    /// Full properties of this mark; merging them into any mark yields `self`
    pub fn to_properties(&self) -> MarkProperties {
        MarkProperties {
            mark_type: Some(self.mark_type.clone()),
            data: Some(self.data.clone()),
        }
    }
}

/// Partial mark used by `set_mark`; `None` fields keep the existing value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mark_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

impl MarkProperties {
    pub fn data(data: Data) -> Self {
        Self {
            mark_type: None,
            data: Some(data),
        }
    }
}

/// Insertion-ordered set of marks with set (order-insensitive) equality
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Mark>", into = "Vec<Mark>")]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.0.iter()
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.0.iter().any(|m| m == mark)
    }

    pub fn find_type(&self, mark_type: &str) -> Option<&Mark> {
        self.0.iter().find(|m| m.mark_type == mark_type)
    }

    pub fn insert(&mut self, mark: Mark) -> bool {
        if self.contains(&mark) {
            return false;
        }
        self.0.push(mark);
        true
    }

    pub fn remove(&mut self, mark: &Mark) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m != mark);
        self.0.len() != before
    }

    /// Replace the first mark of `mark_type` with `mark.merge(properties)`.
    /// Returns false when no mark of that type is present.
    pub fn update_type(&mut self, mark_type: &str, properties: &MarkProperties) -> bool {
        let Some(pos) = self.0.iter().position(|m| m.mark_type == mark_type) else {
            return false;
        };
        let updated = self.0[pos].merge(properties);
        self.0.remove(pos);
        if !self.contains(&updated) {
            self.0.insert(pos, updated);
        }
        true
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.insert(mark);
        self
    }
}

impl PartialEq for MarkSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|m| other.contains(m))
    }
}

impl From<Vec<Mark>> for MarkSet {
    fn from(marks: Vec<Mark>) -> Self {
        marks.into_iter().collect()
    }
}

impl From<MarkSet> for Vec<Mark> {
    fn from(set: MarkSet) -> Self {
        set.0
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::new();
        for mark in iter {
            set.insert(mark);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_equality_is_by_value() {
        let a = Mark::new("bold").with_data("x", 1);
        let b = Mark::new("bold").with_data("x", 1);
        let c = Mark::new("bold").with_data("x", 2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mark_set_equality_ignores_order() {
        let a: MarkSet = vec![Mark::new("bold"), Mark::new("italic")].into();
        let b: MarkSet = vec![Mark::new("italic"), Mark::new("bold")].into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mark_set_dedups() {
        let set: MarkSet = vec![Mark::new("bold"), Mark::new("bold")].into();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_update_type_replaces_in_place() {
        let mut set: MarkSet = vec![Mark::new("bold"), Mark::new("italic")].into();
        let mut data = Data::new();
        data.insert("x".to_string(), 1.into());

        assert!(set.update_type("bold", &MarkProperties::data(data)));
        assert!(set.contains(&Mark::new("bold").with_data("x", 1)));
        assert!(!set.contains(&Mark::new("bold")));
        assert!(!set.update_type("underline", &MarkProperties::default()));
    }

    #[test]
    fn test_mark_serialization() {
        let mark = Mark::new("link").with_data("href", "https://example.com");
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "link", "data": { "href": "https://example.com" } })
        );
    }
}
