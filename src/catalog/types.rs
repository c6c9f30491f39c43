use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the three PP 1875 appendices
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Appendix {
    /// Appendix 1: prohibition on foreign goods
    #[serde(rename = "appendix1")]
    One,
    /// Appendix 2: restriction on foreign goods
    #[serde(rename = "appendix2")]
    Two,
    /// Appendix 3: advantage for domestic goods, with a minimum share quota
    #[serde(rename = "appendix3")]
    Three,
}

impl Appendix {
    pub const ALL: [Appendix; 3] = [Appendix::One, Appendix::Two, Appendix::Three];

    /// Appendix number as printed in the decree (1, 2 or 3)
    pub fn number(self) -> u8 {
        match self {
            Appendix::One => 1,
            Appendix::Two => 2,
            Appendix::Three => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Appendix::One),
            2 => Some(Appendix::Two),
            3 => Some(Appendix::Three),
            _ => None,
        }
    }

    /// Short name of the regime the appendix establishes
    pub fn title(self) -> &'static str {
        match self {
            Appendix::One => "prohibition",
            Appendix::Two => "restriction",
            Appendix::Three => "advantage",
        }
    }

    /// Whether points of this appendix carry a quota
    pub fn has_quota(self) -> bool {
        self == Appendix::Three
    }
}

impl fmt::Display for Appendix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "appendix {}", self.number())
    }
}

/// A single classifier entry with the appendix points citing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Dot-segmented hierarchical code, e.g. `08.12.12.140`
    pub code: String,
    pub name: String,
    /// Comma-separated point ids of appendix 1 (empty when not cited)
    #[serde(default, rename = "app1")]
    pub appendix1: String,
    #[serde(default, rename = "app2")]
    pub appendix2: String,
    #[serde(default, rename = "app3")]
    pub appendix3: String,
}

impl ClassificationRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            appendix1: String::new(),
            appendix2: String::new(),
            appendix3: String::new(),
        }
    }

    /// Set the raw citation field of an appendix
    pub fn with_appendix(mut self, appendix: Appendix, field: impl Into<String>) -> Self {
        *self.appendix_mut(appendix) = field.into();
        self
    }

    /// Raw citation field for an appendix
    pub fn appendix(&self, appendix: Appendix) -> &str {
        match appendix {
            Appendix::One => &self.appendix1,
            Appendix::Two => &self.appendix2,
            Appendix::Three => &self.appendix3,
        }
    }

    pub(crate) fn appendix_mut(&mut self, appendix: Appendix) -> &mut String {
        match appendix {
            Appendix::One => &mut self.appendix1,
            Appendix::Two => &mut self.appendix2,
            Appendix::Three => &mut self.appendix3,
        }
    }

    /// True when the appendix field holds anything but whitespace
    pub fn cites(&self, appendix: Appendix) -> bool {
        !self.appendix(appendix).trim().is_empty()
    }

    /// Point ids cited from an appendix, in field order
    pub fn point_ids(&self, appendix: Appendix) -> impl Iterator<Item = &str> {
        split_point_ids(self.appendix(appendix))
    }
}

/// Split a citation field into trimmed, non-empty point ids
pub fn split_point_ids(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|id| !id.is_empty())
}

/// An appendix point: what the decree says about the codes it lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    /// Minimum share in percent, appendix 3 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<f64>,
}

impl ReferencePoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: f64) -> Self {
        self.quota = Some(quota);
        self
    }
}

/// Point id -> point lookup for one appendix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    points: BTreeMap<String, ReferencePoint>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, point_id: &str) -> Option<&ReferencePoint> {
        self.points.get(point_id)
    }

    /// Insert a point, replacing any previous point with the same id
    pub fn insert(&mut self, point_id: impl Into<String>, point: ReferencePoint) {
        self.points.insert(point_id.into(), point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferencePoint)> {
        self.points.iter().map(|(id, point)| (id.as_str(), point))
    }
}

impl<K: Into<String>> FromIterator<(K, ReferencePoint)> for ReferenceTable {
    fn from_iter<T: IntoIterator<Item = (K, ReferencePoint)>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().map(|(id, point)| (id.into(), point)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_point_ids_trims_and_skips_empty() {
        let ids: Vec<&str> = split_point_ids(" 1, 12 ,,3 ").collect();
        assert_eq!(ids, vec!["1", "12", "3"]);
        assert_eq!(split_point_ids("").count(), 0);
        assert_eq!(split_point_ids(" , ").count(), 0);
    }

    #[test]
    fn test_record_cites_ignores_whitespace() {
        let record = ClassificationRecord::new("08.12", "Щебень")
            .with_appendix(Appendix::Two, "5")
            .with_appendix(Appendix::Three, "   ");
        assert!(!record.cites(Appendix::One));
        assert!(record.cites(Appendix::Two));
        assert!(!record.cites(Appendix::Three));
    }

    #[test]
    fn test_record_serializes_with_short_field_names() {
        let record = ClassificationRecord::new("13.96.17", "Ткани узкие")
            .with_appendix(Appendix::Three, "7");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["app3"], "7");
        assert_eq!(json["app1"], "");

        let parsed: ClassificationRecord =
            serde_json::from_str(r#"{"code":"01","name":"Продукция"}"#).unwrap();
        assert_eq!(parsed.appendix1, "");
    }

    #[test]
    fn test_appendix_numbers_round_trip() {
        for appendix in Appendix::ALL {
            assert_eq!(Appendix::from_number(appendix.number()), Some(appendix));
        }
        assert_eq!(Appendix::from_number(4), None);
        assert!(Appendix::Three.has_quota());
        assert!(!Appendix::One.has_quota());
    }

    #[test]
    fn test_reference_table_lookup() {
        let table: ReferenceTable = [
            ("5", ReferencePoint::new("ограничение допуска")),
            ("7", ReferencePoint::new("ткани").with_quota(30.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("7").and_then(|p| p.quota), Some(30.0));
        assert!(table.get("999").is_none());
    }
}
