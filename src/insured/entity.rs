//! Insured entity references and snapshots

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::error::{EngineError, Result};

/// What an insured entity is
///
/// Declaration order is the traversal order of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuredKind {
    Individual,
    Object,
    Event,
}

impl fmt::Display for InsuredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsuredKind::Individual => write!(f, "individual"),
            InsuredKind::Object => write!(f, "object"),
            InsuredKind::Event => write!(f, "event"),
        }
    }
}

impl FromStr for InsuredKind {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "insured_type" | "insuredtype" => Ok(InsuredKind::Individual),
            "object" | "insured_object" | "insuredobject" => Ok(InsuredKind::Object),
            "event" | "insured_event" | "insuredevent" => Ok(InsuredKind::Event),
            other => Err(EngineError::UnknownInsuredKind(other.to_string())),
        }
    }
}

/// One insured entity as seen by the traversal resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredEntityRef {
    /// Identifier unique within a snapshot (e.g. insured type code "MI")
    pub key: String,
    pub kind: InsuredKind,
    pub is_complete: bool,

    /// Route segment or identifier the UI navigates to for this entity
    pub navigation_value: String,
}

impl InsuredEntityRef {
    pub fn new(
        key: impl Into<String>,
        kind: InsuredKind,
        is_complete: bool,
        navigation_value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            is_complete,
            navigation_value: navigation_value.into(),
        }
    }
}

/// Loosely typed entity record as it arrives from a domain response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsuredEntity {
    pub key: String,
    pub kind: String,
    #[serde(default)]
    pub is_complete: bool,

    /// Falls back to `key` when absent
    #[serde(default)]
    pub navigation_value: Option<String>,
}

impl TryFrom<RawInsuredEntity> for InsuredEntityRef {
    type Error = EngineError;

    fn try_from(raw: RawInsuredEntity) -> Result<Self> {
        let kind = raw.kind.parse()?;
        let navigation_value = raw.navigation_value.unwrap_or_else(|| raw.key.clone());
        Ok(Self {
            key: raw.key,
            kind,
            is_complete: raw.is_complete,
            navigation_value,
        })
    }
}

/// Ordered, read-only list of insured entities for one data refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsuredSnapshot {
    entities: Vec<InsuredEntityRef>,
}

impl InsuredSnapshot {
    /// Keep the caller's order exactly as given
    pub fn new(entities: Vec<InsuredEntityRef>) -> Self {
        Self { entities }
    }

    /// Individuals, then objects, then events; order within each list is kept
    pub fn from_groups(
        individuals: Vec<InsuredEntityRef>,
        objects: Vec<InsuredEntityRef>,
        events: Vec<InsuredEntityRef>,
    ) -> Self {
        let mut entities = Vec::with_capacity(individuals.len() + objects.len() + events.len());
        entities.extend(individuals);
        entities.extend(objects);
        entities.extend(events);
        Self { entities }
    }

    /// Decode raw records once; any unknown kind fails the whole snapshot
    pub fn from_raw(records: Vec<RawInsuredEntity>) -> Result<Self> {
        let entities = records
            .into_iter()
            .map(InsuredEntityRef::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entities })
    }

    /// Load a JSON array of raw records
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let records: Vec<RawInsuredEntity> = serde_json::from_reader(reader)?;
        let snapshot = Self::from_raw(records)?;
        debug!("decoded insured snapshot with {} entities", snapshot.len());
        Ok(snapshot)
    }

    pub fn entities(&self) -> &[InsuredEntityRef] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Distinct kinds present, in declaration order
    pub fn kinds(&self) -> Vec<InsuredKind> {
        let mut kinds: Vec<InsuredKind> = self.entities.iter().map(|e| e.kind).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

impl AsRef<[InsuredEntityRef]> for InsuredSnapshot {
    fn as_ref(&self) -> &[InsuredEntityRef] {
        &self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_groups_keeps_declaration_order() {
        let snapshot = InsuredSnapshot::from_groups(
            vec![
                InsuredEntityRef::new("SP", InsuredKind::Individual, true, "SP"),
                InsuredEntityRef::new("MI", InsuredKind::Individual, false, "MI"),
            ],
            vec![InsuredEntityRef::new("CAR", InsuredKind::Object, false, "obj-7")],
            vec![InsuredEntityRef::new("TRIP", InsuredKind::Event, false, "evt-2")],
        );

        let keys: Vec<&str> = snapshot.entities().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["SP", "MI", "CAR", "TRIP"]);
        assert_eq!(
            snapshot.kinds(),
            vec![InsuredKind::Individual, InsuredKind::Object, InsuredKind::Event]
        );
    }

    #[test]
    fn test_from_json_decodes_kinds() {
        let json = r#"[
            {"key": "MI", "kind": "insured_type", "isComplete": false},
            {"key": "CAR", "kind": "Object", "isComplete": true, "navigationValue": "obj-7"}
        ]"#;

        let snapshot = InsuredSnapshot::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entities()[0].kind, InsuredKind::Individual);
        assert_eq!(snapshot.entities()[0].navigation_value, "MI");
        assert_eq!(snapshot.entities()[1].navigation_value, "obj-7");
    }

    #[test]
    fn test_unknown_kind_rejects_snapshot() {
        let json = r#"[{"key": "X", "kind": "vehicle"}]"#;

        let err = InsuredSnapshot::from_json_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownInsuredKind(ref k) if k == "vehicle"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = InsuredSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.kinds().is_empty());
    }
}
