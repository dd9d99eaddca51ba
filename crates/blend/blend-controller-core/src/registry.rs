//! Clip registry: the fixed catalog of known track names.
//!
//! Every known name belongs to exactly one [`TrackGroup`]. Names absent from the
//! registry are ignored by the controller (no handle, no panel row).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::BlendError;
use crate::ids::TrackId;
use crate::Result;

/// Group a track belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackGroup {
    /// Mutually exclusive clips switched by crossfades.
    Base,
    /// Independently weighted layers on top of the base pose.
    Additive,
}

/// One classified track and its starting weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub group: TrackGroup,
    pub weight: f32,
}

/// A track default as written in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackDefault {
    pub name: String,
    #[serde(default)]
    pub weight: f32,
}

impl TrackDefault {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Serializable registry definition: two ordered lists of track defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub base: Vec<TrackDefault>,
    #[serde(default)]
    pub additive: Vec<TrackDefault>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base: vec![
                TrackDefault::new("idle", 1.0),
                TrackDefault::new("walk", 0.0),
                TrackDefault::new("run", 0.0),
            ],
            additive: vec![
                TrackDefault::new("sneak_pose", 0.0),
                TrackDefault::new("sad_pose", 0.0),
                TrackDefault::new("agree", 0.0),
                TrackDefault::new("headShake", 0.0),
            ],
        }
    }
}

impl RegistryConfig {
    fn entries(&self) -> Vec<RegistryEntry> {
        let base = self.base.iter().map(|t| RegistryEntry {
            name: t.name.clone(),
            group: TrackGroup::Base,
            weight: t.weight,
        });
        let additive = self.additive.iter().map(|t| RegistryEntry {
            name: t.name.clone(),
            group: TrackGroup::Additive,
            weight: t.weight,
        });
        base.chain(additive).collect()
    }
}

/// Immutable catalog of classified track names.
#[derive(Clone, Debug)]
pub struct ClipRegistry {
    entries: Vec<RegistryEntry>,
    by_name: HashMap<String, TrackId>,
}

impl ClipRegistry {
    /// Build a registry, validating names and default weights.
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.name.is_empty() {
                return Err(BlendError::InvalidConfig {
                    reason: "track names must not be empty".into(),
                });
            }
            if !entry.weight.is_finite() || !(0.0..=1.0).contains(&entry.weight) {
                return Err(BlendError::InvalidWeight {
                    name: entry.name.clone(),
                    weight: entry.weight,
                });
            }
        }
        let by_name = index_by_name(&entries)?;
        Ok(Self { entries, by_name })
    }

    pub fn from_config(cfg: &RegistryConfig) -> Result<Self> {
        Self::new(cfg.entries())
    }

    /// Group of `name`, or `None` when the name is unknown.
    #[inline]
    pub fn classify(&self, name: &str) -> Option<TrackGroup> {
        self.get_by_name(name).map(|(_, e)| e.group)
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<TrackId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn get(&self, id: TrackId) -> Option<&RegistryEntry> {
        self.entries.get(id.index())
    }

    pub fn get_by_name(&self, name: &str) -> Option<(TrackId, &RegistryEntry)> {
        let id = self.id_of(name)?;
        self.get(id).map(|e| (id, e))
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &RegistryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TrackId(i as u32), e))
    }

    /// Names of one group in definition order.
    pub fn names(&self, group: TrackGroup) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.group == group)
            .map(|e| e.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Initial base track: the first Base entry starting at full weight.
    pub fn default_base(&self) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.group == TrackGroup::Base && e.weight >= 1.0)
    }
}

impl Default for ClipRegistry {
    fn default() -> Self {
        let entries = RegistryConfig::default().entries();
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), TrackId(i as u32)))
            .collect();
        Self { entries, by_name }
    }
}

fn index_by_name(entries: &[RegistryEntry]) -> Result<HashMap<String, TrackId>> {
    let mut by_name = HashMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        if by_name
            .insert(entry.name.clone(), TrackId(i as u32))
            .is_some()
        {
            return Err(BlendError::DuplicateTrack {
                name: entry.name.clone(),
            });
        }
    }
    Ok(by_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_classifies_known_names() {
        let reg = ClipRegistry::default();
        assert_eq!(reg.classify("idle"), Some(TrackGroup::Base));
        assert_eq!(reg.classify("run"), Some(TrackGroup::Base));
        assert_eq!(reg.classify("headShake"), Some(TrackGroup::Additive));
        assert_eq!(reg.classify("tpose"), None);
        assert_eq!(reg.len(), 7);
    }

    #[test]
    fn default_base_is_first_full_weight_entry() {
        let reg = ClipRegistry::default();
        assert_eq!(reg.default_base().map(|e| e.name.as_str()), Some("idle"));

        let cfg = RegistryConfig {
            base: vec![TrackDefault::new("walk", 0.0), TrackDefault::new("run", 0.0)],
            additive: vec![],
        };
        let reg = ClipRegistry::from_config(&cfg).unwrap();
        assert!(reg.default_base().is_none());
    }

    #[test]
    fn duplicate_names_across_groups_are_rejected() {
        let cfg = RegistryConfig {
            base: vec![TrackDefault::new("agree", 1.0)],
            additive: vec![TrackDefault::new("agree", 0.0)],
        };
        let err = ClipRegistry::from_config(&cfg).unwrap_err();
        assert_eq!(
            err,
            BlendError::DuplicateTrack {
                name: "agree".into()
            }
        );
    }

    #[test]
    fn out_of_range_weights_are_rejected() {
        let cfg = RegistryConfig {
            base: vec![TrackDefault::new("idle", 1.5)],
            additive: vec![],
        };
        assert!(matches!(
            ClipRegistry::from_config(&cfg),
            Err(BlendError::InvalidWeight { .. })
        ));

        let cfg = RegistryConfig {
            base: vec![TrackDefault::new("idle", f32::NAN)],
            additive: vec![],
        };
        assert!(matches!(
            ClipRegistry::from_config(&cfg),
            Err(BlendError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn names_follow_definition_order() {
        let reg = ClipRegistry::default();
        let base: Vec<&str> = reg.names(TrackGroup::Base).collect();
        assert_eq!(base, vec!["idle", "walk", "run"]);
        let additive: Vec<&str> = reg.names(TrackGroup::Additive).collect();
        assert_eq!(additive, vec!["sneak_pose", "sad_pose", "agree", "headShake"]);
    }

    #[test]
    fn config_parses_with_missing_weights() {
        let cfg: RegistryConfig =
            serde_json::from_str(r#"{ "base": [{ "name": "idle", "weight": 1 }, { "name": "walk" }] }"#)
                .unwrap();
        assert!(cfg.additive.is_empty());
        assert_eq!(cfg.base[1].weight, 0.0);
    }
}
