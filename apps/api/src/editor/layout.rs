use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Awards,
    Achievements,
}

pub const DEFAULT_SECTION_ORDER: [SectionId; 8] = [
    SectionId::Summary,
    SectionId::Skills,
    SectionId::Experience,
    SectionId::Education,
    SectionId::Projects,
    SectionId::Certifications,
    SectionId::Awards,
    SectionId::Achievements,
];

/// Preview section order plus per-section visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    order: Vec<SectionId>,
    visible: BTreeMap<SectionId, bool>,
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self {
            order: DEFAULT_SECTION_ORDER.to_vec(),
            visible: DEFAULT_SECTION_ORDER.iter().map(|&id| (id, true)).collect(),
        }
    }
}

impl SectionLayout {
    pub fn order(&self) -> &[SectionId] {
        &self.order
    }

    pub fn is_visible(&self, id: SectionId) -> bool {
        self.visible.get(&id).copied().unwrap_or(true)
    }

    /// Sections to draw, in order, hidden ones skipped.
    pub fn visible_sections(&self) -> Vec<SectionId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.is_visible(id))
            .collect()
    }

    /// Drag-and-drop move: `active` takes the position `over` had.
    /// Returns false when nothing changed.
    pub fn move_section(&mut self, active: SectionId, over: SectionId) -> bool {
        if active == over {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(active), self.position(over)) else {
            return false;
        };
        let id = self.order.remove(from);
        self.order.insert(to, id);
        true
    }

    pub fn toggle(&mut self, id: SectionId) -> bool {
        let shown = !self.is_visible(id);
        self.visible.insert(id, shown);
        shown
    }

    pub fn set_visible(&mut self, id: SectionId, shown: bool) {
        self.visible.insert(id, shown);
    }

    fn position(&self, id: SectionId) -> Option<usize> {
        self.order.iter().position(|&s| s == id)
    }
}
