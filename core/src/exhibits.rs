//! Exhibit visibility: at most one exhibit model is shown at a time.

use crate::error::{CoreError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct ExhibitSlot {
    pub name: String,
    pub loaded: bool,
    pub visible: bool,
}

/// Exhibit slots in button order. Exhibits start hidden and unloaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExhibitGallery {
    slots: Vec<ExhibitSlot>,
}

impl ExhibitGallery {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: names
                .into_iter()
                .map(|name| ExhibitSlot {
                    name: name.into(),
                    loaded: false,
                    visible: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ExhibitSlot] {
        &self.slots
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.visible)
    }

    /// Index of the exhibit on display, if any.
    pub fn shown(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.visible)
    }

    /// Record that the model for `index` finished loading. Loaded models stay hidden.
    pub fn mark_loaded(&mut self, index: usize) -> Result<()> {
        self.slot_mut(index)?.loaded = true;
        Ok(())
    }

    /// Show exhibit `index` and hide every other one.
    ///
    /// Returns `Ok(false)` without touching anything while that exhibit is still loading.
    pub fn show_only(&mut self, index: usize) -> Result<bool> {
        if !self.slot_mut(index)?.loaded {
            log::debug!("Exhibit {index} not loaded yet; ignoring");
            return Ok(false);
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.visible = i == index;
        }
        Ok(true)
    }

    pub fn hide_all(&mut self) {
        for slot in &mut self.slots {
            slot.visible = false;
        }
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut ExhibitSlot> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(CoreError::UnknownExhibit { index, len })
    }
}
