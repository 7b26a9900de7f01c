use bevy::prelude::Entity;

/// Entities detected but not yet reported as entered, each with the
/// earliest game time it may be reported at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DelayedEntities {
    entries: Vec<(Entity, f64)>,
}

impl DelayedEntities {
    /// Returns true if `entity` may be reported as entered at `game_time`.
    ///
    /// An entity seen for the first time is accepted only after `delay`
    /// seconds. Accepted entities are forgotten.
    pub fn poll(&mut self, entity: Entity, game_time: f64, delay: f64) -> bool {
        match self.entries.iter().position(|&(e, _)| e == entity) {
            Some(index) => {
                if game_time >= self.entries[index].1 {
                    self.entries.swap_remove(index);
                    true
                } else {
                    false
                }
            }
            None => {
                if delay <= 0. {
                    true
                } else {
                    self.entries.push((entity, game_time + delay));
                    false
                }
            }
        }
    }

    /// Forgets entities which are not detected anymore.
    ///
    /// # Arguments
    ///
    /// * `detected` - sorted currently detected entities.
    pub fn retain_detected(&mut self, detected: &[Entity]) {
        self.entries
            .retain(|(entity, _)| detected.binary_search(entity).is_ok());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Entity, f64)] {
        self.entries.as_slice()
    }

    pub(crate) fn from_entries(entries: Vec<(Entity, f64)>) -> Self {
        Self { entries }
    }
}
