use ahash::{AHashMap, AHashSet};
use bevy::prelude::*;

/// Relation between filter targets and sensors holding a cached filter
/// verdict about them.
///
/// The index is used to invalidate verdicts of an entity which is gone.
#[derive(Resource, Default)]
pub struct SensorFilterIndex {
    targets: AHashMap<Entity, AHashSet<Entity>>,
}

impl SensorFilterIndex {
    pub fn register(&mut self, target: Entity, sensor: Entity) {
        self.targets.entry(target).or_default().insert(sensor);
    }

    /// # Panics
    ///
    /// Panics if the pair is not registered.
    pub fn unregister(&mut self, target: Entity, sensor: Entity) {
        let sensors = self
            .targets
            .get_mut(&target)
            .expect("Unregistered filter target.");
        assert!(
            sensors.remove(&sensor),
            "Sensor {sensor:?} has no filter registration for {target:?}."
        );
        if sensors.is_empty() {
            self.targets.remove(&target);
        }
    }

    /// Returns sensors with a cached verdict about `target`.
    pub fn sensors(&self, target: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.targets
            .get(&target)
            .into_iter()
            .flat_map(|sensors| sensors.iter().copied())
    }

    /// Removes all registrations of a target and returns the sensors it was
    /// registered with, sorted.
    pub fn remove_target(&mut self, target: Entity) -> Vec<Entity> {
        let mut sensors: Vec<Entity> = self
            .targets
            .remove(&target)
            .map(|sensors| sensors.into_iter().collect())
            .unwrap_or_default();
        sensors.sort_unstable();
        sensors
    }

    /// Removes all registrations of a sensor.
    pub fn remove_sensor(&mut self, sensor: Entity) {
        self.targets.retain(|_, sensors| {
            sensors.remove(&sensor);
            !sensors.is_empty()
        });
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

struct Verdict {
    passed: bool,
    used: bool,
}

/// Filter verdicts of a single sensor, swept of targets which were not
/// asked about during the last tick.
#[derive(Default)]
pub(crate) struct FilterCache {
    verdicts: AHashMap<Entity, Verdict>,
}

impl FilterCache {
    /// Returns a cached verdict and marks it used.
    pub(crate) fn get(&mut self, target: Entity) -> Option<bool> {
        self.verdicts.get_mut(&target).map(|verdict| {
            verdict.used = true;
            verdict.passed
        })
    }

    pub(crate) fn insert(&mut self, target: Entity, passed: bool) {
        self.verdicts.insert(target, Verdict { passed, used: true });
    }

    pub(crate) fn remove(&mut self, target: Entity) -> bool {
        self.verdicts.remove(&target).is_some()
    }

    /// Removes verdicts not used since the previous sweep, returns their
    /// targets.
    pub(crate) fn sweep(&mut self) -> Vec<Entity> {
        let mut unused = Vec::new();
        self.verdicts.retain(|&target, verdict| {
            let keep = verdict.used;
            verdict.used = false;
            if !keep {
                unused.push(target);
            }
            keep
        });
        unused
    }

    pub(crate) fn drain(&mut self) -> Vec<Entity> {
        self.verdicts.drain().map(|(target, _)| target).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.verdicts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        let mut index = SensorFilterIndex::default();
        let target = Entity::from_raw(1);
        let sensor_a = Entity::from_raw(10);
        let sensor_b = Entity::from_raw(11);

        index.register(target, sensor_b);
        index.register(target, sensor_a);
        index.register(Entity::from_raw(2), sensor_a);
        assert_eq!(index.sensors(target).count(), 2);

        index.unregister(target, sensor_b);
        assert_eq!(index.remove_target(target), vec![sensor_a]);
        assert!(index.remove_target(target).is_empty());

        index.remove_sensor(sensor_a);
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_unregister_absent() {
        let mut index = SensorFilterIndex::default();
        index.register(Entity::from_raw(1), Entity::from_raw(2));
        index.unregister(Entity::from_raw(1), Entity::from_raw(3));
    }

    #[test]
    fn test_cache_sweep() {
        let mut cache = FilterCache::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        cache.insert(a, true);
        cache.insert(b, false);
        assert!(cache.sweep().is_empty());

        assert_eq!(cache.get(b), Some(false));
        assert_eq!(cache.sweep(), vec![a]);
        assert_eq!(cache.get(a), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.remove(b));
        assert!(!cache.remove(b));
    }
}
