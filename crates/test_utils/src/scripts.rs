use std::sync::Mutex;

use ahash::AHashSet;
use bevy::prelude::{Entity, Resource};
use se_script::{ScriptArg, ScriptCall, ScriptCalls};

/// [`ScriptCalls`] implementation which records delivered calls.
///
/// Filters pass unless one of the arguments is a rejected entity.
#[derive(Resource, Default)]
pub struct RecordingScripts {
    rejected: AHashSet<Entity>,
    filters: Mutex<Vec<ScriptCall>>,
    delivered: Mutex<Vec<ScriptCall>>,
    queued: Vec<ScriptCall>,
}

impl RecordingScripts {
    pub fn reject(&mut self, entity: Entity) {
        self.rejected.insert(entity);
    }

    pub fn accept(&mut self, entity: Entity) {
        self.rejected.remove(&entity);
    }

    /// Number of filter evaluations so far.
    pub fn filter_count(&self) -> usize {
        self.filters.lock().unwrap().len()
    }

    /// Moves queued calls to the delivered calls, in order.
    pub fn flush(&mut self) {
        let queued = std::mem::take(&mut self.queued);
        self.delivered.lock().unwrap().extend(queued);
    }

    pub fn queued(&self) -> &[ScriptCall] {
        self.queued.as_slice()
    }

    /// Removes and returns delivered calls.
    pub fn take_delivered(&self) -> Vec<ScriptCall> {
        std::mem::take(&mut *self.delivered.lock().unwrap())
    }

    /// Flushes queued calls and returns entity arguments at `position` of
    /// all delivered calls of `function`, in delivery order. Delivered calls
    /// of other functions are kept.
    pub fn take_entities(&mut self, function: &str, position: usize) -> Vec<Entity> {
        self.flush();
        let mut delivered = self.delivered.lock().unwrap();
        let mut entities = Vec::new();
        delivered.retain(|call| {
            if call.function() != function {
                return true;
            }
            if let Some(ScriptArg::Entity(entity)) = call.args().get(position) {
                entities.push(*entity);
            }
            false
        });
        entities
    }
}

impl ScriptCalls for RecordingScripts {
    fn filter(&self, call: ScriptCall) -> bool {
        let passed = !call.args().iter().any(|arg| match arg {
            ScriptArg::Entity(entity) => self.rejected.contains(entity),
            _ => false,
        });
        self.filters.lock().unwrap().push(call);
        passed
    }

    fn call_now(&mut self, call: ScriptCall) {
        self.flush();
        self.delivered.lock().unwrap().push(call);
    }

    fn queue(&mut self, call: ScriptCall) {
        self.queued.push(call);
    }
}
