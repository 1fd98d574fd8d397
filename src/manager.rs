//! Manager - central store for entities, components, processors and actions
//!
//! One tick of the simulation is two phases: `update(delta)` runs every
//! registered processor against the committed state, processors publish
//! actions describing the changes they want; `mutate()` then drains the
//! action queue and lets the registered mutators commit those changes.
//! Processors never observe state half-mutated by another processor.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use anyhow::Result;
use serde_json::Value;

use crate::entity::{Entity, EntityAllocator};
use crate::error::ManagerError;

/// A queued request to change state: a JSON object with a mandatory
/// string `type` field plus arbitrary payload fields.
pub type Action = Value;

/// Read-phase routine, run once per `update` with the frame delta.
pub type Processor = Rc<dyn Fn(&mut Manager, f64) -> Result<()>>;

/// Write-phase routine, run by `mutate` for each action of its type.
pub type Mutator = Rc<dyn Fn(&mut Manager, &Action) -> Result<()>>;

/// Owns all entity and component data plus the processor and mutator
/// registries. Single-threaded by construction: callbacks are `Rc`-stored
/// and everything runs to completion on one logical thread.
pub struct Manager {
    allocator: EntityAllocator,
    entity_store: BTreeMap<Entity, BTreeMap<String, Value>>,
    component_index: HashMap<String, BTreeSet<Entity>>,
    processor_store: Vec<Processor>,
    mutator_store: HashMap<String, Vec<Mutator>>,
    waiting_actions: VecDeque<Action>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entity_store: BTreeMap::new(),
            component_index: HashMap::new(),
            processor_store: Vec::new(),
            mutator_store: HashMap::new(),
            waiting_actions: VecDeque::new(),
        }
    }

    /// Create a new entity with an empty component bag.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entity_store.insert(entity, BTreeMap::new());
        entity
    }

    /// Create a new entity seeded with a batch of named components.
    ///
    /// Each component goes through the same path as [`set_component`],
    /// so type-filtered queries observe the entity immediately.
    ///
    /// [`set_component`]: Manager::set_component
    pub fn spawn<I, K>(&mut self, components: I) -> Entity
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entity = self.create_entity();
        for (component_type, component) in components {
            self.set_component(entity, component_type, component)
                .expect("freshly created entity exists");
        }
        entity
    }

    /// Kill an entity, removing all its components from the store and
    /// from every type's index set.
    ///
    /// The identifier is permanently invalid afterwards and is never
    /// reissued by [`create_entity`](Manager::create_entity).
    pub fn kill_entity(&mut self, entity: Entity) -> Result<(), ManagerError> {
        let bag = self
            .entity_store
            .remove(&entity)
            .ok_or(ManagerError::EntityNotFound(entity))?;
        for component_type in bag.keys() {
            if let Some(index) = self.component_index.get_mut(component_type) {
                index.remove(&entity);
            }
        }
        Ok(())
    }

    /// Live entities, in insertion (= ascending identifier) order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entity_store.keys().copied()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entity_store.len()
    }

    /// Attach a component value to an entity, overwriting any previous
    /// value stored under the same type name.
    pub fn set_component(
        &mut self,
        entity: Entity,
        component_type: impl Into<String>,
        component: Value,
    ) -> Result<(), ManagerError> {
        let bag = self
            .entity_store
            .get_mut(&entity)
            .ok_or(ManagerError::EntityNotFound(entity))?;
        let component_type = component_type.into();
        if !bag.contains_key(&component_type) {
            self.component_index
                .entry(component_type.clone())
                .or_default()
                .insert(entity);
        }
        bag.insert(component_type, component);
        Ok(())
    }

    /// Attach a bare marker component (value `true`).
    pub fn set_marker(
        &mut self,
        entity: Entity,
        component_type: impl Into<String>,
    ) -> Result<(), ManagerError> {
        self.set_component(entity, component_type, Value::Bool(true))
    }

    /// Component value for an entity, or `None` if the entity lacks the
    /// component or does not exist. Total on purpose: optional-component
    /// queries are routine in processors and must not fail.
    pub fn get_component(&self, entity: Entity, component_type: &str) -> Option<&Value> {
        self.entity_store.get(&entity)?.get(component_type)
    }

    pub fn has_component(&self, entity: Entity, component_type: &str) -> bool {
        self.get_component(entity, component_type).is_some()
    }

    /// Entities currently holding the given component type. Empty for a
    /// type name that has never been used.
    ///
    /// The iterator borrows the Manager, so callers that want to mutate
    /// while walking the result must `collect()` first.
    pub fn entities_by_type(&self, component_type: &str) -> impl Iterator<Item = Entity> + '_ {
        self.component_index
            .get(component_type)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Entities holding all of the given component types, computed by
    /// narrowing the first type's index set with each subsequent set.
    ///
    /// Empty if the list is empty or any listed type has never been used.
    /// Returned eagerly so the result stays valid across mutation.
    pub fn entities_by_types(&self, component_types: &[&str]) -> Vec<Entity> {
        let Some((first, rest)) = component_types.split_first() else {
            return Vec::new();
        };
        let Some(mut matched) = self.component_index.get(*first).cloned() else {
            return Vec::new();
        };
        for component_type in rest {
            let Some(index) = self.component_index.get(*component_type) else {
                return Vec::new();
            };
            matched.retain(|entity| index.contains(entity));
            if matched.is_empty() {
                break;
            }
        }
        matched.into_iter().collect()
    }

    /// Append a processor to the registry. Duplicates are allowed; the
    /// same routine then runs once per registration.
    pub fn register_processor<F>(&mut self, processor: F)
    where
        F: Fn(&mut Manager, f64) -> Result<()> + 'static,
    {
        self.processor_store.push(Rc::new(processor));
    }

    /// Registered processors, in registration order.
    pub fn processors(&self) -> impl Iterator<Item = &Processor> {
        self.processor_store.iter()
    }

    /// Run every registered processor once, in registration order, each
    /// receiving `(manager, delta)`.
    ///
    /// Processors are expected to read state and publish actions; no
    /// mutator runs until [`mutate`](Manager::mutate) is called, so the
    /// whole pass observes one committed snapshot. A processor error
    /// aborts the remainder of the pass.
    pub fn update(&mut self, delta: f64) -> Result<()> {
        let processors = self.processor_store.clone();
        for processor in &processors {
            processor(self, delta)?;
        }
        Ok(())
    }

    /// Register a mutator for an action type. Multiple mutators may
    /// listen to the same type; all run, in registration order, for each
    /// matching action.
    pub fn register_mutator_on<F>(&mut self, action_type: impl Into<String>, mutator: F)
    where
        F: Fn(&mut Manager, &Action) -> Result<()> + 'static,
    {
        self.mutator_store
            .entry(action_type.into())
            .or_default()
            .push(Rc::new(mutator));
    }

    /// Queue an action for the next [`mutate`](Manager::mutate) call.
    ///
    /// Fails with [`ManagerError::InvalidAction`] right here, at the
    /// source, if the action does not carry a string `type` field.
    pub fn publish(&mut self, action: Action) -> Result<(), ManagerError> {
        if action.get("type").and_then(Value::as_str).is_none() {
            return Err(ManagerError::InvalidAction);
        }
        self.waiting_actions.push_back(action);
        Ok(())
    }

    /// Number of actions waiting to be drained.
    pub fn pending_action_count(&self) -> usize {
        self.waiting_actions.len()
    }

    /// Drain the action queue in FIFO order, running every mutator
    /// registered for each action's type.
    ///
    /// The queue is drained to exhaustion, not snapshotted: actions
    /// published by a mutator during this call are processed before it
    /// returns, so action cascades complete within one commit phase.
    ///
    /// An action whose type has no registered mutator fails with
    /// [`ManagerError::UnhandledActionType`]; that is a wiring bug, not
    /// a condition to skip past. On any error the failed action has been
    /// consumed and the remaining queue is left for the next call.
    pub fn mutate(&mut self) -> Result<()> {
        while let Some(action) = self.waiting_actions.pop_front() {
            let action_type = action
                .get("type")
                .and_then(Value::as_str)
                .ok_or(ManagerError::InvalidAction)?
                .to_string();
            let mutators = self
                .mutator_store
                .get(&action_type)
                .cloned()
                .ok_or(ManagerError::UnhandledActionType(action_type))?;
            for mutator in &mutators {
                mutator(self, &action)?;
            }
        }
        Ok(())
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
