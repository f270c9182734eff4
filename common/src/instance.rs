use std::sync::Arc;

use crate::game::{GameRng, GameState, HandoffPolicy, LossReason};
use crate::log;
use crate::registry::{Geometry, InstanceDescriptor, InstanceRegistry};
use crate::store::{SharedStore, StoreError};
use crate::InstanceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownMode {
    /// Remove only this instance's registry entry.
    Deregister,
    /// Wipe the whole session so the next instance starts a fresh game.
    ClearStore,
}

/// Everything one instance needs to take part in the session. Each instance
/// owns its own context; the store handle is the only thing shared.
pub struct InstanceContext {
    store: Arc<dyn SharedStore>,
    instance_id: InstanceId,
    geometry: Geometry,
    policy: HandoffPolicy,
    rng: GameRng,
    terminal: Option<LossReason>,
}

impl InstanceContext {
    pub fn new(
        store: Arc<dyn SharedStore>,
        instance_id: InstanceId,
        geometry: Geometry,
        policy: HandoffPolicy,
    ) -> Self {
        Self {
            store,
            instance_id,
            geometry,
            policy,
            rng: GameRng::from_random(),
            terminal: None,
        }
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn policy(&self) -> HandoffPolicy {
        self.policy
    }

    pub fn store(&self) -> &dyn SharedStore {
        self.store.as_ref()
    }

    /// An owned handle, for borrowing the store while the context itself is
    /// borrowed mutably.
    pub fn store_handle(&self) -> Arc<dyn SharedStore> {
        Arc::clone(&self.store)
    }

    pub fn registry(&self) -> InstanceRegistry<'_> {
        InstanceRegistry::new(self.store.as_ref())
    }

    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub fn descriptor(&self) -> InstanceDescriptor {
        InstanceDescriptor::new(self.instance_id.clone(), self.geometry)
    }

    pub fn terminal(&self) -> Option<LossReason> {
        self.terminal
    }

    pub fn mark_terminal(&mut self, reason: LossReason) {
        if self.terminal.is_none() {
            log!("[{}] game over: {}", self.instance_id, reason);
        }
        self.terminal = Some(reason);
    }

    /// Registers this instance and makes sure a game exists.
    pub fn announce(&self) -> Result<GameState, StoreError> {
        if !self.registry().register(&self.descriptor())? {
            log!(
                "[{}] an instance with the same geometry is already registered",
                self.instance_id
            );
        }
        self.load_or_bootstrap()
    }

    pub fn heartbeat(&self) -> Result<bool, StoreError> {
        self.registry().heartbeat(&self.descriptor())
    }

    /// The current game, or a fresh one owned by this instance when the store
    /// holds nothing usable. A store that cannot be read is an error, never a
    /// reason to start over.
    pub fn load_or_bootstrap(&self) -> Result<GameState, StoreError> {
        if let Some(state) = GameState::load(self.store())? {
            return Ok(state);
        }
        let state = GameState::new(self.instance_id.clone());
        state.save(self.store())?;
        log!("[{}] started a new game", self.instance_id);
        Ok(state)
    }

    /// Clears the local terminal flag and, unless another instance already
    /// started a new game, the session; the next frame bootstraps a new game.
    pub fn restart(&mut self) -> Result<(), StoreError> {
        let finished = GameState::load(self.store())?
            .is_none_or(|state| state.loss_reason().is_some());
        if finished {
            self.store.clear()?;
        }
        self.terminal = None;
        self.registry().register(&self.descriptor())?;
        Ok(())
    }

    pub fn teardown(&self, mode: TeardownMode) -> Result<(), StoreError> {
        match mode {
            TeardownMode::Deregister => self.registry().deregister(&self.instance_id),
            TeardownMode::ClearStore => self.store.clear(),
        }
    }
}
