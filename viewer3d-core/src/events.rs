//! Synchronous scene notifications.

use std::fmt;

use crate::scene::{MeshEntity, MeshId};

/// A change announced to listeners, delivered before the triggering call returns.
#[derive(Debug, Clone, Copy)]
pub enum SceneEvent<'a> {
    MeshAdded(&'a MeshEntity),
    MeshRemoved(MeshId),
    MeshSelected {
        mesh: &'a MeshEntity,
        selected: bool,
    },
}

pub type Listener = Box<dyn FnMut(&SceneEvent<'_>)>;

/// Listener list; events fan out in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent<'_>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: &SceneEvent<'_>) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
