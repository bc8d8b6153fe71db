//! Typed event callbacks.
//!
//! Handlers are registered against an [`EventKind`]. Each dispatch runs every
//! matching handler on its own spawned task so a slow handler never stalls
//! the session loop.

use super::client::Client;
use super::event::{Event, EventKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub trait EventHandler: Send + Sync + 'static {
    fn handle(&self, client: &Client, event: &Event);
}

impl<F> EventHandler for F
where
    F: Fn(&Client, &Event) + Send + Sync + 'static,
{
    fn handle(&self, client: &Client, event: &Event) {
        self(client, event)
    }
}

#[derive(Clone, Default)]
pub struct Handlers {
    registry: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<H: EventHandler>(&mut self, kind: EventKind, handler: H) {
        self.registry.entry(kind).or_default().push(Arc::new(handler));
    }

    /// Run every handler registered for the event's kind in the background.
    /// The returned handles may be dropped; the tasks keep running.
    pub fn dispatch(&self, client: &Client, event: Event) -> Vec<JoinHandle<()>> {
        let Some(handlers) = self.registry.get(&event.kind()) else {
            return Vec::new();
        };
        let event = Arc::new(event);
        handlers
            .iter()
            .map(|handler| {
                let handler = Arc::clone(handler);
                let client = client.clone();
                let event = Arc::clone(&event);
                tokio::spawn(async move { handler.handle(&client, &event) })
            })
            .collect()
    }
}
