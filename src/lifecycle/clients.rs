//! Client sessions controlled by a generation.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::InsertionOrder;

#[derive(Debug, Default)]
struct Sessions {
    controllers: HashMap<String, Option<String>>,
    order: InsertionOrder,
}

/// Open client sessions and the generation that controls each one.
///
/// At most `max_clients` sessions are remembered; registering one more
/// forgets the session seen first.
#[derive(Debug)]
pub struct ClientRegistry {
    sessions: RwLock<Sessions>,
    max_clients: usize,
}

impl ClientRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_clients,
        }
    }

    /// Records a client the first time it is seen.
    ///
    /// `controller` is the active generation, or None while not yet active.
    pub async fn register(&self, id: &str, controller: Option<&str>) {
        let mut sessions = self.sessions.write().await;
        if sessions.controllers.contains_key(id) {
            return;
        }

        debug!(client = id, ?controller, "Registered client");
        sessions
            .controllers
            .insert(id.to_string(), controller.map(String::from));
        sessions.order.push_newest(id);

        while sessions.controllers.len() > self.max_clients {
            let Some(oldest) = sessions.order.pop_oldest() else {
                break;
            };
            sessions.controllers.remove(&oldest);
            debug!(client = %oldest, "Forgot oldest client");
        }
    }

    // == Claim ==
    /// Puts every known client under `generation` immediately.
    ///
    /// Returns the number of clients whose controller changed.
    pub async fn claim(&self, generation: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut claimed = 0;
        for controller in sessions.controllers.values_mut() {
            if controller.as_deref() != Some(generation) {
                *controller = Some(generation.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    pub async fn controller(&self, id: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .controllers
            .get(id)
            .cloned()
            .flatten()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.controllers.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
