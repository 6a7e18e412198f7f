//! Replays recorded interactions from a cassette.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method combination, naming what was requested and which
    /// port/method pairs remain.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get_mut(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };

        queue.pop_front().ok_or_else(|| {
            format!(
                "Cassette exhausted: all interactions for port={port:?} method={method:?} \
                 have been consumed."
            )
        })
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
