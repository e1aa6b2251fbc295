// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::event::Event;

/// A handler in a [`LayerStack`].
pub trait Layer: Send {
    /// A name used in diagnostics.
    fn name(&self) -> &str;

    /// Offers an event to the layer. Returns `true` when the layer handled it, which
    /// stops propagation to the layers after it.
    fn on_event(&mut self, event: &Event) -> bool;
}

/// An ordered list of layers.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer. It sees events after every layer already in the stack.
    pub fn push(&mut self, layer: Box<dyn Layer>) {
        log::debug!("Pushing layer '{}'", layer.name());
        self.layers.push(layer);
    }

    /// Removes the first layer with the given name.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let index = self.layers.iter().position(|l| l.name() == name)?;
        Some(self.layers.remove(index))
    }

    /// Sends an event down the stack.
    ///
    /// The stack takes ownership of the event and drops it once dispatch is over,
    /// whether a layer handled it or not. Returns whether it was handled.
    pub fn send_event(&mut self, event: Event) -> bool {
        for layer in self.layers.iter_mut() {
            if layer.on_event(&event) {
                return true;
            }
        }
        false
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name().to_string()).collect()
    }
}

impl std::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStack")
            .field("layers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CustomEvent, EventChannel};
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: &'static str,
        handles: Option<EventChannel>,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Layer for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_event(&mut self, event: &Event) -> bool {
            self.seen.lock().unwrap().push(self.name);
            self.handles == Some(event.channel())
        }
    }

    fn custom(channel: u32) -> Event {
        Event::Custom(CustomEvent {
            channel,
            kind: 0,
            payload: Vec::new(),
        })
    }

    #[test]
    fn dispatch_stops_at_first_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut stack = LayerStack::new();
        for (name, channel) in [("a", None), ("b", Some(1)), ("c", Some(1))] {
            stack.push(Box::new(Recorder {
                name,
                handles: channel.map(EventChannel::Custom),
                seen: seen.clone(),
            }));
        }

        assert!(stack.send_event(custom(1)));
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);

        seen.lock().unwrap().clear();
        assert!(!stack.send_event(custom(2)));
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_by_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut stack = LayerStack::new();
        stack.push(Box::new(Recorder {
            name: "only",
            handles: None,
            seen,
        }));
        assert!(stack.remove("missing").is_none());
        assert!(stack.remove("only").is_some());
        assert!(stack.is_empty());
    }
}
