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

use std::fmt;

/// An unbounded multi-producer queue the platform drains once per pump tick.
///
/// Producers on any thread hold a [`flume::Sender`] obtained from [`EventBus::sender`];
/// the bus keeps the only receiver, so sending can not fail while it is alive.
pub struct EventBus<T> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// An empty bus.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Queues `event`.
    pub fn publish(&self, event: T) {
        if self.sender.send(event).is_err() {
            log::error!("Event bus receiver is gone, dropping an event");
        }
    }

    /// A sender that can outlive borrows of the bus and cross threads.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Everything queued so far, oldest first. Never blocks.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, Key, KeyAction, WindowEvent, WindowEventKind, WindowId};
    use std::thread;

    fn close(window: WindowId) -> Event {
        Event::Window(WindowEvent {
            window,
            kind: WindowEventKind::CloseRequested,
        })
    }

    #[test]
    fn drain_keeps_injection_order_across_windows() {
        let bus = EventBus::<(WindowId, Event)>::new();
        let (a, b) = (WindowId(1), WindowId(2));
        bus.publish((a, Event::key(a, Key::Space, KeyAction::Pressed)));
        bus.publish((b, close(b)));
        bus.publish((a, Event::key(a, Key::Space, KeyAction::Released)));
        assert_eq!(bus.pending(), 3);

        let targets: Vec<WindowId> = bus.drain().into_iter().map(|(id, _)| id).collect();
        assert_eq!(targets, vec![a, b, a]);
        assert_eq!(bus.pending(), 0);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn senders_on_other_threads_reach_the_next_drain() {
        let bus = EventBus::<(WindowId, Event)>::new();
        let injectors: Vec<_> = (1..=4)
            .map(|n| {
                let sender = bus.sender();
                thread::spawn(move || {
                    let window = WindowId(n);
                    for _ in 0..25 {
                        sender.send((window, close(window))).unwrap();
                    }
                })
            })
            .collect();
        for injector in injectors {
            injector.join().unwrap();
        }

        let drained = bus.drain();
        assert_eq!(drained.len(), 100);
        for n in 1..=4 {
            let window = WindowId(n);
            assert_eq!(drained.iter().filter(|(id, _)| *id == window).count(), 25);
        }
        assert!(drained.iter().all(|(id, event)| event.window() == Some(*id)));
    }
}
