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

use super::object::Object;
use crate::error::SceneError;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use crate::utils::AsAny;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// A world-wide capability, such as a physics or audio system.
pub trait WorldExtension: AsAny + Send {
    /// Unique name of the extension within its world.
    fn name(&self) -> &str;

    /// Called when the extension is added to `world`.
    fn on_attach(&mut self, _world: &World) {}

    /// Called when the extension is removed from `world`, or when the world is destroyed.
    fn on_detach(&mut self, _world: &World) {}

    /// Called once per update tick.
    fn on_update(&mut self, _world: &World) {}
}

/// A named collection of root objects.
///
/// An object may appear only once in a world, whether directly or as a descendant of
/// another contained object.
pub struct World {
    name: String,
    instance: InstanceHandle,
    objects: RwLock<HashMap<String, Arc<Object>>>,
    extensions: Mutex<Vec<Box<dyn WorldExtension>>>,
}

impl World {
    /// Creates a world and registers it with the instance.
    pub fn new(instance: &InstanceContext, name: impl Into<String>) -> Arc<Self> {
        let world = Arc::new(Self {
            name: name.into(),
            instance: instance.handle(),
            objects: RwLock::new(HashMap::new()),
            extensions: Mutex::new(Vec::new()),
        });
        instance.add_element(world.clone());
        world
    }

    /// The world name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning instance.
    pub fn instance(&self) -> &InstanceHandle {
        &self.instance
    }

    /// Adds `object` as a root of this world.
    ///
    /// Rejected, and logged, when the object or a relative of it is already
    /// contained, or when another root uses the same name.
    pub fn add_object(&self, object: &Arc<Object>) -> Result<(), SceneError> {
        let result = {
            let mut objects = self.objects.write().unwrap();
            Self::check_insertable(&objects, object).map(|()| {
                objects.insert(object.name().to_string(), Arc::clone(object));
            })
        };
        match result {
            Ok(()) => {
                self.instance.log_debug(format!(
                    "Object '{}' added to world '{}'.",
                    object.name(),
                    self.name
                ));
                Ok(())
            }
            Err(e) => {
                self.instance
                    .log(format!("World '{}': {e}", self.name), Severity::Error);
                Err(e)
            }
        }
    }

    fn check_insertable(
        objects: &HashMap<String, Arc<Object>>,
        object: &Arc<Object>,
    ) -> Result<(), SceneError> {
        if let Some(existing) = objects.get(object.name()) {
            return Err(if Arc::ptr_eq(existing, object) {
                SceneError::AlreadyContained(object.name().to_string())
            } else {
                SceneError::DuplicateName(object.name().to_string())
            });
        }
        let related = objects.values().any(|root| {
            root.has_descendant(object) || object.has_descendant(root) || object.has_ancestor(root)
        });
        if related {
            return Err(SceneError::AlreadyContained(object.name().to_string()));
        }
        Ok(())
    }

    /// Removes the root called `name`.
    pub fn remove_object(&self, name: &str) -> Result<Arc<Object>, SceneError> {
        self.objects
            .write()
            .unwrap()
            .remove(name)
            .ok_or_else(|| SceneError::NotFound(name.to_string()))
    }

    /// Whether a root called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.objects.read().unwrap().contains_key(name)
    }

    /// The root called `name`.
    pub fn object(&self, name: &str) -> Option<Arc<Object>> {
        self.objects.read().unwrap().get(name).cloned()
    }

    /// Every root, sorted by name.
    pub fn objects(&self) -> Vec<Arc<Object>> {
        let mut objects: Vec<_> = self.objects.read().unwrap().values().cloned().collect();
        objects.sort_by(|a, b| a.name().cmp(b.name()));
        objects
    }

    /// Number of roots.
    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// Every contained object, roots and descendants, depth first.
    pub fn all_objects(&self) -> Vec<Arc<Object>> {
        self.objects()
            .into_iter()
            .flat_map(|root| root.subtree())
            .collect()
    }

    /// Adds an extension and calls its `on_attach`. Names must be unique.
    pub fn add_extension<E: WorldExtension>(&self, extension: E) -> Result<(), SceneError> {
        let mut extensions = self.extensions.lock().unwrap();
        if extensions.iter().any(|e| e.name() == extension.name()) {
            return Err(SceneError::DuplicateName(extension.name().to_string()));
        }
        let mut extension: Box<dyn WorldExtension> = Box::new(extension);
        extension.on_attach(self);
        extensions.push(extension);
        Ok(())
    }

    /// Removes the extension called `name`, after calling its `on_detach`.
    pub fn remove_extension(&self, name: &str) -> Option<Box<dyn WorldExtension>> {
        let mut extensions = self.extensions.lock().unwrap();
        let index = extensions.iter().position(|e| e.name() == name)?;
        extensions[index].on_detach(self);
        Some(extensions.remove(index))
    }

    /// Runs `f` on the first extension of concrete type `E`.
    pub fn with_extension<E: WorldExtension, R>(&self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let mut extensions = self.extensions.lock().unwrap();
        extensions
            .iter_mut()
            .find_map(|e| (**e).as_any_mut().downcast_mut::<E>())
            .map(f)
    }

    /// Names of the extensions, in attachment order.
    pub fn extension_names(&self) -> Vec<String> {
        self.extensions
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Ticks every extension once.
    pub fn update(&self) {
        let mut extensions = self.extensions.lock().unwrap();
        for extension in extensions.iter_mut() {
            extension.on_update(self);
        }
    }
}

impl InstAttachable for World {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "World"
    }

    fn on_update(&self) -> bool {
        self.update();
        true
    }

    fn on_destroy(&self) {
        let mut extensions = std::mem::take(&mut *self.extensions.lock().unwrap());
        for extension in extensions.iter_mut() {
            extension.on_detach(self);
        }
        self.objects.write().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GraphicsApi;
    use crate::config::EngineConfig;
    use crate::instance::Instance;
    use crate::logging::MemorySink;
    use crate::platform::Platform;
    use crate::scene::Transform;

    fn instance(sink: &MemorySink) -> Instance {
        let mut instance = Instance::with_log_sink(
            "world",
            GraphicsApi::None,
            &Platform::new(),
            EngineConfig::default(),
            Box::new(sink.clone()),
        );
        instance.stop_updates();
        instance
    }

    #[derive(Default)]
    struct Gravity {
        ticks: u32,
    }

    impl WorldExtension for Gravity {
        fn name(&self) -> &str {
            "gravity"
        }
        fn on_update(&mut self, _world: &World) {
            self.ticks += 1;
        }
    }

    #[test]
    fn objects_are_contained_once() {
        let sink = MemorySink::new();
        let instance = instance(&sink);
        let world = World::new(&instance, "main");
        let root = Object::new(&instance, "root", Transform::default());
        let child = Object::new(&instance, "child", Transform::default());
        root.add_child(&child).unwrap();

        world.add_object(&root).unwrap();
        assert_eq!(
            world.add_object(&root),
            Err(SceneError::AlreadyContained("root".into()))
        );
        assert_eq!(
            world.add_object(&child),
            Err(SceneError::AlreadyContained("child".into()))
        );
        assert_eq!(sink.count(Severity::Error), 2);
        assert_eq!(world.all_objects().len(), 2);
    }

    #[test]
    fn concurrent_adds_accept_an_object_once() {
        let sink = MemorySink::new();
        let instance = instance(&sink);
        let world = World::new(&instance, "main");
        for i in 0..300 {
            let object = Object::new(&instance, format!("racer{i}"), Transform::default());
            let barrier = std::sync::Barrier::new(2);
            let add = || {
                barrier.wait();
                world.add_object(&object).is_ok()
            };
            let accepted = std::thread::scope(|s| {
                let first = s.spawn(add);
                let second = s.spawn(add);
                [first.join().unwrap(), second.join().unwrap()]
                    .into_iter()
                    .filter(|ok| *ok)
                    .count()
            });
            assert_eq!(accepted, 1, "racer{i} was accepted {accepted} times");
        }
        assert_eq!(world.all_objects().len(), 300);
        assert_eq!(sink.count(Severity::Error), 300);
    }

    #[test]
    fn ancestor_of_a_root_is_rejected() {
        let sink = MemorySink::new();
        let instance = instance(&sink);
        let world = World::new(&instance, "main");
        let top = Object::new(&instance, "top", Transform::default());
        let mid = Object::new(&instance, "mid", Transform::default());
        top.add_child(&mid).unwrap();

        world.add_object(&mid).unwrap();
        assert!(matches!(
            world.add_object(&top),
            Err(SceneError::AlreadyContained(_))
        ));
    }

    #[test]
    fn root_names_are_unique() {
        let sink = MemorySink::new();
        let instance = instance(&sink);
        let world = World::new(&instance, "main");
        world
            .add_object(&Object::new(&instance, "a", Transform::default()))
            .unwrap();
        let other = Object::new(&instance, "a", Transform::default());
        assert_eq!(
            world.add_object(&other),
            Err(SceneError::DuplicateName("a".into()))
        );
        assert!(world.remove_object("a").is_ok());
        assert_eq!(
            world.remove_object("a").err(),
            Some(SceneError::NotFound("a".into()))
        );
    }

    #[test]
    fn extensions_tick_with_the_world() {
        let sink = MemorySink::new();
        let instance = instance(&sink);
        let world = World::new(&instance, "main");
        world.add_extension(Gravity::default()).unwrap();
        assert!(world.add_extension(Gravity::default()).is_err());

        instance.update_elements();
        instance.update_elements();
        assert_eq!(world.with_extension::<Gravity, _>(|g| g.ticks), Some(2));

        assert!(world.remove_extension("gravity").is_some());
        assert!(world.extension_names().is_empty());
    }
}
