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

use super::transform::{Transform, TransformChanges};
use crate::error::SceneError;
use crate::instance::{InstAttachable, InstanceContext, InstanceHandle};
use crate::logging::Severity;
use crate::math::{Mat4, Quaternion, Vec3};
use crate::utils::AsAny;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};

/// A capability attached to one object.
///
/// Every update tick the owning object calls `on_update` on all of its attachments,
/// then `on_late_update` on all of them. Hooks run while the object's attachment list
/// is locked, so they must not add, remove or look up attachments of the same
/// object.
pub trait ObjectAttachable: AsAny + Send {
    /// Tag used to look the attachment up by type.
    fn type_name(&self) -> &'static str;

    /// Called when the attachment is added to `object`.
    fn on_attach(&mut self, _object: &Object) {}

    /// Called when the attachment is removed from `object`.
    fn on_remove(&mut self, _object: &Object) {}

    /// First update phase.
    fn on_update(&mut self, _object: &Object) {}

    /// Second update phase, after every attachment's `on_update`.
    fn on_late_update(&mut self, _object: &Object) {}
}

#[derive(Debug, Default)]
struct Spatial {
    transform: Transform,
    changes: TransformChanges,
}

#[derive(Default)]
struct Hierarchy {
    parent: Weak<Object>,
    children: HashMap<String, Arc<Object>>,
}

/// A named node of the scene hierarchy.
///
/// Parents own their children; a child only keeps a weak reference to its parent.
/// Sibling names are unique and the hierarchy never contains a cycle.
pub struct Object {
    name: String,
    instance: InstanceHandle,
    spatial: RwLock<Spatial>,
    hierarchy: RwLock<Hierarchy>,
    attachments: Mutex<Vec<Box<dyn ObjectAttachable>>>,
    self_ref: Weak<Object>,
}

impl Object {
    /// Creates an object and registers it with the instance.
    pub fn new(instance: &InstanceContext, name: impl Into<String>, transform: Transform) -> Arc<Self> {
        let object = Arc::new_cyclic(|self_ref| Self {
            name: name.into(),
            instance: instance.handle(),
            spatial: RwLock::new(Spatial {
                transform,
                changes: TransformChanges::default(),
            }),
            hierarchy: RwLock::new(Hierarchy::default()),
            attachments: Mutex::new(Vec::new()),
            self_ref: self_ref.clone(),
        });
        instance.add_element(object.clone());
        object
    }

    /// Creates an object and adopts `children`, taking each away from its previous
    /// parent. Children that can not be adopted are logged and skipped.
    pub fn with_children(
        instance: &InstanceContext,
        name: impl Into<String>,
        transform: Transform,
        children: &[Arc<Object>],
    ) -> Arc<Self> {
        let object = Self::new(instance, name, transform);
        for child in children {
            if let Err(e) = object.add_child(child) {
                instance.log(e.to_string(), Severity::Error);
            }
        }
        object
    }

    /// The object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // --- Transform ---

    /// The local transform.
    pub fn transform(&self) -> Transform {
        self.spatial.read().unwrap().transform
    }

    /// Replaces the local transform, flagging every part that differs.
    pub fn set_transform(&self, transform: Transform) {
        let mut spatial = self.spatial.write().unwrap();
        let old = spatial.transform;
        spatial.changes.moved |= old.position != transform.position;
        spatial.changes.rotated |= old.rotation != transform.rotation;
        spatial.changes.scaled |= old.scale != transform.scale;
        spatial.transform = transform;
    }

    /// Sets the local position.
    pub fn set_position(&self, position: Vec3) {
        let mut spatial = self.spatial.write().unwrap();
        spatial.transform.position = position;
        spatial.changes.moved = true;
    }

    /// Moves the object by `offset`.
    pub fn translate(&self, offset: Vec3) {
        let mut spatial = self.spatial.write().unwrap();
        spatial.transform.position += offset;
        spatial.changes.moved = true;
    }

    /// Sets the local rotation.
    pub fn set_rotation(&self, rotation: Quaternion) {
        let mut spatial = self.spatial.write().unwrap();
        spatial.transform.rotation = rotation;
        spatial.changes.rotated = true;
    }

    /// Applies `rotation` after the current rotation.
    pub fn rotate(&self, rotation: Quaternion) {
        let mut spatial = self.spatial.write().unwrap();
        spatial.transform.rotation = (rotation * spatial.transform.rotation).normalize();
        spatial.changes.rotated = true;
    }

    /// Sets the local scale.
    pub fn set_scale(&self, scale: Vec3) {
        let mut spatial = self.spatial.write().unwrap();
        spatial.transform.scale = scale;
        spatial.changes.scaled = true;
    }

    /// What changed since the last update tick.
    pub fn changes(&self) -> TransformChanges {
        self.spatial.read().unwrap().changes
    }

    /// The model matrix in world space, composed through the parent chain.
    pub fn global_matrix(&self) -> Mat4 {
        let local = self.transform().matrix();
        match self.parent() {
            Some(parent) => parent.global_matrix() * local,
            None => local,
        }
    }

    /// The rotation in world space.
    pub fn global_rotation(&self) -> Quaternion {
        let local = self.transform().rotation;
        match self.parent() {
            Some(parent) => parent.global_rotation() * local,
            None => local,
        }
    }

    /// The position in world space.
    pub fn global_position(&self) -> Vec3 {
        self.global_matrix().translation()
    }

    // --- Hierarchy ---

    /// The parent, if the object has one.
    pub fn parent(&self) -> Option<Arc<Object>> {
        self.hierarchy.read().unwrap().parent.upgrade()
    }

    /// The direct children, in no particular order.
    pub fn children(&self) -> Vec<Arc<Object>> {
        self.hierarchy
            .read()
            .unwrap()
            .children
            .values()
            .cloned()
            .collect()
    }

    /// The direct child called `name`.
    pub fn child(&self, name: &str) -> Option<Arc<Object>> {
        self.hierarchy.read().unwrap().children.get(name).cloned()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.hierarchy.read().unwrap().children.len()
    }

    /// Whether `target` is somewhere below this object.
    pub fn has_descendant(&self, target: &Object) -> bool {
        self.children()
            .iter()
            .any(|child| std::ptr::eq(child.as_ref(), target) || child.has_descendant(target))
    }

    /// Whether `target` is this object's parent, grandparent, ...
    pub fn has_ancestor(&self, target: &Object) -> bool {
        let mut current = self.parent();
        while let Some(object) = current {
            if std::ptr::eq(object.as_ref(), target) {
                return true;
            }
            current = object.parent();
        }
        false
    }

    /// Whether this object may become a child of `parent`.
    ///
    /// Refused when `parent` is the object itself, lies in the object's own child
    /// tree, or has the object somewhere in its chain of parents.
    pub fn can_be_child(&self, parent: &Object) -> bool {
        !std::ptr::eq(self, parent) && !self.has_descendant(parent) && !parent.has_ancestor(self)
    }

    /// Makes `child` a child of this object, taking it away from its previous parent.
    ///
    /// Fails on cycles and on sibling name clashes. Adding a child that is already
    /// ours does nothing.
    pub fn add_child(&self, child: &Arc<Object>) -> Result<(), SceneError> {
        if !child.can_be_child(self) {
            return Err(SceneError::Cycle {
                parent: self.name.clone(),
                child: child.name.clone(),
            });
        }
        if let Some(existing) = self.child(&child.name) {
            if Arc::ptr_eq(&existing, child) {
                return Ok(());
            }
            return Err(SceneError::DuplicateName(child.name.clone()));
        }

        if let Some(old_parent) = child.parent() {
            old_parent.detach_child(child);
        }
        child.hierarchy.write().unwrap().parent = self.self_ref.clone();
        self.hierarchy
            .write()
            .unwrap()
            .children
            .insert(child.name.clone(), Arc::clone(child));
        Ok(())
    }

    /// Removes the child called `name` and hands it back, parentless.
    pub fn remove_child(&self, name: &str) -> Option<Arc<Object>> {
        let child = self.hierarchy.write().unwrap().children.remove(name)?;
        child.hierarchy.write().unwrap().parent = Weak::new();
        Some(child)
    }

    /// This object followed by every descendant, depth first, siblings by name.
    pub fn subtree(&self) -> Vec<Arc<Object>> {
        let mut out = Vec::new();
        if let Some(me) = self.self_ref.upgrade() {
            Self::collect_subtree(me, &mut out);
        }
        out
    }

    fn collect_subtree(object: Arc<Object>, out: &mut Vec<Arc<Object>>) {
        let mut children = object.children();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        out.push(object);
        for child in children {
            Self::collect_subtree(child, out);
        }
    }

    fn detach_child(&self, child: &Arc<Object>) {
        let mut hierarchy = self.hierarchy.write().unwrap();
        if hierarchy
            .children
            .get(&child.name)
            .is_some_and(|c| Arc::ptr_eq(c, child))
        {
            hierarchy.children.remove(&child.name);
        }
    }

    // --- Attachments ---

    /// Adds an attachment and calls its `on_attach`.
    pub fn add_attachment<A: ObjectAttachable>(&self, attachment: A) {
        self.add_boxed_attachment(Box::new(attachment));
    }

    /// Adds an already boxed attachment and calls its `on_attach`.
    pub fn add_boxed_attachment(&self, mut attachment: Box<dyn ObjectAttachable>) {
        let mut attachments = self.attachments.lock().unwrap();
        attachment.on_attach(self);
        attachments.push(attachment);
    }

    /// Removes the first attachment tagged `type_name`, after calling its `on_remove`.
    pub fn remove_attachment(&self, type_name: &str) -> Option<Box<dyn ObjectAttachable>> {
        let mut attachments = self.attachments.lock().unwrap();
        let index = attachments.iter().position(|a| a.type_name() == type_name)?;
        attachments[index].on_remove(self);
        Some(attachments.remove(index))
    }

    /// Removes every attachment, calling each `on_remove` first.
    pub fn clear_attachments(&self) {
        let mut attachments = self.attachments.lock().unwrap();
        for attachment in attachments.iter_mut() {
            attachment.on_remove(self);
        }
        attachments.clear();
    }

    /// Runs `f` on the first attachment of concrete type `A`.
    pub fn with_attachment<A: ObjectAttachable, R>(&self, f: impl FnOnce(&A) -> R) -> Option<R> {
        let attachments = self.attachments.lock().unwrap();
        attachments
            .iter()
            .find_map(|a| (**a).as_any().downcast_ref::<A>())
            .map(f)
    }

    /// Runs `f` on the first attachment of concrete type `A`, mutably.
    pub fn with_attachment_mut<A: ObjectAttachable, R>(&self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        let mut attachments = self.attachments.lock().unwrap();
        attachments
            .iter_mut()
            .find_map(|a| (**a).as_any_mut().downcast_mut::<A>())
            .map(f)
    }

    /// Whether an attachment tagged `type_name` is present.
    pub fn has_attachment(&self, type_name: &str) -> bool {
        self.attachments
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.type_name() == type_name)
    }

    /// The attachment tags, in attachment order.
    pub fn attachment_types(&self) -> Vec<&'static str> {
        self.attachments
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.type_name())
            .collect()
    }

    /// Runs one tick: `on_update` on every attachment, then `on_late_update` on every
    /// attachment, then clears the change flags.
    pub fn update(&self) {
        {
            let mut attachments = self.attachments.lock().unwrap();
            for attachment in attachments.iter_mut() {
                attachment.on_update(self);
            }
            for attachment in attachments.iter_mut() {
                attachment.on_late_update(self);
            }
        }
        self.spatial.write().unwrap().changes = TransformChanges::default();
    }
}

impl InstAttachable for Object {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Object"
    }

    fn on_update(&self) -> bool {
        self.update();
        true
    }

    fn on_destroy(&self) {
        self.clear_attachments();
        self.instance.log_debug(format!("Object '{}' destroyed.", self.name));
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let attachments = self.attachments.get_mut().unwrap_or_else(|e| e.into_inner());
        let mut attachments = std::mem::take(attachments);
        for attachment in attachments.iter_mut() {
            attachment.on_remove(self);
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("transform", &self.transform())
            .field("children", &self.child_count())
            .field("attachments", &self.attachment_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GraphicsApi;
    use crate::config::{EngineConfig, LoggerConfig};
    use crate::instance::Instance;
    use crate::platform::Platform;
    use approx::assert_abs_diff_eq;

    fn instance() -> Instance {
        let config = EngineConfig {
            logger: LoggerConfig {
                enabled: false,
                ..LoggerConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut instance = Instance::new("scene", GraphicsApi::None, &Platform::new(), config);
        instance.stop_updates();
        instance
    }

    struct Tagged(&'static str, Arc<Mutex<Vec<String>>>);

    impl ObjectAttachable for Tagged {
        fn type_name(&self) -> &'static str {
            self.0
        }
        fn on_attach(&mut self, object: &Object) {
            self.1.lock().unwrap().push(format!("{}.attach@{}", self.0, object.name()));
        }
        fn on_remove(&mut self, _object: &Object) {
            self.1.lock().unwrap().push(format!("{}.remove", self.0));
        }
    }

    #[test]
    fn children_move_between_parents() {
        let instance = instance();
        let a = Object::new(&instance, "a", Transform::default());
        let b = Object::new(&instance, "b", Transform::default());
        let c = Object::new(&instance, "c", Transform::default());

        a.add_child(&c).unwrap();
        b.add_child(&c).unwrap();
        assert_eq!(a.child_count(), 0);
        assert!(Arc::ptr_eq(&c.parent().unwrap(), &b));

        assert!(b.remove_child("c").is_some());
        assert!(c.parent().is_none());
    }

    #[test]
    fn sibling_names_are_unique() {
        let instance = instance();
        let root = Object::new(&instance, "root", Transform::default());
        let first = Object::new(&instance, "twin", Transform::default());
        let second = Object::new(&instance, "twin", Transform::default());
        root.add_child(&first).unwrap();
        assert_eq!(
            root.add_child(&second),
            Err(SceneError::DuplicateName("twin".into()))
        );
        assert_eq!(root.add_child(&first), Ok(()));
    }

    #[test]
    fn cycles_are_rejected_both_ways() {
        let instance = instance();
        let a = Object::new(&instance, "a", Transform::default());
        let b = Object::new(&instance, "b", Transform::default());
        let c = Object::new(&instance, "c", Transform::default());
        a.add_child(&b).unwrap();
        b.add_child(&c).unwrap();

        assert!(!a.can_be_child(&c));
        assert!(!a.can_be_child(&a));
        assert!(matches!(c.add_child(&a), Err(SceneError::Cycle { .. })));
        assert!(matches!(b.add_child(&b), Err(SceneError::Cycle { .. })));
        assert!(c.can_be_child(&a));
    }

    #[test]
    fn with_children_adopts() {
        let instance = instance();
        let leaf = Object::new(&instance, "leaf", Transform::default());
        let root = Object::with_children(&instance, "root", Transform::default(), &[leaf.clone()]);
        assert!(root.child("leaf").is_some());
        assert_eq!(root.subtree().len(), 2);
    }

    #[test]
    fn global_matrix_composes_parents() {
        let instance = instance();
        let parent = Object::new(&instance, "parent", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let child = Object::new(&instance, "child", Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
        parent.add_child(&child).unwrap();
        let p = child.global_position();
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn change_flags_reset_after_update() {
        let instance = instance();
        let object = Object::new(&instance, "mover", Transform::default());
        object.translate(Vec3::X);
        assert!(object.changes().moved);
        assert!(!object.changes().scaled);
        object.update();
        assert!(!object.changes().any());
    }

    #[test]
    fn attachment_hooks_fire() {
        let instance = instance();
        let log = Arc::new(Mutex::new(Vec::new()));
        let object = Object::new(&instance, "host", Transform::default());
        object.add_attachment(Tagged("first", log.clone()));
        object.add_attachment(Tagged("second", log.clone()));
        assert_eq!(object.attachment_types(), vec!["first", "second"]);

        assert!(object.remove_attachment("first").is_some());
        assert!(object.remove_attachment("first").is_none());
        object.on_destroy();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first.attach@host", "second.attach@host", "first.remove", "second.remove"]
        );
        assert!(object.attachment_types().is_empty());
    }

    #[test]
    fn dropping_the_object_removes_attachments() {
        let instance = instance();
        let log = Arc::new(Mutex::new(Vec::new()));
        let object = Object::new(&instance, "temp", Transform::default());
        object.add_attachment(Tagged("only", log.clone()));
        assert!(instance.remove_element(&*object));
        drop(object);
        assert_eq!(*log.lock().unwrap(), vec!["only.attach@temp", "only.remove"]);
    }

    #[test]
    fn lookup_by_concrete_type() {
        let instance = instance();
        let object = Object::new(&instance, "host", Transform::default());
        object.add_attachment(Tagged("tag", Arc::default()));
        assert_eq!(object.with_attachment::<Tagged, _>(|t| t.0), Some("tag"));
        assert!(object.has_attachment("tag"));
    }
}
