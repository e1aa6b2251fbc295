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

//! Integration tests for the object hierarchy, worlds and the two-phase object
//! update.

mod common;

use approx::assert_relative_eq;
use ardent_core::math::Vec3;
use ardent_core::scene::{Object, ObjectAttachable, Transform, World};
use ardent_core::{GraphicsApi, SceneError, Severity};
use common::harness;
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<String>>>;

/// Records both update phases under a fixed tag.
struct Recorder<const N: usize> {
    journal: Journal,
}

impl<const N: usize> ObjectAttachable for Recorder<N> {
    fn type_name(&self) -> &'static str {
        ["first", "second"][N]
    }

    fn on_update(&mut self, object: &Object) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}:update", object.name(), self.type_name()));
    }

    fn on_late_update(&mut self, object: &Object) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}:late", object.name(), self.type_name()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hierarchy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hierarchy_rejects_cycles() {
    let h = harness(GraphicsApi::None);
    let a = Object::new(&h.instance, "a", Transform::default());
    let b = Object::new(&h.instance, "b", Transform::default());
    let c = Object::new(&h.instance, "c", Transform::default());
    a.add_child(&b).unwrap();
    b.add_child(&c).unwrap();

    assert!(matches!(c.add_child(&a), Err(SceneError::Cycle { .. })));
    assert!(matches!(b.add_child(&a), Err(SceneError::Cycle { .. })));
    assert!(matches!(a.add_child(&a), Err(SceneError::Cycle { .. })));
    assert!(!a.can_be_child(&c));
    assert!(c.can_be_child(&a), "reattaching a descendant higher up is allowed");

    assert!(a.parent().is_none(), "failed links must leave the tree untouched");
    assert_eq!(
        a.subtree().iter().map(|o| o.name().to_string()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn test_reparenting_moves_the_child() {
    let h = harness(GraphicsApi::None);
    let left = Object::new(&h.instance, "left", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
    let right = Object::new(&h.instance, "right", Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
    let leaf = Object::new(&h.instance, "leaf", Transform::from_position(Vec3::new(0.0, 0.0, 3.0)));

    left.add_child(&leaf).unwrap();
    right.add_child(&leaf).unwrap();

    assert_eq!(left.child_count(), 0);
    assert!(right.child("leaf").is_some());
    assert!(leaf.parent().is_some_and(|p| Arc::ptr_eq(&p, &right)));
    let position = leaf.global_position();
    assert_relative_eq!(position.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(position.y, 2.0, epsilon = 1e-5);
    assert_relative_eq!(position.z, 3.0, epsilon = 1e-5);
}

#[test]
fn test_sibling_names_are_unique() {
    let h = harness(GraphicsApi::None);
    let root = Object::new(&h.instance, "root", Transform::default());
    let first = Object::new(&h.instance, "twin", Transform::default());
    let second = Object::new(&h.instance, "twin", Transform::default());
    root.add_child(&first).unwrap();
    assert_eq!(root.add_child(&second), Err(SceneError::DuplicateName("twin".into())));
    assert_eq!(root.add_child(&first), Ok(()), "re-adding an own child is a no-op");
    assert_eq!(root.child_count(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Worlds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_world_rejects_duplicates() {
    let h = harness(GraphicsApi::None);
    let world = World::new(&h.instance, "level");
    let player = Object::new(&h.instance, "player", Transform::default());
    let impostor = Object::new(&h.instance, "player", Transform::default());

    world.add_object(&player).unwrap();
    assert!(world.contains("player"));
    assert_eq!(
        world.add_object(&player),
        Err(SceneError::AlreadyContained("player".into()))
    );
    assert_eq!(
        world.add_object(&impostor),
        Err(SceneError::DuplicateName("player".into()))
    );
    assert_eq!(world.object_count(), 1);
    assert_eq!(h.sink.count(Severity::Error), 2, "each rejection is logged");
    assert!(world.object("player").is_some_and(|o| Arc::ptr_eq(&o, &player)));
}

#[test]
fn test_world_rejects_relatives_of_roots() {
    let h = harness(GraphicsApi::None);
    let world = World::new(&h.instance, "level");
    let car = Object::new(&h.instance, "car", Transform::default());
    let wheel = Object::new(&h.instance, "wheel", Transform::default());
    car.add_child(&wheel).unwrap();
    world.add_object(&car).unwrap();

    assert_eq!(
        world.add_object(&wheel),
        Err(SceneError::AlreadyContained("wheel".into()))
    );
    let names: Vec<String> = world.all_objects().iter().map(|o| o.name().to_string()).collect();
    assert_eq!(names, vec!["car", "wheel"]);

    assert!(world.remove_object("car").is_ok());
    assert!(!world.contains("car"));
    assert_eq!(world.remove_object("car").err(), Some(SceneError::NotFound("car".into())));
}

// ─────────────────────────────────────────────────────────────────────────────
// Updates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_late_update_follows_every_update() {
    let h = harness(GraphicsApi::None);
    let journal = Journal::default();
    let object = Object::new(&h.instance, "hero", Transform::default());
    object.add_attachment(Recorder::<0> {
        journal: Arc::clone(&journal),
    });
    object.add_attachment(Recorder::<1> {
        journal: Arc::clone(&journal),
    });

    h.instance.update_elements();

    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "hero:first:update",
            "hero:second:update",
            "hero:first:late",
            "hero:second:late",
        ]
    );
}

#[test]
fn test_change_flags_reset_after_update() {
    let h = harness(GraphicsApi::None);
    let object = Object::new(&h.instance, "mover", Transform::default());
    object.translate(Vec3::X);
    assert!(object.changes().moved);
    assert!(!object.changes().rotated);

    h.instance.update_elements();
    assert!(!object.changes().any());
    assert_eq!(object.transform().position, Vec3::X);
}
