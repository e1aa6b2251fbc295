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

use std::any::Any;

/// Upcasting helper for trait objects that need to be downcast to their concrete type.
///
/// Backends use this to reach their own concrete objects behind the engine's
/// `dyn` interfaces, and objects use it to look attachments up by type.
///
/// Call it on the trait object, not on its `Box`: `(*boxed).as_any()`.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: AsAny {}
    struct Square(u32);
    impl Shape for Square {}

    #[test]
    fn downcast_through_trait_object() {
        let mut shape: Box<dyn Shape> = Box::new(Square(3));
        assert_eq!((*shape).as_any().downcast_ref::<Square>().map(|s| s.0), Some(3));
        if let Some(square) = (*shape).as_any_mut().downcast_mut::<Square>() {
            square.0 = 7;
        }
        assert_eq!((*shape).as_any().downcast_ref::<Square>().map(|s| s.0), Some(7));
        // The box itself is `Any` too.
        assert!(shape.as_any().downcast_ref::<Square>().is_none());
    }
}
