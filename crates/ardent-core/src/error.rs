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

//! Defines the hierarchy of error types for the engine core.
//!
//! Nothing in the core panics across its public API: failures are reported through
//! these types (and, where the caller cannot act on them, through the instance
//! logger only).

use crate::api::GraphicsApi;
use std::fmt;

/// An error related to the creation or use of a GPU resource (arenas, buffers,
/// textures, framebuffers, windows).
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No backend is available for the given API.
    MissingBackend(GraphicsApi),
    /// The resource has no backend object, either because its creation failed or
    /// because it has already been destroyed.
    Unusable,
    /// A byte range or write went past the end of the resource.
    OutOfBounds {
        /// First byte of the attempted access.
        offset: u64,
        /// Length of the attempted access.
        size: u64,
        /// Capacity of the resource at the time of the access.
        capacity: u64,
    },
    /// A fixed-size arena could not satisfy an allocation.
    OutOfMemory {
        /// Requested allocation size.
        requested: u64,
        /// Capacity of the arena.
        capacity: u64,
    },
    /// A byte range handed back to an arena was never allocated from it.
    InvalidRange {
        /// Offset of the rejected range.
        offset: u64,
        /// Size of the rejected range.
        size: u64,
    },
    /// A framebuffer attachment is not usable as a render target.
    InvalidAttachment {
        /// Index of the offending color attachment, `None` for the depth attachment.
        index: Option<usize>,
        /// What is wrong with it.
        reason: String,
    },
    /// Framebuffer attachments disagree on their pixel dimensions.
    SizeMismatch {
        /// Size of the first attachment.
        expected: (u32, u32),
        /// Size of the mismatching attachment.
        found: (u32, u32),
    },
    /// An error originating from the backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::MissingBackend(api) => {
                write!(f, "No graphics backend is registered for the {api} API.")
            }
            ResourceError::Unusable => write!(f, "Resource has no backend object."),
            ResourceError::OutOfBounds {
                offset,
                size,
                capacity,
            } => write!(
                f,
                "Access of {size} bytes at offset {offset} exceeds capacity {capacity}."
            ),
            ResourceError::OutOfMemory {
                requested,
                capacity,
            } => write!(
                f,
                "Arena of {capacity} bytes cannot satisfy an allocation of {requested} bytes."
            ),
            ResourceError::InvalidRange { offset, size } => {
                write!(f, "Range [{offset}, +{size}) was not allocated from this arena.")
            }
            ResourceError::InvalidAttachment { index, reason } => match index {
                Some(i) => write!(f, "Color attachment {i} is invalid: {reason}"),
                None => write!(f, "Depth attachment is invalid: {reason}"),
            },
            ResourceError::SizeMismatch { expected, found } => write!(
                f,
                "Attachment size {}x{} does not match {}x{}.",
                found.0, found.1, expected.0, expected.1
            ),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error raised while editing the object hierarchy or a world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The requested parent/child link would create a cycle.
    Cycle {
        /// Name of the would-be parent.
        parent: String,
        /// Name of the would-be child.
        child: String,
    },
    /// A sibling (or a world entry) already uses this name.
    DuplicateName(String),
    /// The object is already part of the world, directly or through the hierarchy
    /// of another contained object.
    AlreadyContained(String),
    /// No object of that name could be found.
    NotFound(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Cycle { parent, child } => write!(
                f,
                "Object '{child}' can not become a child of '{parent}': the hierarchy would contain a cycle."
            ),
            SceneError::DuplicateName(name) => {
                write!(f, "An object named '{name}' already exists at this level.")
            }
            SceneError::AlreadyContained(name) => {
                write!(f, "Object '{name}' is already part of the world hierarchy.")
            }
            SceneError::NotFound(name) => write!(f, "No object named '{name}'."),
        }
    }
}

impl std::error::Error for SceneError {}

/// An error related to instance-level setup.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// The API is marked as supported but no backend implements it.
    NotImplemented(GraphicsApi),
    /// The API is not supported by the engine at all.
    Unsupported(GraphicsApi),
    /// Backend context or graphic-instance creation failed.
    InitializationFailed(String),
    /// The instance that owned this object no longer exists.
    InstanceGone,
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::NotImplemented(api) => write!(
                f,
                "The {api} API is marked as supported but has no implementation. This is an engine bug."
            ),
            InstanceError::Unsupported(api) => {
                write!(f, "The {api} API is not supported.")
            }
            InstanceError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize the graphics API: {msg}")
            }
            InstanceError::InstanceGone => write!(f, "The owning instance was destroyed."),
        }
    }
}

impl std::error::Error for InstanceError {}

impl From<InstanceError> for ResourceError {
    fn from(err: InstanceError) -> Self {
        ResourceError::BackendError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_display() {
        let err = ResourceError::OutOfBounds {
            offset: 12,
            size: 8,
            capacity: 16,
        };
        assert_eq!(
            err.to_string(),
            "Access of 8 bytes at offset 12 exceeds capacity 16."
        );
    }

    #[test]
    fn attachment_display_distinguishes_depth() {
        let color = ResourceError::InvalidAttachment {
            index: Some(1),
            reason: "not a render target".into(),
        };
        let depth = ResourceError::InvalidAttachment {
            index: None,
            reason: "not a depth format".into(),
        };
        assert!(color.to_string().starts_with("Color attachment 1"));
        assert!(depth.to_string().starts_with("Depth attachment"));
    }

    #[test]
    fn instance_error_converts_to_resource_error() {
        let err: ResourceError = InstanceError::Unsupported(GraphicsApi::None).into();
        match err {
            ResourceError::BackendError(msg) => assert!(msg.contains("None")),
            other => panic!("unexpected conversion: {other:?}"),
        }
    }

    #[test]
    fn scene_error_display() {
        let err = SceneError::Cycle {
            parent: "a".into(),
            child: "b".into(),
        };
        assert!(err.to_string().contains("cycle"));
    }
}
