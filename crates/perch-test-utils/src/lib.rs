// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock implementations of the Perch adapter traits for deterministic
//! testing.
//!
//! Every mock is injectable and inspectable: repositories seed and expose
//! their rows, the push channel takes injected events, the object store can
//! be told to fail per bucket.

pub mod identity;
pub mod memory_kv;
pub mod mock_object_store;
pub mod mock_profiles;
pub mod mock_push;
pub mod mock_repository;

pub use identity::StaticIdentity;
pub use memory_kv::MemoryKv;
pub use mock_object_store::MockObjectStore;
pub use mock_profiles::MockProfiles;
pub use mock_push::MockPushChannel;
pub use mock_repository::MockRepository;
