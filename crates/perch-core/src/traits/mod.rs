// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits describing every external collaborator of the messaging
//! core. Concrete implementations live in `perch-api` (production) and
//! `perch-test-utils` (mocks).

pub mod identity;
pub mod kv;
pub mod object_store;
pub mod profile;
pub mod push;
pub mod repository;

pub use identity::IdentityProvider;
pub use kv::KeyValueStore;
pub use object_store::ObjectStore;
pub use profile::ProfileStore;
pub use push::PushChannel;
pub use repository::MessageRepository;
