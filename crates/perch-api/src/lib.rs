// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Production adapters for the Perch messaging client.
//!
//! [`HttpMessageApi`] speaks to the marketplace REST surface (message table
//! and profiles), [`HttpObjectStore`] to the storage service, and
//! [`WsPushChannel`] to the live insert-event stream.

pub mod dto;
pub mod http;
pub mod storage;
pub mod ws;

pub use http::HttpMessageApi;
pub use storage::HttpObjectStore;
pub use ws::WsPushChannel;
