// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attachment;
pub mod contact;

pub use attachment::Attachment;
pub use contact::{Contact, ContactFields, ContactSummary};
