// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - attachment storage and health reporting.

pub mod attachments;
pub mod health;

pub use attachments::{AttachmentService, Disk, FakeDisk, LocalDisk, AVATARS_FOLDER};
pub use health::{health_report, HealthReport};
