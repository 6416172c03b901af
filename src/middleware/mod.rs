// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (contact lookup, security headers).

pub mod find_contact;
pub mod security;

pub use find_contact::{find_contact, RequestedContact};
