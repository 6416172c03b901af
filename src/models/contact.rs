// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact model for storage and API.

use super::Attachment;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;

/// Contact record stored in the `contacts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Random identifier assigned at creation, never changed afterwards
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    /// Primary email, unique across contacts
    pub email1: String,
    pub email2: Option<String>,
    pub phone_number1: String,
    pub phone_number2: Option<String>,
    pub country: Option<String>,
    pub street_address_line1: Option<String>,
    pub street_address_line2: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub state: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub profile_picture: Option<Json<Attachment>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The client-writable columns of a contact.
///
/// Validated input is mapped into this struct field by field; identity and
/// timestamps are not part of it and so can never be mass-assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub first_name: String,
    pub surname: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub email1: String,
    pub email2: Option<String>,
    pub phone_number1: String,
    pub phone_number2: Option<String>,
    pub country: Option<String>,
    pub street_address_line1: Option<String>,
    pub street_address_line2: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub state: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl Contact {
    /// Generate a new collision-resistant contact id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Build a new record with a fresh id and both timestamps set to `now`.
    pub fn create(
        fields: ContactFields,
        profile_picture: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut contact = Self {
            id: Self::new_id(),
            first_name: String::new(),
            surname: String::new(),
            company: None,
            job_title: None,
            email1: String::new(),
            email2: None,
            phone_number1: String::new(),
            phone_number2: None,
            country: None,
            street_address_line1: None,
            street_address_line2: None,
            city: None,
            post_code: None,
            state: None,
            birthday: None,
            website: None,
            notes: None,
            profile_picture: profile_picture.map(Json),
            created_at: now,
            updated_at: now,
        };
        contact.merge(fields, now);
        contact
    }

    /// Replace every writable column with `fields` and bump `updated_at`.
    pub fn merge(&mut self, fields: ContactFields, now: DateTime<Utc>) {
        let ContactFields {
            first_name,
            surname,
            company,
            job_title,
            email1,
            email2,
            phone_number1,
            phone_number2,
            country,
            street_address_line1,
            street_address_line2,
            city,
            post_code,
            state,
            birthday,
            website,
            notes,
        } = fields;

        self.first_name = first_name;
        self.surname = surname;
        self.company = company;
        self.job_title = job_title;
        self.email1 = email1;
        self.email2 = email2;
        self.phone_number1 = phone_number1;
        self.phone_number2 = phone_number2;
        self.country = country;
        self.street_address_line1 = street_address_line1;
        self.street_address_line2 = street_address_line2;
        self.city = city;
        self.post_code = post_code;
        self.state = state;
        self.birthday = birthday;
        self.website = website;
        self.notes = notes;
        self.updated_at = now;
    }

    pub fn profile_picture(&self) -> Option<&Attachment> {
        self.profile_picture.as_ref().map(|p| &p.0)
    }

    pub fn profile_picture_mut(&mut self) -> Option<&mut Attachment> {
        self.profile_picture.as_mut().map(|p| &mut p.0)
    }

    /// Swap in a new picture, returning the one it replaces.
    pub fn replace_profile_picture(&mut self, picture: Attachment) -> Option<Attachment> {
        self.profile_picture
            .replace(Json(picture))
            .map(|Json(old)| old)
    }
}

/// Subset of contact columns returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub email1: String,
    pub phone_number1: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub profile_picture: Option<Json<Attachment>>,
}

impl ContactSummary {
    pub fn profile_picture_mut(&mut self) -> Option<&mut Attachment> {
        self.profile_picture.as_mut().map(|p| &mut p.0)
    }
}
