// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact payload schema.

use super::{
    validate, FieldKind, FieldSpec, RawInput, Rule, Schema, UniqueLookup, UploadedFile,
    ValidatedValues, ValidationContext, ValidationErrors, Violation,
};
use crate::error::AppError;
use crate::models::ContactFields;
use chrono::NaiveDate;

/// Profile picture upload limits.
pub const PROFILE_PICTURE_EXTNAMES: &[&str] = &["jpg", "png", "webp", "gif"];
pub const PROFILE_PICTURE_MAX_BYTES: u64 = 500 * 1024;

const TEXT: FieldKind = FieldKind::Text {
    trim: true,
    escape: true,
};

const HTTP_URL: Rule = Rule::Url {
    protocols: &["http", "https"],
    require_host: true,
};

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    rules: &'static [Rule],
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
        rules,
    }
}

pub static CONTACT_SCHEMA: Schema = Schema {
    fields: &[
        field("firstName", "First Name", TEXT, true, &[Rule::MaxLength(30)]),
        field("surname", "Surname", TEXT, true, &[Rule::MaxLength(30)]),
        field("company", "Company", TEXT, false, &[]),
        field("jobTitle", "Job Title", TEXT, false, &[]),
        field(
            "email1",
            "Email 1",
            TEXT,
            true,
            &[Rule::Email, Rule::Unique { column: "email1" }],
        ),
        field("email2", "Email 2", TEXT, false, &[Rule::Email]),
        field("phoneNumber1", "Phone Number 1", TEXT, true, &[Rule::MaxLength(20)]),
        field("phoneNumber2", "Phone Number 2", TEXT, false, &[Rule::MaxLength(20)]),
        field("country", "Country", TEXT, false, &[Rule::MaxLength(20)]),
        field("streetAddressLine1", "Street Address Line 1", TEXT, false, &[]),
        field("streetAddressLine2", "Street Address Line 2", TEXT, false, &[]),
        field("city", "City", TEXT, false, &[]),
        field("postCode", "Post Code", TEXT, false, &[]),
        field("state", "State", TEXT, false, &[]),
        field(
            "birthday",
            "Birthday",
            FieldKind::Date { format: "%Y-%m-%d" },
            false,
            &[Rule::BeforeToday],
        ),
        field(
            "website",
            "Website",
            FieldKind::Text {
                trim: true,
                escape: false,
            },
            false,
            &[HTTP_URL],
        ),
        field("notes", "Notes", TEXT, false, &[]),
        field(
            "profilePicture",
            "Profile Picture",
            FieldKind::File {
                extnames: PROFILE_PICTURE_EXTNAMES,
                max_size: PROFILE_PICTURE_MAX_BYTES,
            },
            false,
            &[],
        ),
    ],
    messages: &[
        ("firstName.required", "First Name is required."),
        (
            "firstName.maxLength",
            "First Name should be the maximum of {{options.maxLength}} characters.",
        ),
        ("surname.required", "Surname is required."),
        (
            "surname.maxLength",
            "Surname should be maximum of {{options.maxLength}} characters.",
        ),
        ("email1.required", "Email 1 is required."),
        ("email1.email", "Email 1 should be a valid email address"),
        ("email1.unique", "Email 1 is already registered in your contacts"),
        ("email2.email", "Email 2 should be a valid email address"),
        ("phoneNumber1.required", "Phone number 1 is required"),
        (
            "phoneNumber1.maxLength",
            "Phone Number 1 should be maximum of {{options.maxLength}} characters.",
        ),
        (
            "phoneNumber2.maxLength",
            "Phone Number 2 should be maximum of {{options.maxLength}} characters.",
        ),
        (
            "country.maxLength",
            "Country should be maximum of {{options.maxLength}} characters.",
        ),
        ("birthday.before", "Birthday must be before 'today'"),
        ("website.url", "Website is not valid"),
    ],
};

/// Validated contact payload: allow-listed columns plus the optional upload.
#[derive(Debug, Clone)]
pub struct ContactPayload {
    pub fields: ContactFields,
    pub profile_picture: Option<UploadedFile>,
}

impl ContactPayload {
    fn from_values(mut values: ValidatedValues) -> Result<Self, AppError> {
        let mut required = |name: &'static str| {
            values
                .take_text(name)
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("validated {} missing", name)))
        };

        let first_name = required("firstName")?;
        let surname = required("surname")?;
        let email1 = required("email1")?;
        let phone_number1 = required("phoneNumber1")?;

        let fields = ContactFields {
            first_name,
            surname,
            company: values.take_text("company"),
            job_title: values.take_text("jobTitle"),
            email1,
            email2: values.take_text("email2"),
            phone_number1,
            phone_number2: values.take_text("phoneNumber2"),
            country: values.take_text("country"),
            street_address_line1: values.take_text("streetAddressLine1"),
            street_address_line2: values.take_text("streetAddressLine2"),
            city: values.take_text("city"),
            post_code: values.take_text("postCode"),
            state: values.take_text("state"),
            birthday: values.take_date("birthday"),
            website: values.take_text("website"),
            notes: values.take_text("notes"),
        };

        Ok(Self {
            fields,
            profile_picture: values.take_file("profilePicture"),
        })
    }
}

/// Validates create/update payloads for contacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactValidator {
    /// Compare `email1` case-insensitively when checking uniqueness
    pub unique_case_insensitive: bool,
}

impl ContactValidator {
    pub fn new(unique_case_insensitive: bool) -> Self {
        Self {
            unique_case_insensitive,
        }
    }

    /// Validate against today's date (UTC).
    pub async fn validate(
        &self,
        input: &RawInput,
        lookup: &dyn UniqueLookup,
        exclude_id: Option<&str>,
    ) -> Result<ContactPayload, AppError> {
        let today = chrono::Utc::now().date_naive();
        self.validate_on(input, lookup, exclude_id, today).await
    }

    pub async fn validate_on(
        &self,
        input: &RawInput,
        lookup: &dyn UniqueLookup,
        exclude_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<ContactPayload, AppError> {
        let ctx = ValidationContext {
            today,
            exclude_id,
            unique_case_insensitive: self.unique_case_insensitive,
            lookup,
        };
        let values = validate(&CONTACT_SCHEMA, input, &ctx).await?;
        ContactPayload::from_values(values)
    }
}

/// Violation reported when the storage layer rejects a duplicate `email1`.
pub fn email_taken() -> ValidationErrors {
    let message = CONTACT_SCHEMA
        .messages
        .iter()
        .find(|(key, _)| *key == "email1.unique")
        .map(|(_, m)| *m)
        .unwrap_or("Email 1 is already taken");
    ValidationErrors::single(Violation::new("email1", "unique", message))
}
