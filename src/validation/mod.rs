// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Declarative request validation.
//!
//! A [`Schema`] is a static table of [`FieldSpec`]s. [`validate`] walks the
//! table in order, evaluates every field (no short-circuit across fields) and
//! either returns the sanitized values or every [`Violation`] it found.
//! Messages are templates keyed by `field.rule`, with `{{label}}` and
//! `{{options.*}}` placeholders.

pub mod contact;

pub use contact::{ContactPayload, ContactValidator};

use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use validator::{ValidateEmail, ValidateLength};

/// An uploaded file as received from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name supplied by the client
    pub client_name: String,
    /// Content type supplied by the client
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lower-cased extension taken from the client file name.
    pub fn extname(&self) -> String {
        self.client_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Raw, untyped request payload.
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl RawInput {
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn insert_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.insert(name.into(), file);
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = RawInput::default();
        for (k, v) in iter {
            input.insert_field(k, v);
        }
        input
    }
}

/// How a field's raw value is interpreted.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text { trim: bool, escape: bool },
    /// Date in an exact chrono format, e.g. `%Y-%m-%d`.
    Date { format: &'static str },
    File {
        extnames: &'static [&'static str],
        max_size: u64,
    },
}

/// Constraint applied to a present value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    MaxLength(u64),
    Email,
    Url {
        protocols: &'static [&'static str],
        require_host: bool,
    },
    /// Value must not already exist in the given column.
    Unique { column: &'static str },
    /// Date must be strictly before today.
    BeforeToday,
}

impl Rule {
    /// Whether this rule can be evaluated on values of `kind`.
    pub fn applies_to(&self, kind: &FieldKind) -> bool {
        match self {
            Rule::MaxLength(_) | Rule::Email | Rule::Url { .. } | Rule::Unique { .. } => {
                matches!(kind, FieldKind::Text { .. })
            }
            Rule::BeforeToday => matches!(kind, FieldKind::Date { .. }),
        }
    }
}

/// One entry of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Human readable name used by default messages
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: &'static [Rule],
}

/// Field table plus custom messages keyed by `field.rule`.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
    pub messages: &'static [(&'static str, &'static str)],
}

impl Schema {
    /// Rules attached to a field whose kind cannot evaluate them.
    pub fn misplaced_rules(&self) -> Vec<(&'static str, Rule)> {
        self.fields
            .iter()
            .flat_map(|field| {
                field
                    .rules
                    .iter()
                    .filter(move |rule| !rule.applies_to(&field.kind))
                    .map(move |rule| (field.name, *rule))
            })
            .collect()
    }

    fn message_for(&self, field: &FieldSpec, rule: &str, options: &[(&str, String)]) -> String {
        let key = format!("{}.{}", field.name, rule);
        let template = self
            .messages
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| *m)
            .unwrap_or_else(|| default_message(rule));

        let mut params = vec![("label", field.label.to_string())];
        params.extend(options.iter().cloned());
        interpolate(template, &params)
    }
}

fn default_message(rule: &str) -> &'static str {
    match rule {
        "required" => "{{label}} is required.",
        "maxLength" => "{{label}} should be maximum of {{options.maxLength}} characters.",
        "email" => "{{label}} should be a valid email address",
        "url" => "{{label}} is not a valid URL",
        "unique" => "{{label}} is already taken",
        "date.format" => "{{label}} must be a valid date in {{options.format}} format",
        "before" => "{{label}} must be before '{{options.before}}'",
        "file.extname" => {
            "Invalid file extension {{options.extname}}. Only {{options.extnames}} are allowed"
        }
        "file.size" => "File size should be less than {{options.size}}",
        _ => "{{label}} is invalid",
    }
}

/// Replace `{{key}}` / `{{options.key}}` placeholders. Unknown placeholders
/// are left untouched.
pub fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        let placeholder = if *key == "label" {
            "{{label}}".to_string()
        } else {
            format!("{{{{options.{}}}}}", key)
        };
        out = out.replace(&placeholder, value);
    }
    out
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Ordered list of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<Violation>,
}

impl ValidationErrors {
    pub fn single(violation: Violation) -> Self {
        Self {
            errors: vec![violation],
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    /// Violations reported for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.errors.iter().filter(move |v| v.field == field)
    }
}

/// Sanitized value produced for a field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    File(UploadedFile),
}

/// Values that passed validation, keyed by field name. Only schema fields
/// ever appear here.
#[derive(Debug, Default)]
pub struct ValidatedValues {
    values: HashMap<&'static str, FieldValue>,
}

impl ValidatedValues {
    pub fn take_text(&mut self, name: &str) -> Option<String> {
        match self.values.remove(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn take_date(&mut self, name: &str) -> Option<NaiveDate> {
        match self.values.remove(name) {
            Some(FieldValue::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        match self.values.remove(name) {
            Some(FieldValue::File(f)) => Some(f),
            _ => None,
        }
    }
}

/// Existence lookup backing [`Rule::Unique`].
#[async_trait]
pub trait UniqueLookup: Send + Sync {
    /// Whether `value` is already stored in `column`, ignoring the record
    /// identified by `exclude_id`.
    async fn value_exists(
        &self,
        column: &str,
        value: &str,
        case_insensitive: bool,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError>;
}

/// Per-call validation inputs.
pub struct ValidationContext<'a> {
    pub today: NaiveDate,
    /// Record being updated, excluded from uniqueness checks
    pub exclude_id: Option<&'a str>,
    pub unique_case_insensitive: bool,
    pub lookup: &'a dyn UniqueLookup,
}

/// Validate `input` against `schema`.
///
/// Returns `AppError::Validation` listing every violation, or any error the
/// uniqueness lookup raised.
pub async fn validate(
    schema: &Schema,
    input: &RawInput,
    ctx: &ValidationContext<'_>,
) -> Result<ValidatedValues, AppError> {
    debug_assert!(
        schema.misplaced_rules().is_empty(),
        "schema rules do not fit their field kind: {:?}",
        schema.misplaced_rules()
    );

    let mut errors = ValidationErrors::default();
    let mut values = ValidatedValues::default();

    for field in schema.fields {
        let violation_count = errors.len();
        let value = match field.kind {
            FieldKind::Text { trim, escape } => {
                validate_text(schema, field, input, ctx, trim, escape, &mut errors).await?
            }
            FieldKind::Date { format } => {
                validate_date(schema, field, input, ctx, format, &mut errors)
            }
            FieldKind::File { extnames, max_size } => {
                validate_file(schema, field, input, extnames, max_size, &mut errors)
            }
        };

        if errors.len() == violation_count {
            if let Some(value) = value {
                values.values.insert(field.name, value);
            }
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn present(input: &RawInput, name: &str, trim: bool) -> Option<String> {
    let raw = input.field(name)?;
    let value = if trim { raw.trim() } else { raw };
    (!value.is_empty()).then(|| value.to_string())
}

fn missing(schema: &Schema, field: &FieldSpec, errors: &mut ValidationErrors) {
    if field.required {
        errors.push(Violation::new(
            field.name,
            "required",
            schema.message_for(field, "required", &[]),
        ));
    }
}

async fn validate_text(
    schema: &Schema,
    field: &FieldSpec,
    input: &RawInput,
    ctx: &ValidationContext<'_>,
    trim: bool,
    escape: bool,
    errors: &mut ValidationErrors,
) -> Result<Option<FieldValue>, AppError> {
    let Some(value) = present(input, field.name, trim) else {
        missing(schema, field, errors);
        return Ok(None);
    };

    let stored = if escape {
        escape_html(&value)
    } else {
        value.clone()
    };

    // Rules check what the client typed; `stored` is only persisted and used
    // for uniqueness, so escaping never counts toward `maxLength` and never
    // breaks an email address.
    for rule in field.rules {
        match *rule {
            Rule::MaxLength(max) => {
                if !value.validate_length(None, Some(max), None) {
                    errors.push(Violation::new(
                        field.name,
                        "maxLength",
                        schema.message_for(field, "maxLength", &[("maxLength", max.to_string())]),
                    ));
                }
            }
            Rule::Email => {
                if !value.validate_email() {
                    errors.push(Violation::new(
                        field.name,
                        "email",
                        schema.message_for(field, "email", &[]),
                    ));
                }
            }
            Rule::Url {
                protocols,
                require_host,
            } => {
                if !is_valid_url(&value, protocols, require_host) {
                    errors.push(Violation::new(
                        field.name,
                        "url",
                        schema.message_for(field, "url", &[]),
                    ));
                }
            }
            Rule::Unique { column } => {
                let taken = ctx
                    .lookup
                    .value_exists(column, &stored, ctx.unique_case_insensitive, ctx.exclude_id)
                    .await?;
                if taken {
                    errors.push(Violation::new(
                        field.name,
                        "unique",
                        schema.message_for(field, "unique", &[]),
                    ));
                }
            }
            // Date-only; `misplaced_rules` flags it on a text field.
            Rule::BeforeToday => {}
        }
    }

    Ok(Some(FieldValue::Text(stored)))
}

fn validate_date(
    schema: &Schema,
    field: &FieldSpec,
    input: &RawInput,
    ctx: &ValidationContext<'_>,
    format: &'static str,
    errors: &mut ValidationErrors,
) -> Option<FieldValue> {
    let Some(raw) = present(input, field.name, true) else {
        missing(schema, field, errors);
        return None;
    };

    // chrono accepts unpadded numbers; round-tripping enforces the exact form.
    let date = NaiveDate::parse_from_str(&raw, format)
        .ok()
        .filter(|d| d.format(format).to_string() == raw);

    let Some(date) = date else {
        errors.push(Violation::new(
            field.name,
            "date.format",
            schema.message_for(field, "date.format", &[("format", display_format(format))]),
        ));
        return None;
    };

    for rule in field.rules {
        if let Rule::BeforeToday = rule {
            if date >= ctx.today {
                errors.push(Violation::new(
                    field.name,
                    "before",
                    schema.message_for(field, "before", &[("before", "today".to_string())]),
                ));
            }
        }
    }

    Some(FieldValue::Date(date))
}

fn validate_file(
    schema: &Schema,
    field: &FieldSpec,
    input: &RawInput,
    extnames: &'static [&'static str],
    max_size: u64,
    errors: &mut ValidationErrors,
) -> Option<FieldValue> {
    let Some(file) = input.file(field.name) else {
        missing(schema, field, errors);
        return None;
    };

    let extname = file.extname();
    if !extnames.contains(&extname.as_str()) {
        errors.push(Violation::new(
            field.name,
            "file.extname",
            schema.message_for(
                field,
                "file.extname",
                &[("extname", extname.clone()), ("extnames", extnames.join(", "))],
            ),
        ));
    }

    if file.size() > max_size {
        errors.push(Violation::new(
            field.name,
            "file.size",
            schema.message_for(field, "file.size", &[("size", format_size(max_size))]),
        ));
    }

    Some(FieldValue::File(file.clone()))
}

fn is_valid_url(value: &str, protocols: &[&str], require_host: bool) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => {
            protocols.contains(&parsed.scheme())
                && (!require_host || parsed.host_str().is_some_and(|h| !h.is_empty()))
        }
        Err(_) => false,
    }
}

/// Escape HTML special characters the way form sanitizers usually do.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}

/// Render a chrono format the way clients write it (`yyyy-MM-dd`).
fn display_format(format: &str) -> String {
    format
        .replace("%Y", "yyyy")
        .replace("%m", "MM")
        .replace("%d", "dd")
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{}MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{}B", bytes)
    }
}
