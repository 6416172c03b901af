use async_trait::async_trait;
use contacts_api::error::AppError;
use contacts_api::validation::{escape_html, ContactValidator, RawInput, UniqueLookup};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Lookup that never finds a match, so only validation itself is measured.
struct NoMatches;

#[async_trait]
impl UniqueLookup for NoMatches {
    async fn value_exists(
        &self,
        _column: &str,
        _value: &str,
        _case_insensitive: bool,
        _exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        Ok(false)
    }
}

fn full_contact() -> RawInput {
    [
        ("firstName", "Ada"),
        ("surname", "Lovelace"),
        ("company", "Analytical Engines <Ltd>"),
        ("jobTitle", "Mathematician"),
        ("email1", "ada@example.com"),
        ("email2", "countess@example.org"),
        ("phoneNumber1", "+44 20 7946 0000"),
        ("country", "United Kingdom"),
        ("streetAddressLine1", "12 St James's Square"),
        ("city", "London"),
        ("postCode", "SW1Y 4JH"),
        ("birthday", "1815-12-10"),
        ("website", "https://example.com/ada"),
        ("notes", "Wrote the first published algorithm & more"),
    ]
    .into_iter()
    .collect()
}

fn benchmark_contact_validation(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime");
    let validator = ContactValidator::default();
    let valid = full_contact();
    let invalid: RawInput = [("email1", "nope"), ("birthday", "3000-01-01")]
        .into_iter()
        .collect();

    let mut group = c.benchmark_group("contact_validation");

    group.bench_function("valid_payload", |b| {
        b.iter(|| {
            runtime
                .block_on(validator.validate(black_box(&valid), &NoMatches, None))
                .is_ok()
        })
    });

    group.bench_function("invalid_payload", |b| {
        b.iter(|| {
            runtime
                .block_on(validator.validate(black_box(&invalid), &NoMatches, None))
                .is_err()
        })
    });

    group.finish();
}

fn benchmark_escape_html(c: &mut Criterion) {
    let text = "<p class=\"note\">Tom & Jerry's / notes</p>".repeat(20);
    c.bench_function("escape_html", |b| b.iter(|| escape_html(black_box(&text))));
}

criterion_group!(benches, benchmark_contact_validation, benchmark_escape_html);
criterion_main!(benches);
