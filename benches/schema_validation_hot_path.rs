//! Benchmarks the per-field validation loop a generated `validate_T` runs
//! (`spec.md` §4.8.3), isolated from parsing/serialization so it measures the
//! constraint checks themselves: string length, a compiled-once format regex, and
//! a numeric bound comparison, each on the hot path of every `POST`/`PUT` request.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use katana::validation::{format, ValidationError, ValidationErrorCode};

struct UserInput {
    name: String,
    email: String,
    age: i64,
}

fn validate_user(value: &UserInput) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if value.name.len() < 1 || value.name.len() > 64 {
        errors.push(ValidationError::new("name", ValidationErrorCode::StringTooLong));
    }

    if !format::is_valid_email(&value.email) {
        errors.push(ValidationError::new("email", ValidationErrorCode::InvalidEmailFormat));
    }

    if value.age < 0 {
        errors.push(ValidationError::new("age", ValidationErrorCode::ValueTooSmall).with_constraint(0.0));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn bench_validate_valid_payload(c: &mut Criterion) {
    let user = UserInput {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        age: 30,
    };
    c.bench_function("validate_user_valid", |b| {
        b.iter(|| black_box(validate_user(black_box(&user))))
    });
}

fn bench_validate_invalid_payload(c: &mut Criterion) {
    let user = UserInput {
        name: "Bob".to_string(),
        email: "not-an-email".to_string(),
        age: -5,
    };
    c.bench_function("validate_user_invalid", |b| {
        b.iter(|| black_box(validate_user(black_box(&user))))
    });
}

fn bench_email_format_check(c: &mut Criterion) {
    c.bench_function("is_valid_email", |b| {
        b.iter(|| black_box(format::is_valid_email(black_box("alice@example.com"))))
    });
}

criterion_group!(
    benches,
    bench_validate_valid_payload,
    bench_validate_invalid_payload,
    bench_email_format_check
);
criterion_main!(benches);
