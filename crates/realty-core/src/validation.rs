use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{i18n, locale::Locale, text::fold};

/// One failed rule. `code` is an i18n key so the message can be rendered in
/// the visitor's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }

    pub fn message(&self, locale: Locale) -> &str {
        i18n::t(locale, &self.code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} ({})", e.field, e.code))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ]{7,20}$").unwrap();
    static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{3} ?[0-9]{2}$").unwrap();
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Collects field errors while a form is checked rule by rule.
#[derive(Debug, Default)]
pub struct Rules {
    errors: ValidationErrors,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, code: &str) -> &mut Self {
        // First failure per field wins.
        if !self.errors.has_field(field) {
            self.errors.push(FieldError::new(field, code));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "validation.required");
        }
        self
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            return self;
        }
        if len < min {
            self.fail(field, "validation.too_short");
        } else if len > max {
            self.fail(field, "validation.too_long");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() && (value.len() > 254 || !EMAIL_REGEX.is_match(value)) {
            self.fail(field, "validation.email");
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() && !PHONE_REGEX.is_match(value) {
            self.fail(field, "validation.phone");
        }
        self
    }

    pub fn postal_code(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() && !POSTAL_CODE_REGEX.is_match(value) {
            self.fail(field, "validation.postal_code");
        }
        self
    }

    pub fn slug(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !SLUG_REGEX.is_match(value) {
            self.fail(field, "validation.slug");
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if value.is_some_and(|v| v <= 0.0 || !v.is_finite()) {
            self.fail(field, "validation.positive");
        }
        self
    }

    pub fn range(&mut self, field: &str, min: Option<u64>, max: Option<u64>) -> &mut Self {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                self.fail(field, "validation.range");
            }
        }
        self
    }

    pub fn consent(&mut self, field: &str, given: bool) -> &mut Self {
        if !given {
            self.fail(field, "validation.consent");
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        std::mem::take(&mut self.errors).into_result()
    }
}

/// Turns a title into a URL slug: lowercase ASCII, digits and single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in fold(text).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.len() > 80 {
        slug.truncate(80);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_and_collapses() {
        assert_eq!(slugify("Slunný byt 3+kk, Praha 2"), "slunny-byt-3-kk-praha-2");
        assert_eq!(slugify("  --Vila u moře!! "), "vila-u-more");
        assert_eq!(slugify("???"), "");
        assert_eq!(slugify("Vila u mor\u{30C}e"), "vila-u-more");
        assert_eq!(slugify("Chata Łomnica"), "chata-lomnica");
    }

    #[test]
    fn rules_collect_first_error_per_field() {
        let result = Rules::new()
            .required("name", " ")
            .length("name", "", 2, 10)
            .email("email", "not-an-email")
            .phone("phone", "+420 777 123 456")
            .postal_code("postal_code", "12000")
            .finish();
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
    }

    #[test]
    fn optional_values_skip_shape_checks_when_blank() {
        assert!(Rules::new()
            .email("email", "")
            .phone("phone", "")
            .postal_code("postal_code", "")
            .positive("area", None)
            .finish()
            .is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        let errors = Rules::new()
            .phone("phone", "call me")
            .postal_code("postal_code", "1200")
            .slug("slug", "Bad Slug")
            .positive("area", Some(0.0))
            .range("price", Some(10), Some(1))
            .consent("consent", false)
            .finish()
            .unwrap_err();
        let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(
            codes,
            [
                "validation.phone",
                "validation.postal_code",
                "validation.slug",
                "validation.positive",
                "validation.range",
                "validation.consent",
            ]
        );
    }

    #[test]
    fn messages_are_localized() {
        let error = FieldError::new("email", "validation.email");
        assert_eq!(error.message(Locale::En), "Enter a valid e-mail address.");
        assert_eq!(error.message(Locale::Cs), "Zadejte platnou e-mailovou adresu.");
    }
}
