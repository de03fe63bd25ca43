//! Schema of the `blog` collection: validation and coercion of raw frontmatter records.
//!
//! | Field         | Type                           | Required | Coercion / default        |
//! |---------------|--------------------------------|----------|---------------------------|
//! | `title`       | string                         | yes      |                           |
//! | `description` | string                         | yes      |                           |
//! | `pubDate`     | string or date                 | yes      | parsed into a date        |
//! | `updatedDate` | string or date                 | no       | parsed into a date        |
//! | `heroImage`   | string                         | no       |                           |
//! | `updates`     | sequence of `{date, message}`  | no       | defaults to empty         |
//!
//! Keys outside the schema are ignored. A key with a `null` value counts as absent.

use std::collections::HashSet;

use lazy_static::lazy_static;
use maplit::hashset;
use tracing::debug;

use crate::date::PostDate;
use crate::error::{FieldPath, ValidationError, ValidationErrors};
use crate::post::{PostFrontmatter, Update};
use crate::value::{RawFrontmatter, Value};

lazy_static! {
    static ref SCHEMA_FIELDS: HashSet<&'static str> = hashset! {
        "title",
        "description",
        "pubDate",
        "updatedDate",
        "heroImage",
        "updates",
    };
}

/// Validates a raw frontmatter record, stopping at the first issue in schema field order.
pub fn validate(raw: &RawFrontmatter) -> Result<PostFrontmatter, ValidationError> {
    validate_all(raw).map_err(ValidationErrors::into_first)
}

/// Validates a raw frontmatter record, reporting every issue found.
pub fn validate_all(raw: &RawFrontmatter) -> Result<PostFrontmatter, ValidationErrors> {
    for key in raw.keys().filter(|k| !SCHEMA_FIELDS.contains(k.as_str())) {
        debug!(key = key.as_str(), "ignoring field outside of the schema");
    }

    let root = FieldPath::root();
    let mut checker = Checker::default();

    // Evaluate all fields before combining them, so that every issue gets reported
    let title = checker.required_string(raw, &root, "title", false);
    let description = checker.required_string(raw, &root, "description", false);
    let pub_date = checker.required_date(raw, &root, "pubDate");
    let updated_date = checker.optional_date(raw, &root, "updatedDate");
    let hero_image = checker.optional_string(raw, &root, "heroImage");
    let updates = checker.updates(raw, &root, "updates");

    let record = (|| {
        Some(PostFrontmatter {
            title: title?,
            description: description?,
            pub_date: pub_date?,
            updated_date: updated_date?,
            hero_image: hero_image?,
            updates: updates?,
        })
    })();

    match (record, ValidationErrors::new(checker.errors)) {
        (_, Some(errors)) => Err(errors),
        (Some(record), None) => Ok(record),
        (None, None) => unreachable!("field rejected without a validation error"),
    }
}

/// Present and non-null value of a field.
fn lookup<'a>(fields: &'a RawFrontmatter, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn fail<T>(&mut self, error: ValidationError) -> Option<T> {
        self.errors.push(error);
        None
    }

    fn wrong_type<T>(&mut self, field: FieldPath, expected: &'static str, found: &Value) -> Option<T> {
        self.fail(ValidationError::WrongType {
            field,
            expected,
            found: found.kind(),
        })
    }

    /// `allow_empty` is false for fields that must carry text, like `title`.
    fn required_string(&mut self, fields: &RawFrontmatter, parent: &FieldPath, key: &str, allow_empty: bool) -> Option<String> {
        let path = parent.join(key);
        match lookup(fields, key) {
            None => self.fail(ValidationError::MissingField(path)),
            Some(Value::String(s)) if !allow_empty && s.trim().is_empty() => {
                self.fail(ValidationError::MissingField(path))
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => self.wrong_type(path, "string", other),
        }
    }

    /// Outer `None` on error, inner `None` when the field is absent.
    fn optional_string(&mut self, fields: &RawFrontmatter, parent: &FieldPath, key: &str) -> Option<Option<String>> {
        match lookup(fields, key) {
            None => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(other) => self.wrong_type(parent.join(key), "string", other),
        }
    }

    fn required_date(&mut self, fields: &RawFrontmatter, parent: &FieldPath, key: &str) -> Option<PostDate> {
        match lookup(fields, key) {
            None => self.fail(ValidationError::MissingField(parent.join(key))),
            Some(value) => self.date(value, parent.join(key)),
        }
    }

    fn optional_date(&mut self, fields: &RawFrontmatter, parent: &FieldPath, key: &str) -> Option<Option<PostDate>> {
        match lookup(fields, key) {
            None => Some(None),
            Some(value) => self.date(value, parent.join(key)).map(Some),
        }
    }

    /// Any value that doesn't denote a date, strings or not, is an invalid date.
    fn date(&mut self, value: &Value, path: FieldPath) -> Option<PostDate> {
        match value {
            Value::Date(date) => Some(*date),
            Value::String(s) => match PostDate::parse(s) {
                Some(date) => Some(date),
                None => self.fail(ValidationError::InvalidDate {
                    field: path,
                    value: s.clone(),
                }),
            },
            other => self.fail(ValidationError::InvalidDate {
                field: path,
                value: other.to_string(),
            }),
        }
    }

    fn updates(&mut self, fields: &RawFrontmatter, parent: &FieldPath, key: &str) -> Option<Vec<Update>> {
        let path = parent.join(key);
        match lookup(fields, key) {
            None => Some(Vec::new()),
            Some(Value::Sequence(items)) => {
                // Check every entry, even after a failure
                let updates = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.update(item, path.at(i)))
                    .collect::<Vec<_>>();
                updates.into_iter().collect()
            }
            Some(other) => self.wrong_type(path, "sequence", other),
        }
    }

    fn update(&mut self, item: &Value, path: FieldPath) -> Option<Update> {
        match item {
            Value::Mapping(fields) => {
                let date = self.required_date(fields, &path, "date");
                let message = self.required_string(fields, &path, "message", true);
                Some(Update {
                    date: date?,
                    message: message?,
                })
            }
            other => self.wrong_type(path, "mapping", other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::from_yaml_mapping;
    use chrono::NaiveDate;
    use indoc::indoc;

    fn raw(yaml: &str) -> RawFrontmatter {
        match serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap() {
            serde_yaml::Value::Mapping(map) => from_yaml_mapping(map),
            other => panic!("not a mapping: {:?}", other),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(name: &str) -> FieldPath {
        FieldPath::key(name)
    }

    #[test]
    fn test_minimal_post() {
        let fm = validate(&raw(r#"{title: "Sorting", description: "desc", pubDate: "2021-09-05"}"#)).unwrap();

        assert_eq!("Sorting", fm.title);
        assert_eq!("desc", fm.description);
        assert_eq!(ymd(2021, 9, 5), fm.pub_date.date());
        assert_eq!(None, fm.updated_date);
        assert_eq!(None, fm.hero_image);
        assert!(fm.updates.is_empty());
    }

    #[test]
    fn test_missing_title() {
        let err = validate(&raw(r#"{description: "desc", pubDate: "2021-09-05"}"#)).unwrap_err();
        assert_eq!(ValidationError::MissingField(key("title")), err);
    }

    #[test]
    fn test_empty_title_is_missing() {
        let err = validate(&raw(r#"{title: "  ", description: "desc", pubDate: "2021-09-05"}"#)).unwrap_err();
        assert_eq!(ValidationError::MissingField(key("title")), err);

        let err = validate(&raw(r#"{title: T, description: "", pubDate: 2021-09-05}"#)).unwrap_err();
        assert_eq!(ValidationError::MissingField(key("description")), err);
    }

    #[test]
    fn test_invalid_pub_date() {
        let err = validate(&raw(r#"{title: "T", description: "D", pubDate: "2021-13-40"}"#)).unwrap_err();
        assert_eq!(
            ValidationError::InvalidDate {
                field: key("pubDate"),
                value: "2021-13-40".to_string()
            },
            err
        );

        let err = validate(&raw(r#"{title: "T", description: "D", pubDate: "not-a-date"}"#)).unwrap_err();
        assert_eq!(&key("pubDate"), err.field());
    }

    #[test]
    fn test_non_string_pub_date() {
        let err = validate(&raw("{title: T, description: D, pubDate: 2021}")).unwrap_err();
        assert_eq!(
            ValidationError::InvalidDate {
                field: key("pubDate"),
                value: "2021".to_string()
            },
            err
        );
    }

    #[test]
    fn test_structured_dates() {
        let date = PostDate::from_ymd(2021, 9, 5).unwrap();
        let mut fields = raw("{title: T, description: D}");
        fields.insert("pubDate".into(), Value::Date(date));
        fields.insert("updatedDate".into(), Value::Date(date));

        let fm = validate(&fields).unwrap();
        assert_eq!(date, fm.pub_date);
        assert_eq!(Some(date), fm.updated_date);
    }

    #[test]
    fn test_updates() {
        let fm = validate(&raw(indoc! {r#"
            title: T
            description: D
            pubDate: 2021-01-01
            updatedDate: 2022-02-02
            updates:
              - date: 2023-04-16
                message: Changed paths
        "#}))
        .unwrap();

        assert_eq!(1, fm.updates.len());
        assert_eq!(ymd(2023, 4, 16), fm.updates[0].date.date());
        assert_eq!("Changed paths", fm.updates[0].message);
        assert_eq!(Some(ymd(2022, 2, 2)), fm.updated_date.map(|d| d.date()));
        assert_eq!(Some(ymd(2023, 4, 16)), fm.last_updated().map(|d| d.date()));
    }

    #[test]
    fn test_invalid_update_names_its_index() {
        let errors = validate_all(&raw(indoc! {r#"
            title: T
            description: D
            pubDate: 2021-01-01
            updates:
              - date: 2021-02-01
                message: first
              - date: 2021-03-01
                message: second
              - date: 2021-13-01
                message: third
        "#}))
        .unwrap_err();

        assert_eq!(1, errors.len());
        let field = errors.first().field();
        assert_eq!(Some(2), field.index());
        assert_eq!("updates[2].date", field.to_string());
    }

    #[test]
    fn test_malformed_updates() {
        let err = validate(&raw("{title: T, description: D, pubDate: 2021-01-01, updates: true}")).unwrap_err();
        assert_eq!(
            ValidationError::WrongType {
                field: key("updates"),
                expected: "sequence",
                found: "boolean"
            },
            err
        );

        let errors = validate_all(&raw(indoc! {r#"
            title: T
            description: D
            pubDate: 2021-01-01
            updates:
              - just a string
              - date: 2021-03-01
        "#}))
        .unwrap_err();

        let messages = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>();
        assert_eq!(
            vec![
                "updates[0]: expected mapping, found string",
                "updates[1].message: missing required field",
            ],
            messages
        );
    }

    #[test]
    fn test_update_message_may_be_empty() {
        let fm = validate(&raw(r#"{title: T, description: D, pubDate: 2021-01-01, updates: [{date: 2021-02-01, message: ""}]}"#)).unwrap();
        assert_eq!("", fm.updates[0].message);
    }

    #[test]
    fn test_hero_image_must_be_a_string() {
        let err = validate(&raw(r#"{title: "T", description: "D", pubDate: "2021-01-01", heroImage: 123}"#)).unwrap_err();
        assert_eq!(
            ValidationError::WrongType {
                field: key("heroImage"),
                expected: "string",
                found: "integer"
            },
            err
        );

        let fm = validate(&raw(r#"{title: "T", description: "D", pubDate: "2021-01-01", heroImage: "/hero.png"}"#)).unwrap();
        assert_eq!(Some("/hero.png"), fm.hero_image.as_deref());
    }

    #[test]
    fn test_title_must_be_a_string() {
        let err = validate(&raw("{title: 42, description: D, pubDate: 2021-01-01}")).unwrap_err();
        assert_eq!(
            ValidationError::WrongType {
                field: key("title"),
                expected: "string",
                found: "integer"
            },
            err
        );
    }

    #[test]
    fn test_null_optionals_are_absent() {
        let fm = validate(&raw("{title: T, description: D, pubDate: 2021-01-01, updatedDate: ~, heroImage: ~, updates: ~}")).unwrap();
        assert_eq!(None, fm.updated_date);
        assert_eq!(None, fm.hero_image);
        assert!(fm.updates.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let with_extra = raw("{title: T, description: D, pubDate: 2021-01-01, tags: [stats], draft: true}");
        let without = raw("{title: T, description: D, pubDate: 2021-01-01}");
        assert_eq!(validate(&without).unwrap(), validate(&with_extra).unwrap());
    }

    #[test]
    fn test_all_issues_are_reported_in_field_order() {
        let errors = validate_all(&raw("{description: 3, pubDate: someday, heroImage: [a]}")).unwrap_err();
        let fields = errors.iter().map(|e| e.field().to_string()).collect::<Vec<_>>();
        assert_eq!(vec!["title", "description", "pubDate", "heroImage"], fields);

        // `validate` stops at the first one
        let err = validate(&raw("{description: 3, pubDate: someday, heroImage: [a]}")).unwrap_err();
        assert_eq!(ValidationError::MissingField(key("title")), err);
    }

    #[test]
    fn test_revalidating_raw_form_is_identical() {
        let fm = validate(&raw(indoc! {r#"
            title: Sorting
            description: desc
            pubDate: 2021-09-05
            updatedDate: 2022-01-01T10:00:00+01:00
            heroImage: /sorting.png
            updates:
              - date: 2023-04-16
                message: Changed paths
        "#}))
        .unwrap();

        let again = validate(&fm.to_raw()).unwrap();
        assert_eq!(fm, again);
        assert_eq!(fm.to_raw(), again.to_raw());
    }

    #[test]
    fn test_revalidating_keeps_dates_beyond_year_9999() {
        let mut fields = raw("{title: T, description: D, updates: [{date: 2023-04-16, message: m}]}");
        fields.insert("pubDate".into(), PostDate::from_ymd(10000, 1, 1).unwrap().into());
        fields.insert("updatedDate".into(), PostDate::from_ymd(12021, 9, 5).unwrap().into());

        let fm = validate(&fields).unwrap();
        assert_eq!(PostDate::from_ymd(10000, 1, 1), Some(fm.pub_date));

        let again = validate(&fm.to_raw()).unwrap();
        assert_eq!(fm, again);
        assert_eq!(fm.to_raw(), again.to_raw());
    }
}
