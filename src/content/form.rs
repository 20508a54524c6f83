//! Form submission decoding
//!
//! Turns `application/x-www-form-urlencoded` pairs into a [`ContentUpdate`].
//! Field names are either `name` or `section[field]`.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::error::FieldKeyError;

/// Decoded form body: field name to its first value
pub type FormSubmission = IndexMap<String, String>;

/// Per-section changes, in submission order
pub type ContentUpdate = IndexMap<String, SectionUpdate>;

/// Parsed form field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    /// `name`
    TopLevel(String),
    /// `section[field]`
    Nested { section: String, field: String },
}

/// What a submission does to one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    Scalar(String),
    Fields(IndexMap<String, String>),
}

/// Parse a form field name.
///
/// Exactly one bracket pair, closing the name, makes a nested key. Any
/// other use of `[` or `]` is rejected.
pub fn parse_field_key(key: &str) -> Result<FieldKey, FieldKeyError> {
    if key.is_empty() {
        return Err(FieldKeyError::new(key, "empty name"));
    }

    let (open, close) = match (key.find('['), key.find(']')) {
        (None, None) => return Ok(FieldKey::TopLevel(key.to_string())),
        (Some(_), None) => return Err(FieldKeyError::new(key, "unbalanced '['")),
        (None, Some(_)) => return Err(FieldKeyError::new(key, "unbalanced ']'")),
        (Some(open), Some(close)) => (open, close),
    };

    if close < open {
        return Err(FieldKeyError::new(key, "']' before '['"));
    }
    if key.matches('[').count() > 1 || key.matches(']').count() > 1 {
        return Err(FieldKeyError::new(key, "more than one bracket pair"));
    }
    if close != key.len() - 1 {
        return Err(FieldKeyError::new(key, "text after ']'"));
    }

    let section = &key[..open];
    let field = &key[open + 1..close];
    if section.is_empty() {
        return Err(FieldKeyError::new(key, "empty section"));
    }
    if field.is_empty() {
        return Err(FieldKeyError::new(key, "empty field"));
    }

    Ok(FieldKey::Nested {
        section: section.to_string(),
        field: field.to_string(),
    })
}

/// Decode a urlencoded body. A repeated name keeps its first value.
pub fn decode_form(body: &[u8]) -> FormSubmission {
    let mut submission = FormSubmission::new();
    for (key, value) in form_urlencoded::parse(body) {
        submission
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    submission
}

/// Group submitted pairs by section.
///
/// Fails on the first malformed name so that nothing is applied. When a
/// section is named twice the later pair wins: a scalar drops earlier
/// fields, and a field after a scalar starts a fresh field map.
pub fn build_update<I>(pairs: I) -> Result<ContentUpdate, FieldKeyError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut update = ContentUpdate::new();

    for (key, value) in pairs {
        match parse_field_key(&key)? {
            FieldKey::TopLevel(name) => {
                update.insert(name, SectionUpdate::Scalar(value));
            }
            FieldKey::Nested { section, field } => match update.entry(section) {
                Entry::Occupied(mut entry) => {
                    if let SectionUpdate::Fields(fields) = entry.get_mut() {
                        fields.insert(field, value);
                    } else {
                        entry.insert(SectionUpdate::Fields(IndexMap::from([(field, value)])));
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(SectionUpdate::Fields(IndexMap::from([(field, value)])));
                }
            },
        }
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(section: &str, field: &str) -> FieldKey {
        FieldKey::Nested {
            section: section.to_string(),
            field: field.to_string(),
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_top_level() {
        assert_eq!(
            parse_field_key("title").unwrap(),
            FieldKey::TopLevel("title".to_string())
        );
        assert_eq!(
            parse_field_key("site-name_2").unwrap(),
            FieldKey::TopLevel("site-name_2".to_string())
        );
    }

    #[test]
    fn test_parse_nested() {
        assert_eq!(parse_field_key("hero[title]").unwrap(), nested("hero", "title"));
        assert_eq!(
            parse_field_key("about us[main text]").unwrap(),
            nested("about us", "main text")
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let cases = [
            ("", "empty name"),
            ("hero[title", "unbalanced '['"),
            ("hero]title", "unbalanced ']'"),
            ("hero]x[", "']' before '['"),
            ("a[b]c[d]", "more than one bracket pair"),
            ("a[b][c]", "more than one bracket pair"),
            ("a[[b]", "more than one bracket pair"),
            ("hero[title]x", "text after ']'"),
            ("[title]", "empty section"),
            ("hero[]", "empty field"),
        ];
        for (key, reason) in cases {
            let err = parse_field_key(key).expect_err(key);
            assert_eq!(err.key, key);
            assert_eq!(err.reason, reason, "key {key:?}");
        }
    }

    #[test]
    fn test_error_message_names_key() {
        let err = parse_field_key("a[b").unwrap_err();
        assert_eq!(err.to_string(), "Malformed field name 'a[b': unbalanced '['");
    }

    #[test]
    fn test_decode_form() {
        let form = decode_form(b"hero%5Btitle%5D=Hello+World&footer=%C2%A9+2024&empty=");
        assert_eq!(form.get("hero[title]").map(String::as_str), Some("Hello World"));
        assert_eq!(form.get("footer").map(String::as_str), Some("© 2024"));
        assert_eq!(form.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_decode_form_first_value_wins() {
        let form = decode_form(b"a=1&a=2&b=3");
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_build_update_groups_sections() {
        let update = build_update(pairs(&[
            ("hero[title]", "T"),
            ("footer", "F"),
            ("hero[subtitle]", "S"),
        ]))
        .unwrap();

        assert_eq!(update.len(), 2);
        assert_eq!(
            update.get("hero"),
            Some(&SectionUpdate::Fields(IndexMap::from([
                ("title".to_string(), "T".to_string()),
                ("subtitle".to_string(), "S".to_string()),
            ])))
        );
        assert_eq!(
            update.get("footer"),
            Some(&SectionUpdate::Scalar("F".to_string()))
        );
    }

    #[test]
    fn test_build_update_later_key_wins() {
        let update = build_update(pairs(&[("hero[title]", "T"), ("hero", "flat")])).unwrap();
        assert_eq!(
            update.get("hero"),
            Some(&SectionUpdate::Scalar("flat".to_string()))
        );

        let update = build_update(pairs(&[("hero", "flat"), ("hero[title]", "T")])).unwrap();
        assert_eq!(
            update.get("hero"),
            Some(&SectionUpdate::Fields(IndexMap::from([(
                "title".to_string(),
                "T".to_string()
            )])))
        );
    }

    #[test]
    fn test_build_update_rejects_whole_submission() {
        let err = build_update(pairs(&[("ok", "1"), ("bad[", "2")])).unwrap_err();
        assert_eq!(err.key, "bad[");
    }
}
