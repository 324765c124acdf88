//! Uniform handling of localized and non-localized field values.
//!
//! A localized field stores a mapping from locale code to value; a
//! non-localized field stores the value directly. [`to_entries`] flattens
//! both into a sequence of [`LocalizedEntry`] and [`from_entries`] inverts it,
//! except for a localized `null`. Every other combinator here is defined in
//! terms of those two, so the `field.localized` check lives in exactly one
//! place.

use serde_json::{Map, Value};

use crate::error::{json_kind, TypeError, TypeResult};
use crate::schema::Field;

/// One (locale, value) pair of a field value. `locale` is `None` for
/// non-localized fields.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalizedEntry {
    pub locale: Option<String>,
    pub value: Value,
}

impl LocalizedEntry {
    pub fn new(locale: Option<String>, value: Value) -> Self {
        Self { locale, value }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

/// Split a field value into its per-locale entries.
///
/// Localized values iterate the locale mapping in its own order; `null`
/// yields no entries. Non-localized values yield a single entry.
pub fn to_entries(field: &Field, value: &Value) -> TypeResult<Vec<LocalizedEntry>> {
    if !field.localized {
        return Ok(vec![LocalizedEntry::new(None, value.clone())]);
    }
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(locale, v)| LocalizedEntry::new(Some(locale.clone()), v.clone()))
            .collect()),
        other => Err(TypeError::InvalidLocalizedValue {
            field: field.api_key.clone(),
            found: json_kind(other),
        }),
    }
}

/// Rebuild a field value from entries produced by [`to_entries`].
///
/// A localized field always comes back as a mapping: zero entries give
/// `{}`, so a `null` localized value does not survive the trip through
/// here. The `map` and `filter` combinators below keep `null` as `null`.
pub fn from_entries(field: &Field, entries: Vec<LocalizedEntry>) -> TypeResult<Value> {
    if !field.localized {
        return entries
            .into_iter()
            .next()
            .map(|entry| entry.value)
            .ok_or_else(|| TypeError::EmptyNonLocalizedEntries(field.api_key.clone()));
    }
    let mut map = Map::new();
    for entry in entries {
        let locale = entry
            .locale
            .ok_or_else(|| TypeError::MissingLocale(field.api_key.clone()))?;
        map.insert(locale, entry.value);
    }
    Ok(Value::Object(map))
}

/// [`from_entries`], except that a localized `null` stays `null`.
fn rebuild(field: &Field, original: &Value, entries: Vec<LocalizedEntry>) -> TypeResult<Value> {
    if field.localized && original.is_null() {
        return Ok(Value::Null);
    }
    from_entries(field, entries)
}

pub fn map_localized<F, E>(field: &Field, value: &Value, mut mapper: F) -> Result<Value, E>
where
    F: FnMut(Option<&str>, &Value) -> Result<Value, E>,
    E: From<TypeError>,
{
    let mut mapped = Vec::new();
    for entry in to_entries(field, value)? {
        let new_value = mapper(entry.locale(), &entry.value)?;
        mapped.push(LocalizedEntry::new(entry.locale, new_value));
    }
    Ok(rebuild(field, value, mapped)?)
}

pub async fn map_localized_async<F, E>(
    field: &Field,
    value: &Value,
    mut mapper: F,
) -> Result<Value, E>
where
    F: AsyncFnMut(Option<&str>, &Value) -> Result<Value, E>,
    E: From<TypeError>,
{
    let mut mapped = Vec::new();
    for entry in to_entries(field, value)? {
        let new_value = mapper(entry.locale(), &entry.value).await?;
        mapped.push(LocalizedEntry::new(entry.locale, new_value));
    }
    Ok(rebuild(field, value, mapped)?)
}

/// Keep only the entries accepted by `predicate`.
///
/// Rejecting the only entry of a non-localized field is an error, since
/// such a field cannot be represented with zero entries.
pub fn filter_localized<F, E>(field: &Field, value: &Value, mut predicate: F) -> Result<Value, E>
where
    F: FnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    let mut kept = Vec::new();
    for entry in to_entries(field, value)? {
        if predicate(entry.locale(), &entry.value)? {
            kept.push(entry);
        }
    }
    Ok(rebuild(field, value, kept)?)
}

pub async fn filter_localized_async<F, E>(
    field: &Field,
    value: &Value,
    mut predicate: F,
) -> Result<Value, E>
where
    F: AsyncFnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    let mut kept = Vec::new();
    for entry in to_entries(field, value)? {
        if predicate(entry.locale(), &entry.value).await? {
            kept.push(entry);
        }
    }
    Ok(rebuild(field, value, kept)?)
}

pub fn visit_localized<F, E>(field: &Field, value: &Value, mut visitor: F) -> Result<(), E>
where
    F: FnMut(Option<&str>, &Value) -> Result<(), E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        visitor(entry.locale(), &entry.value)?;
    }
    Ok(())
}

pub async fn visit_localized_async<F, E>(
    field: &Field,
    value: &Value,
    mut visitor: F,
) -> Result<(), E>
where
    F: AsyncFnMut(Option<&str>, &Value) -> Result<(), E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        visitor(entry.locale(), &entry.value).await?;
    }
    Ok(())
}

pub fn some_localized<F, E>(field: &Field, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        if predicate(entry.locale(), &entry.value)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub async fn some_localized_async<F, E>(
    field: &Field,
    value: &Value,
    mut predicate: F,
) -> Result<bool, E>
where
    F: AsyncFnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        if predicate(entry.locale(), &entry.value).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn every_localized<F, E>(field: &Field, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        if !predicate(entry.locale(), &entry.value)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub async fn every_localized_async<F, E>(
    field: &Field,
    value: &Value,
    mut predicate: F,
) -> Result<bool, E>
where
    F: AsyncFnMut(Option<&str>, &Value) -> Result<bool, E>,
    E: From<TypeError>,
{
    for entry in to_entries(field, value)? {
        if !predicate(entry.locale(), &entry.value).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use proptest::prelude::*;
    use serde_json::json;

    fn title() -> Field {
        Field::new("f1", "title", FieldType::String)
    }

    fn localized_title() -> Field {
        title().localized()
    }

    #[test]
    fn localized_round_trip_keeps_locale_order() {
        let field = localized_title();
        let value = json!({ "en": "a", "it": "b" });
        let entries = to_entries(&field, &value).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].locale(), Some("en"));
        assert_eq!(entries[1].locale(), Some("it"));
        assert_eq!(from_entries(&field, entries).unwrap(), value);
    }

    #[test]
    fn non_localized_round_trip_is_single_entry() {
        let field = title();
        let entries = to_entries(&field, &json!("a")).unwrap();
        assert_eq!(entries, vec![LocalizedEntry::new(None, json!("a"))]);
        assert_eq!(from_entries(&field, entries).unwrap(), json!("a"));
    }

    #[test]
    fn empty_non_localized_rebuild_is_an_error() {
        let err = from_entries(&title(), Vec::new()).unwrap_err();
        assert_eq!(err, TypeError::EmptyNonLocalizedEntries("title".into()));
        assert!(err.to_string().contains("at least one entry"));
    }

    #[test]
    fn empty_localized_rebuild_is_an_empty_mapping() {
        assert_eq!(from_entries(&localized_title(), Vec::new()).unwrap(), json!({}));
    }

    #[test]
    fn localized_null_has_no_entries() {
        assert!(to_entries(&localized_title(), &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn localized_null_stays_null_through_map_and_filter() {
        let field = localized_title();
        let mapped = map_localized::<_, TypeError>(&field, &Value::Null, |_, v| Ok(v.clone())).unwrap();
        assert_eq!(mapped, Value::Null);
        let filtered = filter_localized::<_, TypeError>(&field, &Value::Null, |_, _| Ok(true)).unwrap();
        assert_eq!(filtered, Value::Null);

        // an existing but emptied mapping is still a mapping
        let emptied = filter_localized::<_, TypeError>(&field, &json!({ "en": "a" }), |_, _| Ok(false)).unwrap();
        assert_eq!(emptied, json!({}));
    }

    #[tokio::test]
    async fn localized_null_stays_null_async() {
        let field = localized_title();
        let mapped = map_localized_async::<_, TypeError>(&field, &Value::Null, async |_, v| Ok(v.clone()))
            .await
            .unwrap();
        assert_eq!(mapped, Value::Null);
        let filtered = filter_localized_async::<_, TypeError>(&field, &Value::Null, async |_, _| Ok(true))
            .await
            .unwrap();
        assert_eq!(filtered, Value::Null);
    }

    #[test]
    fn localized_scalar_is_rejected() {
        let err = to_entries(&localized_title(), &json!("oops")).unwrap_err();
        assert!(matches!(err, TypeError::InvalidLocalizedValue { found: "string", .. }));
    }

    #[test]
    fn map_rewrites_every_locale() {
        let out = map_localized::<_, TypeError>(&localized_title(), &json!({ "en": "a", "it": "b" }), |locale, v| {
            Ok(json!(format!("{}:{}", locale.unwrap(), v.as_str().unwrap())))
        })
        .unwrap();
        assert_eq!(out, json!({ "en": "en:a", "it": "it:b" }));
    }

    #[test]
    fn filter_drops_locales() {
        let out = filter_localized::<_, TypeError>(&localized_title(), &json!({ "en": "a", "it": "b" }), |locale, _| {
            Ok(locale == Some("it"))
        })
        .unwrap();
        assert_eq!(out, json!({ "it": "b" }));
    }

    #[test]
    fn filter_rejecting_non_localized_value_fails() {
        let err = filter_localized::<_, TypeError>(&title(), &json!("a"), |_, _| Ok(false)).unwrap_err();
        assert!(matches!(err, TypeError::EmptyNonLocalizedEntries(_)));
    }

    #[test]
    fn some_and_every_short_circuit() {
        let field = localized_title();
        let value = json!({ "en": "a", "it": "b", "de": "c" });
        let mut calls = 0;
        let found = some_localized::<_, TypeError>(&field, &value, |_, v| {
            calls += 1;
            Ok(v == &json!("a"))
        })
        .unwrap();
        assert!(found);
        assert_eq!(calls, 1);

        calls = 0;
        let all = every_localized::<_, TypeError>(&field, &value, |_, v| {
            calls += 1;
            Ok(v != &json!("b"))
        })
        .unwrap();
        assert!(!all);
        assert_eq!(calls, 2);
    }

    #[test]
    fn callback_error_aborts_visit() {
        let mut seen = Vec::new();
        let err = visit_localized(&localized_title(), &json!({ "en": "a", "it": "b" }), |locale, _| {
            seen.push(locale.map(str::to_string));
            Err(TypeError::Serialization("stop".into()))
        })
        .unwrap_err();
        assert_eq!(err, TypeError::Serialization("stop".into()));
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn async_map_matches_sync_map() {
        let field = localized_title();
        let value = json!({ "en": "a", "it": "b" });
        let mut order = Vec::new();
        let out = map_localized_async::<_, TypeError>(&field, &value, async |locale, v| {
            order.push(locale.unwrap().to_string());
            Ok(json!(v.as_str().unwrap().to_uppercase()))
        })
        .await
        .unwrap();
        assert_eq!(out, json!({ "en": "A", "it": "B" }));
        assert_eq!(order, vec!["en", "it"]);
    }

    #[tokio::test]
    async fn async_predicates() {
        let field = localized_title();
        let value = json!({ "en": "a", "it": "b" });
        let some = some_localized_async::<_, TypeError>(&field, &value, async |_, v| Ok(v == &json!("b")))
            .await
            .unwrap();
        let every = every_localized_async::<_, TypeError>(&field, &value, async |_, v| Ok(v.is_string()))
            .await
            .unwrap();
        let filtered = filter_localized_async::<_, TypeError>(&field, &value, async |l, _| Ok(l == Some("en")))
            .await
            .unwrap();
        let mut visited = 0;
        visit_localized_async::<_, TypeError>(&field, &value, async |_, _| {
            visited += 1;
            Ok(())
        })
        .await
        .unwrap();
        assert!(some);
        assert!(every);
        assert_eq!(filtered, json!({ "en": "a" }));
        assert_eq!(visited, 2);
    }

    proptest! {
        #[test]
        fn localized_round_trip_holds(pairs in proptest::collection::btree_map("[a-z]{2}", "[a-z]{0,8}", 0..6)) {
            let field = localized_title();
            let value = Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect());
            let entries = to_entries(&field, &value).unwrap();
            prop_assert_eq!(from_entries(&field, entries).unwrap(), value);
        }

        #[test]
        fn non_localized_round_trip_holds(s in ".*") {
            let field = title();
            let value = Value::String(s);
            let entries = to_entries(&field, &value).unwrap();
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(from_entries(&field, entries).unwrap(), value);
        }
    }
}
