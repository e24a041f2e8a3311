//! Serialization utilities for common data types
//!
//! Reusable serde helpers shared by the configuration model and the API
//! payload types.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Custom serialization module for Duration as milliseconds
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use lookerkit_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     interval: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Deserialize an identifier the server may send either as a JSON string or
/// as a JSON number, normalizing it to a `String`.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

/// Optional variant of [`string_or_number`]; `null` and missing map to `None`.
pub fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Id>::deserialize(deserializer)?.map(|Id(id)| id))
}

/// Deserialize `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestStruct {
        #[serde(with = "duration_millis")]
        interval: Duration,
        name: String,
    }

    #[derive(Deserialize, Debug)]
    struct User {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        sudo: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        message: String,
    }

    /// Tests that milliseconds deserialize to Duration
    #[test]
    fn test_duration_millis_deserialize() {
        let json = r#"{"interval":2500,"name":"test"}"#;
        let data: TestStruct = serde_json::from_str(json).expect("Should deserialize valid JSON");

        assert_eq!(data.interval, Duration::from_millis(2500));
        assert_eq!(data.name, "test");
    }

    #[test]
    fn test_duration_millis_zero() {
        let data = TestStruct { interval: Duration::ZERO, name: "zero".to_string() };

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"interval\":0"));

        let deserialized: TestStruct = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.interval, Duration::ZERO);
    }

    #[test]
    fn test_duration_millis_deserialize_invalid_json() {
        let invalid_json = r#"{"interval":"not_a_number","name":"test"}"#;
        let result: Result<TestStruct, _> = serde_json::from_str(invalid_json);
        assert!(result.is_err());
    }

    #[test]
    fn test_string_or_number_accepts_both_forms() {
        let text: User = serde_json::from_str(r#"{"id":"10"}"#).unwrap();
        let number: User = serde_json::from_str(r#"{"id":10}"#).unwrap();

        assert_eq!(text.id, "10");
        assert_eq!(number.id, "10");
    }

    #[test]
    fn test_string_or_number_rejects_other_shapes() {
        let result: Result<User, _> = serde_json::from_str(r#"{"id":[1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_string_or_number() {
        let user: User = serde_json::from_str(r#"{"id":"1","sudo":7}"#).unwrap();
        assert_eq!(user.sudo.as_deref(), Some("7"));

        let user: User = serde_json::from_str(r#"{"id":"1","sudo":null}"#).unwrap();
        assert!(user.sudo.is_none());

        let user: User = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert!(user.sudo.is_none());
    }

    #[test]
    fn test_null_as_default() {
        let user: User = serde_json::from_str(r#"{"id":"1","message":null}"#).unwrap();
        assert_eq!(user.message, "");

        let user: User = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(user.message, "");
    }
}
