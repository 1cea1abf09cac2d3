//! JSON wire helpers shared by the service records

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `google.protobuf.Empty`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Optional int64 fields
///
/// The JSON mapping encodes 64-bit integers as strings, but some endpoints
/// (and hand-written fixtures) send plain numbers, so both are accepted.
pub mod int64 {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_str(&n.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Number(n)) => Ok(Some(n)),
            Some(Repr::Text(s)) => s
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid int64 value '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pool {
        #[serde(default, with = "int64", skip_serializing_if = "Option::is_none")]
        replica_count: Option<i64>,
    }

    #[test]
    fn test_int64_accepts_strings_and_numbers() {
        let a: Pool = serde_json::from_str(r#"{"replica_count":"3"}"#).unwrap();
        let b: Pool = serde_json::from_str(r#"{"replica_count":3}"#).unwrap();
        let c: Pool = serde_json::from_str("{}").unwrap();
        assert_eq!(a.replica_count, Some(3));
        assert_eq!(b.replica_count, Some(3));
        assert_eq!(c.replica_count, None);
        assert!(serde_json::from_str::<Pool>(r#"{"replica_count":"three"}"#).is_err());
    }

    #[test]
    fn test_int64_serializes_as_string() {
        let pool = Pool {
            replica_count: Some(2),
        };
        assert_eq!(
            serde_json::to_string(&pool).unwrap(),
            r#"{"replica_count":"2"}"#
        );
    }
}
