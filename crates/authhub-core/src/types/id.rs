//! User identifiers.
//!
//! A user has two identifiers: the internal [`UserKey`] (database primary
//! key, carried inside tokens, never shown in API responses) and the public
//! [`ExternalId`] (`usr-` followed by 32 lowercase hex characters). When the
//! `sqlx` feature is enabled both types encode directly as PostgreSQL
//! columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Internal numeric key of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(pub i64);

impl UserKey {
    /// The raw key.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| AppError::validation(format!("Invalid user key: '{s}'")))
    }
}

impl From<i64> for UserKey {
    fn from(key: i64) -> Self {
        Self(key)
    }
}

/// Public identifier of a user: `usr-` + UUID v4 hex without hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Prefix shared by every external id.
    pub const PREFIX: &'static str = "usr-";

    const HEX_LEN: usize = 32;

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4().simple()))
    }

    /// Parse and validate an external id.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        let hex = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| AppError::validation(format!("Invalid external id: '{s}'")))?;
        let valid = hex.len() == Self::HEX_LEN
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(AppError::validation(format!("Invalid external id: '{s}'")));
        }
        Ok(Self(s.to_string()))
    }

    /// The standard hyphenated UUID this id was derived from.
    pub fn uuid(&self) -> Uuid {
        // `parse` and `generate` guarantee 32 hex digits after the prefix.
        Uuid::parse_str(&self.0[Self::PREFIX.len()..]).unwrap_or(Uuid::nil())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExternalId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> String {
        id.0
    }
}

#[cfg(feature = "sqlx")]
mod sqlx_impls {
    use super::{ExternalId, UserKey};

    impl sqlx::Type<sqlx::Postgres> for UserKey {
        fn type_info() -> sqlx::postgres::PgTypeInfo {
            <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
        }
    }

    impl<'q> sqlx::Encode<'q, sqlx::Postgres> for UserKey {
        fn encode_by_ref(
            &self,
            buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
        ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
            <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for UserKey {
        fn decode(
            value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
        }
    }

    impl sqlx::Type<sqlx::Postgres> for ExternalId {
        fn type_info() -> sqlx::postgres::PgTypeInfo {
            <String as sqlx::Type<sqlx::Postgres>>::type_info()
        }

        fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
            <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
        }
    }

    impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ExternalId {
        fn encode_by_ref(
            &self,
            buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
        ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
            <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ExternalId {
        fn decode(
            value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            let raw = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
            Ok(ExternalId::parse(&raw)?)
        }
    }
}
