use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::contract::model::{NewUser, User, UserUpdate};

/// REST DTO for user representation. Field names are the wire names clients already use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
}

/// Request body shared by create and update.
///
/// Decoding is lenient in the way existing clients rely on:
/// - keys match case-insensitively and the last occurrence wins;
/// - missing or `null` fields stay empty, a `null` body is an empty body;
/// - `ID` may be sent back but must be an integer and is then discarded;
/// - unknown fields are ignored, as is anything after the first JSON value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBody {
    pub name: String,
    pub email: String,
}

impl UserBody {
    /// Parse a raw request body; the `Content-Type` header is not consulted.
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let mut values = serde_json::Deserializer::from_slice(raw).into_iter::<Self>();
        match values.next() {
            Some(body) => body,
            None => Err(serde::de::Error::custom("empty body")),
        }
    }
}

impl<'de> Deserialize<'de> for UserBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UserBodyVisitor)
    }
}

struct UserBodyVisitor;

impl<'de> Visitor<'de> for UserBodyVisitor {
    type Value = UserBody;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object with Name and Email")
    }

    fn visit_unit<E: de::Error>(self) -> Result<UserBody, E> {
        Ok(UserBody::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<UserBody, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut body = UserBody::default();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("Name") {
                if let Some(name) = map.next_value::<Option<String>>()? {
                    body.name = name;
                }
            } else if key.eq_ignore_ascii_case("Email") {
                if let Some(email) = map.next_value::<Option<String>>()? {
                    body.email = email;
                }
            } else if key.eq_ignore_ascii_case("ID") {
                map.next_value::<Option<i64>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(body)
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<UserBody> for NewUser {
    fn from(body: UserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}

impl From<UserBody> for UserUpdate {
    fn from(body: UserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}
