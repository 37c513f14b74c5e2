use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who may read a post
///
/// Public posts appear in every listing; private posts are only ever shown
/// to their author. Stored as TEXT (`public` / `private`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// URL prefix under which posts of this visibility are routed
    pub fn url_prefix(&self) -> &'static str {
        match self {
            Visibility::Public => "",
            Visibility::Private => "/private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for Visibility {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse::<Visibility>()?)
    }
}

impl ToSql<Text, Sqlite> for Visibility {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_str_roundtrip() {
        for v in [Visibility::Public, Visibility::Private] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_visibility_is_rejected() {
        let err = "secret".parse::<Visibility>().unwrap_err();
        assert!(err.contains("secret"));
    }

    #[test]
    fn test_url_prefix() {
        assert_eq!(Visibility::Public.url_prefix(), "");
        assert_eq!(Visibility::Private.url_prefix(), "/private");
    }
}
