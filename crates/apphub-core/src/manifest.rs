use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Platform an uploaded build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Platform {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Platform {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            other => Err(FromSqlError::Other(
                format!("unknown platform: {other}").into(),
            )),
        }
    }
}

/// Parsed package manifest handed in by the upload layer.
///
/// Only the sub-version pair matching `platform` is meaningful; the other
/// pair stays `None`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppManifest {
    pub name: String,
    pub platform: Platform,
    pub bundle_id: String,
    pub android_version_name: Option<String>,
    pub android_version_code: Option<String>,
    pub ios_short_version: Option<String>,
    pub ios_bundle_version: Option<String>,
    pub size: u64,
}

impl AppManifest {
    /// Full display version, e.g. `1.2.3(45)`.
    pub fn full_version(&self) -> String {
        let (version, build) = match self.platform {
            Platform::Android => (&self.android_version_name, &self.android_version_code),
            Platform::Ios => (&self.ios_short_version, &self.ios_bundle_version),
        };
        format!(
            "{}({})",
            version.as_deref().unwrap_or_default(),
            build.as_deref().unwrap_or_default()
        )
    }
}
