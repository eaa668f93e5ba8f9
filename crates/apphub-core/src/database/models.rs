use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::manifest::Platform;

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// A logical application. Looked up by `(bundle_id, platform)`; only the
/// public `alias` is unique at the storage layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct App {
    pub id: i64,
    pub alias: String,
    pub name: String,
    pub platform: Platform,
    pub bundle_id: String,
}

impl FromRow for App {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(App {
            id: row.get("id")?,
            alias: row.get("alias")?,
            name: row.get("name")?,
            platform: row.get("platform")?,
            bundle_id: row.get("bundle_id")?,
        })
    }
}

/// One release of an app, unique per `(version, app_id)`. `sort_key` is a
/// unix-seconds creation stamp used only for display ordering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    pub id: i64,
    pub version: String,
    pub app_id: i64,
    pub android_version_code: Option<String>,
    pub android_version_name: Option<String>,
    pub ios_short_version: Option<String>,
    pub ios_bundle_version: Option<String>,
    pub sort_key: i64,
    pub remark: String,
}

impl FromRow for Version {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Version {
            id: row.get("id")?,
            version: row.get("version")?,
            app_id: row.get("app_id")?,
            android_version_code: row.get("android_version_code")?,
            android_version_name: row.get("android_version_name")?,
            ios_short_version: row.get("ios_short_version")?,
            ios_bundle_version: row.get("ios_bundle_version")?,
            sort_key: row.get("sort_key")?,
            remark: row.get("remark")?,
        })
    }
}

/// One uploaded build artifact. The id is supplied by the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Package {
    pub id: String,
    pub version_id: i64,
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub remark: String,
}

impl FromRow for Package {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Package {
            id: row.get("id")?,
            version_id: row.get("version_id")?,
            name: row.get("name")?,
            size: row.get("size")?,
            created_at: row.get("created_at")?,
            remark: row.get("remark")?,
        })
    }
}

/// Minimal app listing projection over the `simple_app` view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleApp {
    pub id: i64,
    pub alias: String,
    pub name: String,
}

impl FromRow for SimpleApp {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SimpleApp {
            id: row.get("id")?,
            alias: row.get("alias")?,
            name: row.get("name")?,
        })
    }
}

/// Version projection over the `detail_version` view: the version row plus
/// the number of packages uploaded for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetailVersion {
    pub id: i64,
    pub version: String,
    pub app_id: i64,
    pub android_version_code: Option<String>,
    pub android_version_name: Option<String>,
    pub ios_short_version: Option<String>,
    pub ios_bundle_version: Option<String>,
    pub sort_key: i64,
    pub remark: String,
    pub package_count: i64,
}

impl FromRow for DetailVersion {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(DetailVersion {
            id: row.get("id")?,
            version: row.get("version")?,
            app_id: row.get("app_id")?,
            android_version_code: row.get("android_version_code")?,
            android_version_name: row.get("android_version_name")?,
            ios_short_version: row.get("ios_short_version")?,
            ios_bundle_version: row.get("ios_bundle_version")?,
            sort_key: row.get("sort_key")?,
            remark: row.get("remark")?,
            package_count: row.get("package_count")?,
        })
    }
}
