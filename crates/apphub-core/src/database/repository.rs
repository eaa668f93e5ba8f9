use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::{
    error::{AppHubError, ErrorContext},
    manifest::AppManifest,
    AppHubResult,
};

use super::{
    alias::{is_alias_unique_violation, MAX_ALIAS_ATTEMPTS},
    connection::Database,
    models::{App, DetailVersion, FromRow, Package, SimpleApp, Version},
};

impl Database {
    /// Returns the package with the given id, if it exists.
    pub fn get_package(&self, id: &str) -> AppHubResult<Option<Package>> {
        let conn = self.conn.lock()?;
        conn.query_row(
            "SELECT id, version_id, name, size, created_at, remark FROM package WHERE id = ?1",
            params![id],
            Package::from_row,
        )
        .optional()
        .with_context(|| format!("looking up package {id}"))
    }

    /// Files an uploaded build under its app and version, creating either
    /// on first sight, and records the package itself. The package id is
    /// chosen by the caller and must be unique; a collision surfaces as an
    /// error and is never retried.
    ///
    /// The three inserts commit independently. Concurrent first uploads of
    /// the same `(bundle_id, platform)` pair can therefore race into two
    /// app rows; see DESIGN.md.
    pub fn create_package(
        &self,
        manifest: &AppManifest,
        file_name: &str,
        version_remark: &str,
        package_remark: &str,
        package_id: &str,
    ) -> AppHubResult<Package> {
        let conn = self.conn.lock()?;

        let app = self.get_or_create_app(&conn, manifest)?;
        let version = self.get_or_create_version(&conn, manifest, app.id, version_remark)?;

        let package = Package {
            id: package_id.to_string(),
            version_id: version.id,
            name: file_name.to_string(),
            size: manifest.size,
            created_at: Utc::now(),
            remark: package_remark.to_string(),
        };
        conn.execute(
            "INSERT INTO package (id, version_id, name, size, created_at, remark)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                package.id,
                package.version_id,
                package.name,
                package.size,
                package.created_at,
                package.remark
            ],
        )
        .with_context(|| format!("inserting package {package_id}"))?;

        Ok(package)
    }

    /// Removes a package by id. Deleting an id that does not exist is not
    /// an error.
    pub fn delete_package(&self, id: &str) -> AppHubResult<()> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM package WHERE id = ?1", params![id])
            .with_context(|| format!("deleting package {id}"))?;
        Ok(())
    }

    /// Looks up an app by its public alias.
    pub fn get_app_by_alias(&self, alias: &str) -> AppHubResult<Option<SimpleApp>> {
        let conn = self.conn.lock()?;
        conn.query_row(
            "SELECT id, alias, name FROM simple_app WHERE alias = ?1",
            params![alias],
            SimpleApp::from_row,
        )
        .optional()
        .map_err(|err| AppHubError::Invariant {
            action: format!("looking up app by alias {alias}"),
            source: err,
        })
    }

    pub fn list_apps(&self) -> AppHubResult<Vec<SimpleApp>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT id, alias, name FROM simple_app ORDER BY id")?;
        let apps = stmt
            .query_map([], SimpleApp::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| "listing apps".to_string())?;
        Ok(apps)
    }

    /// Versions of an app, most recently created first.
    pub fn list_versions_for_app(&self, app_id: i64) -> AppHubResult<Vec<DetailVersion>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, version, app_id, android_version_code, android_version_name,
                    ios_short_version, ios_bundle_version, sort_key, remark, package_count
             FROM detail_version WHERE app_id = ?1 ORDER BY sort_key DESC",
        )?;
        let versions = stmt
            .query_map(params![app_id], DetailVersion::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("listing versions of app {app_id}"))?;
        Ok(versions)
    }

    pub fn get_version(&self, id: i64) -> AppHubResult<Option<DetailVersion>> {
        let conn = self.conn.lock()?;
        conn.query_row(
            "SELECT id, version, app_id, android_version_code, android_version_name,
                    ios_short_version, ios_bundle_version, sort_key, remark, package_count
             FROM detail_version WHERE id = ?1",
            params![id],
            DetailVersion::from_row,
        )
        .optional()
        .map_err(|err| AppHubError::Invariant {
            action: format!("looking up version {id}"),
            source: err,
        })
    }

    /// Packages uploaded for a version, most recent upload first.
    pub fn list_packages_for_version(&self, version_id: i64) -> AppHubResult<Vec<Package>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, version_id, name, size, created_at, remark
             FROM package WHERE version_id = ?1 ORDER BY created_at DESC",
        )?;
        let packages = stmt
            .query_map(params![version_id], Package::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("listing packages of version {version_id}"))?;
        Ok(packages)
    }

    fn get_or_create_app(&self, conn: &Connection, manifest: &AppManifest) -> AppHubResult<App> {
        let existing = conn
            .query_row(
                "SELECT id, alias, name, platform, bundle_id FROM app
                 WHERE bundle_id = ?1 AND platform = ?2",
                params![manifest.bundle_id, manifest.platform],
                App::from_row,
            )
            .optional()
            .with_context(|| format!("looking up app {}", manifest.bundle_id))?;

        match existing {
            Some(app) => Ok(app),
            None => self.create_app(conn, manifest),
        }
    }

    // Insert under a fresh alias, regenerating on alias collisions. Any
    // other failure aborts the loop.
    fn create_app(&self, conn: &Connection, manifest: &AppManifest) -> AppHubResult<App> {
        let mut aliases = self.aliases.lock()?;

        for _ in 0..MAX_ALIAS_ATTEMPTS {
            let alias = aliases.next_alias();
            let inserted = conn.execute(
                "INSERT INTO app (alias, name, platform, bundle_id) VALUES (?1, ?2, ?3, ?4)",
                params![alias, manifest.name, manifest.platform, manifest.bundle_id],
            );

            match inserted {
                Ok(_) => {
                    let app = App {
                        id: conn.last_insert_rowid(),
                        alias,
                        name: manifest.name.clone(),
                        platform: manifest.platform,
                        bundle_id: manifest.bundle_id.clone(),
                    };
                    debug!("created app {} with alias {}", app.bundle_id, app.alias);
                    return Ok(app);
                }
                Err(err) if is_alias_unique_violation(&err) => {
                    debug!("alias {alias} already taken, regenerating");
                }
                Err(err) => {
                    return Err(AppHubError::Database {
                        action: format!("inserting app {}", manifest.bundle_id),
                        source: err,
                    });
                }
            }
        }

        Err(AppHubError::AliasSpaceExhausted {
            attempts: MAX_ALIAS_ATTEMPTS,
        })
    }

    fn get_or_create_version(
        &self,
        conn: &Connection,
        manifest: &AppManifest,
        app_id: i64,
        remark: &str,
    ) -> AppHubResult<Version> {
        let full_version = manifest.full_version();
        let existing = conn
            .query_row(
                "SELECT id, version, app_id, android_version_code, android_version_name,
                        ios_short_version, ios_bundle_version, sort_key, remark
                 FROM version WHERE version = ?1 AND app_id = ?2",
                params![full_version, app_id],
                Version::from_row,
            )
            .optional()
            .with_context(|| format!("looking up version {full_version}"))?;

        // An existing version keeps the remark it was created with.
        if let Some(version) = existing {
            return Ok(version);
        }

        let version = Version {
            id: 0,
            version: full_version,
            app_id,
            android_version_code: manifest.android_version_code.clone(),
            android_version_name: manifest.android_version_name.clone(),
            ios_short_version: manifest.ios_short_version.clone(),
            ios_bundle_version: manifest.ios_bundle_version.clone(),
            sort_key: Utc::now().timestamp(),
            remark: remark.to_string(),
        };
        conn.execute(
            "INSERT INTO version (version, app_id, android_version_code, android_version_name,
                                  ios_short_version, ios_bundle_version, sort_key, remark)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                version.version,
                version.app_id,
                version.android_version_code,
                version.android_version_name,
                version.ios_short_version,
                version.ios_bundle_version,
                version.sort_key,
                version.remark
            ],
        )
        .with_context(|| format!("inserting version {}", version.version))?;

        debug!("created version {} for app {}", version.version, app_id);
        Ok(Version {
            id: conn.last_insert_rowid(),
            ..version
        })
    }
}
