use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::db::{helpers::parse_datetime, Database};
use crate::models::{DetectedItem, Scan};

use super::items::insert_items;

const ENABLE_LOGS: bool = true;

use crate::log_info;

fn row_to_scan(row: &Row) -> Result<Scan> {
    let scanned_at: String = row.get("scanned_at")?;

    Ok(Scan {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        image_path: row.get("image_path")?,
        scale: row.get("scale")?,
        desk_bounds: row.get("desk_bounds")?,
        scanned_at: parse_datetime(&scanned_at, "scanned_at")?,
    })
}

fn insert_scan(
    conn: &Connection,
    profile_id: Option<i64>,
    image_path: &str,
    scale: Option<f64>,
    desk_bounds: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO scans (profile_id, image_path, scale, desk_bounds, scanned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            profile_id,
            image_path,
            scale,
            desk_bounds,
            Utc::now().to_rfc3339()
        ],
    )
    .context("failed to insert scan")?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Record a scan. `desk_bounds` is stored as given.
    pub async fn save_scan(
        &self,
        profile_id: Option<i64>,
        image_path: String,
        scale: Option<f64>,
        desk_bounds: Option<String>,
    ) -> Result<i64> {
        self.execute(move |conn| {
            insert_scan(conn, profile_id, &image_path, scale, desk_bounds.as_deref())
        })
        .await
    }

    /// Scan row and its items in one transaction; either both land or
    /// neither does.
    pub async fn save_scan_with_items(
        &self,
        profile_id: Option<i64>,
        image_path: String,
        scale: Option<f64>,
        desk_bounds: Option<String>,
        items: Vec<DetectedItem>,
    ) -> Result<i64> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let scan_id = insert_scan(&tx, profile_id, &image_path, scale, desk_bounds.as_deref())?;
            insert_items(&tx, scan_id, &items, true)?;
            tx.commit().context("failed to commit scan")?;
            log_info!("Saved scan {scan_id} with {} items", items.len());
            Ok(scan_id)
        })
        .await
    }

    pub async fn get_scan(&self, scan_id: i64) -> Result<Option<Scan>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, profile_id, image_path, scale, desk_bounds, scanned_at
                 FROM scans WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![scan_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_scan(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Newest first.
    pub async fn list_scans_for_profile(&self, profile_id: i64) -> Result<Vec<Scan>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, profile_id, image_path, scale, desk_bounds, scanned_at
                 FROM scans
                 WHERE profile_id = ?1
                 ORDER BY scanned_at DESC, id DESC",
            )?;
            let mut rows = stmt.query(params![profile_id])?;
            let mut scans = Vec::new();
            while let Some(row) = rows.next()? {
                scans.push(row_to_scan(row)?);
            }
            Ok(scans)
        })
        .await
    }
}
