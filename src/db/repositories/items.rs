use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{parse_category, parse_provenance, to_i64},
    Database,
};
use crate::models::{DetectedItem, Point2, Size2};

fn row_to_item(row: &Row) -> Result<DetectedItem> {
    let slug: String = row.get("item_slug")?;
    let provenance: String = row.get("provenance")?;

    Ok(DetectedItem {
        id: row.get("id")?,
        category: parse_category(&slug)?,
        center: Point2::new(row.get("x_pos")?, row.get("y_pos")?),
        size: Size2::new(row.get("width")?, row.get("height")?),
        confidence: row.get("confidence")?,
        rotation: row.get("rotation")?,
        provenance: parse_provenance(&provenance)?,
    })
}

/// Append `items` to a scan, continuing its position sequence.
pub(crate) fn insert_items(
    conn: &Connection,
    scan_id: i64,
    items: &[DetectedItem],
    is_correct: bool,
) -> Result<()> {
    let start: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM detected_items WHERE scan_id = ?1",
        params![scan_id],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO detected_items
         (scan_id, id, position, item_slug, x_pos, y_pos, width, height, rotation, confidence, provenance, is_correct)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for (offset, item) in items.iter().enumerate() {
        stmt.execute(params![
            scan_id,
            item.id,
            start + to_i64(offset)?,
            item.category.as_str(),
            item.center.x,
            item.center.y,
            item.size.width,
            item.size.height,
            item.rotation,
            item.confidence,
            item.provenance.as_str(),
            is_correct,
        ])
        .with_context(|| format!("failed to insert detected item {}", item.id))?;
    }
    Ok(())
}

impl Database {
    pub async fn save_detected_items(&self, scan_id: i64, items: Vec<DetectedItem>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            insert_items(&tx, scan_id, &items, true)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Items of a scan in insertion order. Items flagged as incorrect during
    /// review are left out.
    pub async fn load_detected_items(&self, scan_id: i64) -> Result<Vec<DetectedItem>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, item_slug, x_pos, y_pos, width, height, rotation, confidence, provenance
                 FROM detected_items
                 WHERE scan_id = ?1 AND is_correct = 1
                 ORDER BY position ASC",
            )?;
            let mut rows = stmt.query(params![scan_id])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(row_to_item(row)?);
            }
            Ok(items)
        })
        .await
    }

    /// Overwrite a scan's items with the reviewed set. `deleted` items are
    /// kept on record but flagged as incorrect.
    pub async fn replace_detected_items(
        &self,
        scan_id: i64,
        kept: Vec<DetectedItem>,
        deleted: Vec<DetectedItem>,
    ) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM detected_items WHERE scan_id = ?1",
                params![scan_id],
            )?;
            insert_items(&tx, scan_id, &kept, true)?;
            insert_items(&tx, scan_id, &deleted, false)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
