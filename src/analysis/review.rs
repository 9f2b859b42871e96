//! Corrections made after a run: fixing categories, discarding false
//! detections and adding items the detector missed.

use anyhow::{anyhow, Context, Result};

use crate::calibration::CalibrationSession;
use crate::db::Database;
use crate::ergonomics::{analyze, AnalysisResult, ErgonomicRule};
use crate::models::{DetectedItem, Handedness, ItemCategory, Point2, Size2};
use crate::settings::ScoringSettings;

use super::events::AnalysisReport;

#[derive(Debug, Clone)]
struct ReviewedItem {
    item: DetectedItem,
    deleted: bool,
}

/// Editable copy of a scan's items in desk-frame centimeters.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    scan_id: i64,
    items: Vec<ReviewedItem>,
}

impl ReviewSession {
    pub fn new(scan_id: i64, items: Vec<DetectedItem>) -> Self {
        Self {
            scan_id,
            items: items
                .into_iter()
                .map(|item| ReviewedItem {
                    item,
                    deleted: false,
                })
                .collect(),
        }
    }

    pub fn from_report(report: &AnalysisReport) -> Self {
        Self::new(report.scan_id, report.items.clone())
    }

    pub async fn load(db: &Database, scan_id: i64) -> Result<Self> {
        let items = db
            .load_detected_items(scan_id)
            .await
            .with_context(|| format!("failed to load items of scan {scan_id}"))?;
        Ok(Self::new(scan_id, items))
    }

    pub fn scan_id(&self) -> i64 {
        self.scan_id
    }

    /// Items that have not been marked as deleted.
    pub fn active_items(&self) -> Vec<DetectedItem> {
        self.items
            .iter()
            .filter(|reviewed| !reviewed.deleted)
            .map(|reviewed| reviewed.item.clone())
            .collect()
    }

    pub fn reassign(&mut self, item_id: &str, category: ItemCategory) -> Result<()> {
        self.find_mut(item_id)?.item.category = category;
        Ok(())
    }

    pub fn mark_deleted(&mut self, item_id: &str) -> Result<()> {
        self.find_mut(item_id)?.deleted = true;
        Ok(())
    }

    pub fn restore(&mut self, item_id: &str) -> Result<()> {
        self.find_mut(item_id)?.deleted = false;
        Ok(())
    }

    /// Add an item the detector missed, already in desk-frame centimeters.
    /// Returns the new item's id.
    pub fn add_manual_item(&mut self, category: ItemCategory, center: Point2, size: Size2) -> String {
        let item = DetectedItem::manual(category, center, size);
        let id = item.id.clone();
        self.items.push(ReviewedItem {
            item,
            deleted: false,
        });
        id
    }

    /// Add an item placed on the photo, converting pixels through the
    /// calibration.
    pub fn add_manual_item_at_pixels(
        &mut self,
        session: &CalibrationSession,
        category: ItemCategory,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<String> {
        let center = session.transform_to_desk_frame(x, y)?;
        let size = Size2::new(
            session.pixels_to_units(width).unwrap_or_default(),
            session.pixels_to_units(height).unwrap_or_default(),
        );
        Ok(self.add_manual_item(category, center, size))
    }

    pub fn reanalyze(
        &self,
        rules: &[ErgonomicRule],
        handedness: Handedness,
        scoring: &ScoringSettings,
    ) -> AnalysisResult {
        analyze(&self.active_items(), rules, handedness, scoring)
    }

    /// Write the reviewed items back to the scan.
    pub async fn persist(&self, db: &Database) -> Result<()> {
        let (deleted, kept): (Vec<_>, Vec<_>) =
            self.items.iter().cloned().partition(|reviewed| reviewed.deleted);
        db.replace_detected_items(
            self.scan_id,
            kept.into_iter().map(|reviewed| reviewed.item).collect(),
            deleted.into_iter().map(|reviewed| reviewed.item).collect(),
        )
        .await
        .with_context(|| format!("failed to save review of scan {}", self.scan_id))
    }

    fn find_mut(&mut self, item_id: &str) -> Result<&mut ReviewedItem> {
        self.items
            .iter_mut()
            .find(|reviewed| reviewed.item.id == item_id)
            .ok_or_else(|| anyhow!("no item with id {item_id} in scan {}", self.scan_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::ergonomics::built_in_rules;
    use crate::models::{Provenance, Role};

    fn make_session() -> (ReviewSession, String, String) {
        let keyboard = DetectedItem::manual(
            ItemCategory::Keyboard,
            Point2::new(5.0, 0.0),
            Size2::new(30.0, 10.0),
        );
        let cup = DetectedItem::manual(ItemCategory::Cup, Point2::new(0.0, 30.0), Size2::new(8.0, 8.0));
        let ids = (keyboard.id.clone(), cup.id.clone());
        (ReviewSession::new(1, vec![keyboard, cup]), ids.0, ids.1)
    }

    #[test]
    fn deleting_an_item_removes_its_violation() {
        let (mut session, keyboard_id, _) = make_session();
        let rules = built_in_rules(Role::Coder);
        let scoring = ScoringSettings::default();

        assert_eq!(session.reanalyze(&rules, Handedness::Right, &scoring).score, 0.0);
        session.mark_deleted(&keyboard_id).unwrap();
        assert_eq!(session.reanalyze(&rules, Handedness::Right, &scoring).score, 100.0);
        session.restore(&keyboard_id).unwrap();
        assert_eq!(session.active_items().len(), 2);
    }

    #[test]
    fn reassigning_changes_which_rules_apply() {
        let (mut session, keyboard_id, _) = make_session();
        session.reassign(&keyboard_id, ItemCategory::Speaker).unwrap();
        let result = session.reanalyze(
            &built_in_rules(Role::Coder),
            Handedness::Right,
            &ScoringSettings::default(),
        );
        assert!(result.violations.is_empty());
        assert!(session.reassign("missing", ItemCategory::Pen).is_err());
    }

    #[test]
    fn manual_items_from_pixels_use_calibration() {
        let (mut session, _, _) = make_session();
        let mut calibration = CalibrationSession::default();
        for (x, y) in [(0.0, 0.0), (85.0, 0.0), (85.0, 54.0), (0.0, 54.0)] {
            calibration.add_calibration_point(x, y).unwrap();
        }
        calibration.compute_scale().unwrap();
        assert!(session
            .add_manual_item_at_pixels(&calibration, ItemCategory::Lamp, 10.0, 10.0, 50.0, 50.0)
            .is_err());

        for (x, y) in [(0.0, 0.0), (1000.0, 0.0), (1000.0, 600.0), (0.0, 600.0)] {
            calibration.add_desk_corner(x, y).unwrap();
        }
        let id = session
            .add_manual_item_at_pixels(&calibration, ItemCategory::Lamp, 900.0, 300.0, 50.0, 50.0)
            .unwrap();
        let lamp = session
            .active_items()
            .into_iter()
            .find(|item| item.id == id)
            .unwrap();
        assert_eq!(lamp.provenance, Provenance::Manual);
        assert_eq!(lamp.confidence, 1.0);
        assert!((lamp.center.x - 40.0).abs() < 1e-9);
        assert!((lamp.size.width - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn persisted_review_reloads_without_deleted_items() {
        let db = temp_database();
        let (session, keyboard_id, cup_id) = make_session();
        let scan_id = db
            .save_scan_with_items(None, "desk.jpg".into(), Some(10.0), None, session.active_items())
            .await
            .unwrap();

        let mut review = ReviewSession::load(&db, scan_id).await.unwrap();
        review.mark_deleted(&cup_id).unwrap();
        review.reassign(&keyboard_id, ItemCategory::Laptop).unwrap();
        review.persist(&db).await.unwrap();

        let reloaded = ReviewSession::load(&db, scan_id).await.unwrap();
        let items = reloaded.active_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, ItemCategory::Laptop);
    }
}
