use crate::models::{DetectedItem, ItemCategory};

/// Collapse same-category detections that sit within `distance_threshold`
/// of a more confident detection.
///
/// Greedy per category: candidates are visited by descending confidence and
/// kept only if they are farther than the threshold from every item already
/// kept. Two weak detections can both survive next to a strong one if they
/// are far enough from it and from each other; this is not clustering.
///
/// Output is grouped by category, in order of each category's first
/// appearance in the input.
pub fn deduplicate(items: Vec<DetectedItem>, distance_threshold: f64) -> Vec<DetectedItem> {
    let mut groups: Vec<(ItemCategory, Vec<DetectedItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(category, _)| *category == item.category) {
            Some((_, members)) => members.push(item),
            None => groups.push((item.category, vec![item])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(_, members)| keep_most_confident(members, distance_threshold))
        .collect()
}

fn keep_most_confident(mut members: Vec<DetectedItem>, distance_threshold: f64) -> Vec<DetectedItem> {
    if members.len() < 2 {
        return members;
    }

    members.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectedItem> = Vec::with_capacity(members.len());
    for candidate in members {
        let isolated = kept
            .iter()
            .all(|existing| existing.center.distance_to(&candidate.center) > distance_threshold);
        if isolated {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point2, RawDetection};

    fn detection(category: ItemCategory, x: f64, y: f64, confidence: f64) -> DetectedItem {
        DetectedItem::from_detection(&RawDetection {
            category,
            x,
            y,
            width: 50.0,
            height: 50.0,
            confidence,
            rotation: 0.0,
        })
    }

    #[test]
    fn near_duplicates_collapse_to_most_confident() {
        let items = vec![
            detection(ItemCategory::Mouse, 520.0, 300.0, 0.71),
            detection(ItemCategory::Mouse, 500.0, 300.0, 0.93),
            detection(ItemCategory::Mouse, 560.0, 340.0, 0.65),
            detection(ItemCategory::Mouse, 900.0, 300.0, 0.40),
        ];
        let kept = deduplicate(items, 100.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.93);
        assert_eq!(kept[0].center, Point2::new(500.0, 300.0));
        assert_eq!(kept[1].confidence, 0.40);
    }

    #[test]
    fn different_categories_never_merge() {
        let items = vec![
            detection(ItemCategory::Keyboard, 200.0, 300.0, 0.9),
            detection(ItemCategory::Laptop, 205.0, 300.0, 0.8),
        ];
        assert_eq!(deduplicate(items, 100.0).len(), 2);
    }

    #[test]
    fn greedy_pass_keeps_two_items_bridged_by_a_third() {
        // The middle cup is absorbed by the strongest one; the far cup survives.
        let items = vec![
            detection(ItemCategory::Cup, 0.0, 0.0, 0.9),
            detection(ItemCategory::Cup, 150.0, 0.0, 0.8),
            detection(ItemCategory::Cup, 75.0, 0.0, 0.7),
        ];
        let kept = deduplicate(items, 100.0);
        let confidences: Vec<f64> = kept.iter().map(|item| item.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.8]);
    }

    #[test]
    fn distance_equal_to_threshold_is_a_duplicate() {
        let items = vec![
            detection(ItemCategory::Phone, 0.0, 0.0, 0.9),
            detection(ItemCategory::Phone, 100.0, 0.0, 0.8),
        ];
        assert_eq!(deduplicate(items, 100.0).len(), 1);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let items = vec![
            detection(ItemCategory::Monitor, 400.0, 150.0, 0.9),
            detection(ItemCategory::Keyboard, 200.0, 300.0, 0.8),
            detection(ItemCategory::Monitor, 1000.0, 150.0, 0.95),
        ];
        let categories: Vec<ItemCategory> = deduplicate(items, 100.0)
            .iter()
            .map(|item| item.category)
            .collect();
        assert_eq!(
            categories,
            vec![ItemCategory::Monitor, ItemCategory::Monitor, ItemCategory::Keyboard]
        );
    }
}
