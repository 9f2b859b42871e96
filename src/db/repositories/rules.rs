use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_category, parse_priority, parse_role},
    Database,
};
use crate::ergonomics::ErgonomicRule;
use crate::models::Role;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

fn row_to_rule(row: &Row) -> Result<ErgonomicRule> {
    let role: String = row.get("role")?;
    let slug: String = row.get("item_slug")?;
    let priority: i64 = row.get("priority")?;

    Ok(ErgonomicRule {
        role: parse_role(&role)?,
        category: parse_category(&slug)?,
        min_distance_cm: row.get("min_distance_cm")?,
        max_distance_cm: row.get("max_distance_cm")?,
        ideal_angle_degrees: row.get("ideal_angle_degrees")?,
        priority: parse_priority(priority)?,
        advice_text: row.get("advice_text")?,
    })
}

impl Database {
    /// Rules for a role, highest priority first. The role name is matched
    /// case-insensitively; an unknown role has no rules.
    pub async fn rules_for_role(&self, role: &str) -> Result<Vec<ErgonomicRule>> {
        let role = match role.parse::<Role>() {
            Ok(role) => role,
            Err(err) => {
                log_warn!("{err}; no rules apply");
                return Ok(Vec::new());
            }
        };

        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT role, item_slug, min_distance_cm, max_distance_cm, ideal_angle_degrees, priority, advice_text
                 FROM ergonomic_rules
                 WHERE role = ?1
                 ORDER BY priority ASC, id ASC",
            )?;
            let mut rows = stmt.query(params![role.as_str()])?;
            let mut rules = Vec::new();
            while let Some(row) = rows.next()? {
                rules.push(row_to_rule(row)?);
            }
            Ok(rules)
        })
        .await
    }
}
