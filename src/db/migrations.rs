use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, Transaction};

use crate::ergonomics::built_in_rules;
use crate::models::{ItemCategory, Role};

const CURRENT_SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)
            .with_context(|| format!("migration to version {next_version} failed"))?;
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    match version {
        1 => {
            tx.execute_batch(include_str!("schemas/schema_v1.sql"))
                .context("failed to execute schema_v1.sql")?;
            Ok(())
        }
        2 => seed_reference_data(tx).context("failed to seed categories and rules"),
        _ => bail!("unknown migration target version: {version}"),
    }
}

/// Categories and the built-in rule table, written once.
fn seed_reference_data(tx: &Transaction<'_>) -> Result<()> {
    let mut category_stmt =
        tx.prepare("INSERT INTO item_categories (slug, display_name) VALUES (?1, ?2)")?;
    for category in ItemCategory::ALL {
        category_stmt.execute(params![category.as_str(), category.display_name()])?;
    }

    let mut rule_stmt = tx.prepare(
        "INSERT INTO ergonomic_rules
         (role, item_slug, min_distance_cm, max_distance_cm, ideal_angle_degrees, priority, advice_text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for role in Role::ALL {
        for rule in built_in_rules(role) {
            rule_stmt.execute(params![
                role.as_str(),
                rule.category.as_str(),
                rule.min_distance_cm,
                rule.max_distance_cm,
                rule.ideal_angle_degrees,
                rule.priority.level(),
                rule.advice_text,
            ])?;
        }
    }

    Ok(())
}
