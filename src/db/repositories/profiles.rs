use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{parse_datetime, parse_handedness, parse_role},
    Database,
};
use crate::models::{validate_profile_name, Handedness, Profile, Role};

const ENABLE_LOGS: bool = true;

use crate::log_info;

fn row_to_profile(row: &Row) -> Result<Profile> {
    let role: String = row.get("role")?;
    let handedness: String = row.get("handedness")?;
    let created_at: String = row.get("created_at")?;

    Ok(Profile {
        id: row.get("id")?,
        name: row.get("name")?,
        role: parse_role(&role)?,
        handedness: parse_handedness(&handedness)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Create a profile. The name is trimmed and validated first.
    pub async fn create_profile(
        &self,
        name: &str,
        role: Role,
        handedness: Handedness,
    ) -> Result<Profile> {
        let name = validate_profile_name(name)?;
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO profiles (name, role, handedness, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, role.as_str(), handedness.as_str(), now.to_rfc3339()],
            )?;
            let profile = Profile {
                id: conn.last_insert_rowid(),
                name,
                role,
                handedness,
                created_at: now,
            };
            log_info!("Created profile '{}' (id {})", profile.name, profile.id);
            Ok(profile)
        })
        .await
    }

    pub async fn get_profile(&self, profile_id: i64) -> Result<Option<Profile>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, role, handedness, created_at FROM profiles WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![profile_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_profile(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Newest first.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, role, handedness, created_at
                 FROM profiles
                 ORDER BY created_at DESC, id DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut profiles = Vec::new();
            while let Some(row) = rows.next()? {
                profiles.push(row_to_profile(row)?);
            }
            Ok(profiles)
        })
        .await
    }

    pub async fn delete_profile(&self, profile_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let in_use: Option<i64> = conn
                .query_row(
                    "SELECT id FROM scans WHERE profile_id = ?1 LIMIT 1",
                    params![profile_id],
                    |row| row.get(0),
                )
                .optional()?;
            if in_use.is_some() {
                return Err(anyhow!("profile {profile_id} still has scans"));
            }
            let deleted = conn.execute("DELETE FROM profiles WHERE id = ?1", params![profile_id])?;
            if deleted == 0 {
                return Err(anyhow!("profile {profile_id} not found"));
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::temp_database;
    use crate::models::{Handedness, Role};

    #[tokio::test]
    async fn create_and_fetch_profile() {
        let db = temp_database();
        let created = db
            .create_profile("  Grace ", Role::Admin, Handedness::Left)
            .await
            .unwrap();
        assert_eq!(created.name, "Grace");

        let fetched = db.get_profile(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Admin);
        assert_eq!(fetched.handedness, Handedness::Left);
        assert!(db.get_profile(created.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_names_never_reach_the_database() {
        let db = temp_database();
        assert!(db
            .create_profile("", Role::Coder, Handedness::Right)
            .await
            .is_err());
        assert!(db.list_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_and_delete() {
        let db = temp_database();
        let first = db
            .create_profile("first", Role::Coder, Handedness::Right)
            .await
            .unwrap();
        db.create_profile("second", Role::Gamer, Handedness::Right)
            .await
            .unwrap();
        assert_eq!(db.list_profiles().await.unwrap().len(), 2);

        db.delete_profile(first.id).await.unwrap();
        assert!(db.delete_profile(first.id).await.is_err());
        assert_eq!(db.list_profiles().await.unwrap().len(), 1);
    }
}
