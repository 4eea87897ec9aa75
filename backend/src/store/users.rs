use super::filter::Page;
use super::records::{NewUser, UserUpdate};
use super::{conflict_on_unique, Database, UserStore};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use common::model::organization::Organization;
use common::model::user::User;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const USERNAME_TAKEN: &str =
    "username sudah terdaftar, silahkan menggunakan username lain";

const COLUMNS: &str = "id, name, username, password, role, organization_id, province, \
    regency, retry_attempts, created_at, updated_at";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        organization_id: row.get(5)?,
        province: row.get(6)?,
        regency: row.get(7)?,
        retry_attempts: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn find_active(conn: &Connection, id: i64) -> AppResult<User> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::not_found("user"))
}

fn name_pattern(search: &str) -> String {
    format!("%{}%", search.trim())
}

/// Accounts in the `users` table. Usernames are unique among active rows
/// only, so a deleted account's username can be registered again.
impl UserStore for Database {
    fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.with_conn(|conn| match find_active(conn, id) {
            Ok(user) => Ok(Some(user)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        })
    }

    fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {COLUMNS} FROM users WHERE username = ?1 AND deleted_at IS NULL"
                    ),
                    params![username],
                    user_from_row,
                )
                .optional()?)
        })
    }

    fn create(&self, new: &NewUser) -> AppResult<User> {
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO users (name, username, password, role, organization_id, province, \
                 regency, retry_attempts, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
                params![
                    new.name,
                    new.username,
                    new.password_hash,
                    new.role,
                    new.organization_id,
                    new.province,
                    new.regency,
                    now
                ],
            )
            .map_err(|e| conflict_on_unique(e, USERNAME_TAKEN))?;
            find_active(conn, conn.last_insert_rowid())
        })
    }

    fn update(&self, id: i64, update: &UserUpdate) -> AppResult<User> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET name = ?1, role = ?2, password = COALESCE(?3, password), \
                 retry_attempts = ?4, updated_at = ?5 WHERE id = ?6 AND deleted_at IS NULL",
                params![
                    update.name,
                    update.role,
                    update.password_hash,
                    update.retry_attempts,
                    Utc::now(),
                    id
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("user"));
            }
            find_active(conn, id)
        })
    }

    /// Writes the lockout counter. Deleted accounts are not filtered out; the
    /// caller has just read the row.
    fn set_retry_attempts(&self, id: i64, attempts: i64) -> AppResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET retry_attempts = ?1 WHERE id = ?2",
                params![attempts, id],
            )?;
            Ok(())
        })
    }

    fn soft_delete(&self, id: i64) -> AppResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                params![Utc::now(), id],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("user"));
            }
            Ok(())
        })
    }

    fn list(&self, search: &str, page: Page) -> AppResult<Vec<User>> {
        let (limit, offset) = page.limit_offset();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL AND name LIKE ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(params![name_pattern(search), limit, offset], user_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn count(&self, search: &str) -> AppResult<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND name LIKE ?1",
                params![name_pattern(search)],
                |row| row.get(0),
            )?)
        })
    }

    fn organizations(&self) -> AppResult<Vec<Organization>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, updated_at, deleted_at FROM organizations \
                 WHERE deleted_at IS NULL ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Organization {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                    deleted_at: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::seed_organizations;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "Budi".into(),
            username: username.into(),
            password_hash: "hash".into(),
            role: "STAFF-LAPANGAN".into(),
            organization_id: 2,
            province: "JAWA BARAT".into(),
            regency: "KOTA BANDUNG".into(),
        }
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create(&new_user("budi")).unwrap();
        match db.create(&new_user("budi")) {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, USERNAME_TAKEN),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn update_keeps_password_without_new_hash() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create(&new_user("budi")).unwrap();
        let updated = db
            .update(
                user.id,
                &UserUpdate {
                    name: "Budi S".into(),
                    role: user.role.clone(),
                    password_hash: None,
                    retry_attempts: 0,
                },
            )
            .unwrap();
        assert_eq!(updated.password, "hash");
        assert_eq!(updated.name, "Budi S");
    }

    #[test]
    fn deleted_users_disappear() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create(&new_user("budi")).unwrap();
        UserStore::soft_delete(&db, user.id).unwrap();
        assert!(db.find_by_username("budi").unwrap().is_none());
        assert_eq!(UserStore::count(&db, "").unwrap(), 0);
        db.create(&new_user("budi")).unwrap();
    }

    #[test]
    fn user_keeps_its_organization() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create(&new_user("budi")).unwrap();
        assert_eq!(user.organization_id, 2);
        let found = db.find_by_username("budi").unwrap().unwrap();
        assert_eq!(found.organization_id, 2);
    }

    #[test]
    fn organizations_skip_deleted_rows() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.organizations().unwrap().is_empty());
        seed_organizations(&db);

        let names: Vec<_> = db
            .organizations()
            .unwrap()
            .into_iter()
            .map(|o| (o.id, o.name))
            .collect();
        assert_eq!(
            names,
            vec![(1, "EO NUSANTARA".to_string()), (2, "YAYASAN PEDULI".to_string())]
        );
    }
}
