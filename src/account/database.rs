//! SQLite storage for accounts, profiles and refresh tokens

use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

use super::models::{Profile, RefreshToken, User, UserSex, UserType};

/// Database connection wrapper
pub struct AccountDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl AccountDatabase {
    /// Create a new database connection and initialize tables
    pub fn new(path: &str) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// Initialize database tables
    ///
    /// Uniqueness of the login handle, the per-user profile and the per-user
    /// refresh token is enforced here with UNIQUE constraints, so concurrent
    /// read-then-write checks cannot leave duplicate rows behind.
    fn init_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_no INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                user_name TEXT NOT NULL,
                user_email TEXT NOT NULL,
                user_nickname TEXT NOT NULL,
                user_sex TEXT NOT NULL,
                user_phone TEXT NOT NULL,
                user_age INTEGER NOT NULL,
                user_type TEXT NOT NULL,
                mentor_profile TEXT,
                mentor_univ TEXT,
                mentor_class_num TEXT,
                mentor_major TEXT,
                mentor_intro TEXT,
                mentor_mbti TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                profile_no INTEGER PRIMARY KEY AUTOINCREMENT,
                user_no INTEGER UNIQUE NOT NULL,
                profile_img TEXT,
                univ TEXT,
                class_num TEXT,
                major TEXT,
                intro TEXT,
                mbti TEXT,
                FOREIGN KEY (user_no) REFERENCES users(user_no) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS refresh_tokens (
                token_no INTEGER PRIMARY KEY AUTOINCREMENT,
                user_no INTEGER UNIQUE NOT NULL,
                token TEXT UNIQUE NOT NULL,
                expiry_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_no) REFERENCES users(user_no) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_users_user_id ON users(user_id);
            CREATE INDEX IF NOT EXISTS idx_refresh_tokens_token ON refresh_tokens(token);
            "#,
        )?;

        Ok(())
    }

    // ==================== User Operations ====================

    /// Insert a new user; `user.user_no` is ignored, the assigned key is
    /// returned.
    pub fn create_user(&self, user: &User) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (user_id, password_hash, user_name, user_email, user_nickname,
                                user_sex, user_phone, user_age, user_type, mentor_profile,
                                mentor_univ, mentor_class_num, mentor_major, mentor_intro,
                                mentor_mbti, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                user.user_id,
                user.password_hash,
                user.user_name,
                user.user_email,
                user.user_nickname,
                user.user_sex.as_str(),
                user.user_phone,
                user.user_age,
                user.user_type.as_str(),
                user.mentor_profile,
                user.mentor_univ,
                user.mentor_class_num,
                user.mentor_major,
                user.mentor_intro,
                user.mentor_mbti,
                user.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Find user by login handle
    pub fn find_user_by_handle(&self, user_id: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"
        ))?;

        let mut rows = stmt.query(params![user_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Find user by surrogate key
    pub fn find_user_by_no(&self, user_no: i64) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_no = ?1"
        ))?;

        let mut rows = stmt.query(params![user_no])?;
        if let Some(row) = rows.next()? {
            Ok(Some(user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all users
    pub fn list_users(&self) -> SqliteResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_no"
        ))?;

        let mut users = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            users.push(user_from_row(row)?);
        }
        Ok(users)
    }

    // ==================== Profile Operations ====================

    /// Insert a mentor profile; at most one per user (UNIQUE on user_no).
    pub fn insert_profile(&self, profile: &Profile) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO profiles (user_no, profile_img, univ, class_num, major, intro, mbti)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.user_no,
                profile.profile_img,
                profile.univ,
                profile.class_num,
                profile.major,
                profile.intro,
                profile.mbti,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Find the profile belonging to a user
    pub fn find_profile_by_user(&self, user_no: i64) -> SqliteResult<Option<Profile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT profile_no, user_no, profile_img, univ, class_num, major, intro, mbti
             FROM profiles WHERE user_no = ?1",
        )?;

        let mut rows = stmt.query(params![user_no])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Profile {
                profile_no: row.get(0)?,
                user_no: row.get(1)?,
                profile_img: row.get(2)?,
                univ: row.get(3)?,
                class_num: row.get(4)?,
                major: row.get(5)?,
                intro: row.get(6)?,
                mbti: row.get(7)?,
            }))
        } else {
            Ok(None)
        }
    }

    // ==================== Refresh Token Operations ====================

    /// Insert or replace the refresh token row for a user in one statement,
    /// keeping at most one live row per account even under concurrent logins.
    pub fn upsert_refresh_token(
        &self,
        user_no: i64,
        token: &str,
        expiry_date: &str,
        created_at: &str,
    ) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO refresh_tokens (user_no, token, expiry_date, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_no) DO UPDATE SET
                 token = excluded.token,
                 expiry_date = excluded.expiry_date,
                 created_at = excluded.created_at",
            params![user_no, token, expiry_date, created_at],
        )?;
        Ok(())
    }

    /// Exact-match lookup by token string
    pub fn find_refresh_token(&self, token: &str) -> SqliteResult<Option<RefreshToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT token_no, user_no, token, expiry_date, created_at
             FROM refresh_tokens WHERE token = ?1",
        )?;

        let mut rows = stmt.query(params![token])?;
        if let Some(row) = rows.next()? {
            Ok(Some(refresh_token_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Find the refresh token row belonging to a user
    pub fn find_refresh_token_by_user(&self, user_no: i64) -> SqliteResult<Option<RefreshToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT token_no, user_no, token, expiry_date, created_at
             FROM refresh_tokens WHERE user_no = ?1",
        )?;

        let mut rows = stmt.query(params![user_no])?;
        if let Some(row) = rows.next()? {
            Ok(Some(refresh_token_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Delete by token string; returns the number of rows removed
    pub fn delete_refresh_token(&self, token: &str) -> SqliteResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM refresh_tokens WHERE token = ?1",
            params![token],
        )
    }
}

const USER_COLUMNS: &str = "user_no, user_id, password_hash, user_name, user_email, user_nickname, \
                            user_sex, user_phone, user_age, user_type, mentor_profile, mentor_univ, \
                            mentor_class_num, mentor_major, mentor_intro, mentor_mbti, created_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> SqliteResult<User> {
    let sex: String = row.get(6)?;
    let user_type: String = row.get(9)?;
    Ok(User {
        user_no: row.get(0)?,
        user_id: row.get(1)?,
        password_hash: row.get(2)?,
        user_name: row.get(3)?,
        user_email: row.get(4)?,
        user_nickname: row.get(5)?,
        user_sex: UserSex::from_str(&sex).unwrap_or(UserSex::Male),
        user_phone: row.get(7)?,
        user_age: row.get(8)?,
        user_type: UserType::from_str(&user_type).unwrap_or(UserType::Mentee),
        mentor_profile: row.get(10)?,
        mentor_univ: row.get(11)?,
        mentor_class_num: row.get(12)?,
        mentor_major: row.get(13)?,
        mentor_intro: row.get(14)?,
        mentor_mbti: row.get(15)?,
        created_at: row.get(16)?,
    })
}

fn refresh_token_from_row(row: &rusqlite::Row<'_>) -> SqliteResult<RefreshToken> {
    Ok(RefreshToken {
        token_no: row.get(0)?,
        user_no: row.get(1)?,
        token: row.get(2)?,
        expiry_date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Clone for AccountDatabase {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
