use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::entity::{
    Category, CategoryId, Item, ItemDraft, ItemId, Location, LocationId, User, UserId,
};
use crate::store::{EntityKind, EntityStore, StoreError};
use crate::validate::{join_errors, validate_draft, validate_entity_name};

/// SQLite-backed implementation of the EntityStore trait.
pub struct SqliteEntityStore {
    conn: Mutex<Connection>,
}

impl SqliteEntityStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0,
                created_by TEXT REFERENCES users(id),
                created INTEGER NOT NULL
            );

            -- Per-owner uniqueness. SQLite treats NULLs as distinct in
            -- unique indexes, so default categories (created_by IS NULL)
            -- need their own partial index.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_owner_name
                ON categories(name, created_by);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_default_name
                ON categories(name) WHERE created_by IS NULL;

            CREATE TABLE IF NOT EXISTS locations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                is_default INTEGER NOT NULL DEFAULT 0,
                created INTEGER NOT NULL
            );

            -- At most one row may carry is_default = 1.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_locations_default
                ON locations(is_default) WHERE is_default = 1;

            -- items.category and items.location are deliberately not
            -- foreign keys: deleting a category or location leaves a
            -- dangling reference that reads tolerate.
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                category TEXT NOT NULL,
                location TEXT,
                owner TEXT NOT NULL REFERENCES users(id),
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner);
            CREATE INDEX IF NOT EXISTS idx_items_location ON items(location);
            CREATE INDEX IF NOT EXISTS idx_categories_owner ON categories(created_by);
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Map a constraint violation on insert to DuplicateName; anything
    /// else is a storage error.
    fn map_insert_err(e: rusqlite::Error, kind: EntityKind, name: &str) -> StoreError {
        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                return StoreError::DuplicateName {
                    kind,
                    name: name.to_string(),
                };
            }
        }
        StoreError::Storage(format!("insert {}: {}", kind, e))
    }

    fn parse_id(s: &str) -> Result<uuid::Uuid, StoreError> {
        uuid::Uuid::parse_str(s).map_err(|e| StoreError::Storage(format!("parse id: {}", e)))
    }

    fn millis_to_utc(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
    }

    fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, bool, Option<String>, i64)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn category_from_parts(
        parts: (String, String, bool, Option<String>, i64),
    ) -> Result<Category, StoreError> {
        let (id_str, name, is_default, created_by_str, created_ms) = parts;
        let created_by = match created_by_str {
            Some(s) => Some(Self::parse_id(&s)?),
            None => None,
        };
        Ok(Category {
            id: Self::parse_id(&id_str)?,
            name,
            is_default,
            created_by,
            created: Self::millis_to_utc(created_ms),
        })
    }

    fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO categories (id, name, is_default, created_by, created)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.id.to_string(),
                category.name,
                category.is_default as i32,
                category.created_by.map(|o| o.to_string()),
                category.created.timestamp_millis(),
            ],
        )
        .map_err(|e| Self::map_insert_err(e, EntityKind::Category, &category.name))?;
        Ok(())
    }

    fn insert_location(&self, location: &Location) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO locations (id, name, is_default, created) VALUES (?1, ?2, ?3, ?4)",
            params![
                location.id.to_string(),
                location.name,
                location.is_default as i32,
                location.created.timestamp_millis(),
            ],
        )
        .map_err(|e| Self::map_insert_err(e, EntityKind::Location, &location.name))?;
        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRow> {
        Ok(ItemRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            quantity: row.get(3)?,
            price: row.get(4)?,
            category: row.get(5)?,
            location: row.get(6)?,
            owner: row.get(7)?,
            created: row.get(8)?,
            modified: row.get(9)?,
        })
    }

    fn item_from_row(row: ItemRow) -> Result<Item, StoreError> {
        let location = match row.location {
            Some(s) => Some(Self::parse_id(&s)?),
            None => None,
        };
        Ok(Item {
            id: Self::parse_id(&row.id)?,
            name: row.name,
            description: row.description,
            quantity: row.quantity,
            price: row.price,
            category: Self::parse_id(&row.category)?,
            location,
            owner: Self::parse_id(&row.owner)?,
            created: Self::millis_to_utc(row.created),
            modified: Self::millis_to_utc(row.modified),
        })
    }
}

const ITEM_COLUMNS: &str =
    "id, name, description, quantity, price, category, location, owner, created, modified";

struct ItemRow {
    id: String,
    name: String,
    description: String,
    quantity: i64,
    price: f64,
    category: String,
    location: Option<String>,
    owner: String,
    created: i64,
    modified: i64,
}

impl EntityStore for SqliteEntityStore {
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        validate_entity_name("username", username)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let user = User {
            id: UserId::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created: Utc::now(),
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.created.timestamp_millis(),
            ],
        )
        .map_err(|e| Self::map_insert_err(e, EntityKind::User, email))?;
        Ok(user)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, username, email, password_hash, created FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| StoreError::Storage(format!("query user: {}", e)))?;

        match row {
            Some((id_str, username, email, password_hash, created_ms)) => Ok(Some(User {
                id: Self::parse_id(&id_str)?,
                username,
                email,
                password_hash,
                created: Self::millis_to_utc(created_ms),
            })),
            None => Ok(None),
        }
    }

    fn categories_for(&self, owner: UserId) -> Result<Vec<Category>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, is_default, created_by, created FROM categories
                 WHERE is_default = 1 OR created_by = ?1
                 ORDER BY rowid",
            )
            .map_err(|e| StoreError::Storage(format!("prepare categories: {}", e)))?;
        let rows = stmt
            .query_map(params![owner.to_string()], Self::row_to_category)
            .map_err(|e| StoreError::Storage(format!("query categories: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Storage(format!("collect categories: {}", e)))?;
        rows.into_iter().map(Self::category_from_parts).collect()
    }

    fn create_category(&self, owner: UserId, name: &str) -> Result<Category, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let category = Category::custom(name, owner);
        self.insert_category(&category)?;
        Ok(category)
    }

    fn create_default_category(&self, name: &str) -> Result<Category, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let category = Category::system_default(name);
        self.insert_category(&category)?;
        Ok(category)
    }

    fn delete_category(&self, owner: UserId, id: CategoryId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "DELETE FROM categories WHERE id = ?1 AND created_by = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(|e| StoreError::Storage(format!("delete category: {}", e)))?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrUnauthorized(EntityKind::Category));
        }
        Ok(())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, is_default, created FROM locations ORDER BY name")
            .map_err(|e| StoreError::Storage(format!("prepare locations: {}", e)))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(|e| StoreError::Storage(format!("query locations: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Storage(format!("collect locations: {}", e)))?;

        rows.into_iter()
            .map(|(id_str, name, is_default, created_ms)| {
                Ok(Location {
                    id: Self::parse_id(&id_str)?,
                    name,
                    is_default,
                    created: Self::millis_to_utc(created_ms),
                })
            })
            .collect()
    }

    fn create_location(&self, name: &str) -> Result<Location, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let location = Location::new(name);
        self.insert_location(&location)?;
        Ok(location)
    }

    fn create_default_location(&self, name: &str) -> Result<Location, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let location = Location::system_default(name);
        self.insert_location(&location)?;
        Ok(location)
    }

    fn delete_location(&self, id: LocationId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let is_default: Option<bool> = conn
            .query_row(
                "SELECT is_default FROM locations WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Storage(format!("query location: {}", e)))?;

        match is_default {
            None => Err(StoreError::NotFoundOrUnauthorized(EntityKind::Location)),
            Some(true) => Err(StoreError::Validation(
                "the default location cannot be deleted".into(),
            )),
            Some(false) => {
                conn.execute(
                    "DELETE FROM locations WHERE id = ?1",
                    params![id.to_string()],
                )
                .map_err(|e| StoreError::Storage(format!("delete location: {}", e)))?;
                Ok(())
            }
        }
    }

    fn items_for(&self, owner: UserId) -> Result<Vec<Item>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM items WHERE owner = ?1 ORDER BY rowid",
                ITEM_COLUMNS
            ))
            .map_err(|e| StoreError::Storage(format!("prepare items: {}", e)))?;
        let rows = stmt
            .query_map(params![owner.to_string()], Self::row_to_item)
            .map_err(|e| StoreError::Storage(format!("query items: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Storage(format!("collect items: {}", e)))?;
        rows.into_iter().map(Self::item_from_row).collect()
    }

    fn item(&self, owner: UserId, id: ItemId) -> Result<Item, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM items WHERE id = ?1 AND owner = ?2",
                    ITEM_COLUMNS
                ),
                params![id.to_string(), owner.to_string()],
                Self::row_to_item,
            )
            .optional()
            .map_err(|e| StoreError::Storage(format!("query item: {}", e)))?;

        match row {
            Some(row) => Self::item_from_row(row),
            None => Err(StoreError::NotFoundOrUnauthorized(EntityKind::Item)),
        }
    }

    fn create_item(&self, owner: UserId, draft: ItemDraft) -> Result<Item, StoreError> {
        validate_draft(&draft).map_err(|e| StoreError::Validation(join_errors(&e)))?;
        let item = Item::from_draft(draft, owner);
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                ITEM_COLUMNS
            ),
            params![
                item.id.to_string(),
                item.name,
                item.description,
                item.quantity,
                item.price,
                item.category.to_string(),
                item.location.map(|l| l.to_string()),
                item.owner.to_string(),
                item.created.timestamp_millis(),
                item.modified.timestamp_millis(),
            ],
        )
        .map_err(|e| StoreError::Storage(format!("insert item: {}", e)))?;
        Ok(item)
    }

    fn update_item(&self, owner: UserId, item: Item) -> Result<Item, StoreError> {
        let draft = ItemDraft {
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            category: item.category,
            location: item.location,
        };
        validate_draft(&draft).map_err(|e| StoreError::Validation(join_errors(&e)))?;

        let modified = Utc::now();
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE items SET name = ?1, description = ?2, quantity = ?3, price = ?4,
                        category = ?5, location = ?6, modified = ?7
                 WHERE id = ?8 AND owner = ?9",
                params![
                    item.name,
                    item.description,
                    item.quantity,
                    item.price,
                    item.category.to_string(),
                    item.location.map(|l| l.to_string()),
                    modified.timestamp_millis(),
                    item.id.to_string(),
                    owner.to_string(),
                ],
            )
            .map_err(|e| StoreError::Storage(format!("update item: {}", e)))?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrUnauthorized(EntityKind::Item));
        }
        drop(conn);

        // Return the stored representation, with server-side stamps.
        self.item(owner, item.id)
    }

    fn delete_item(&self, owner: UserId, id: ItemId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "DELETE FROM items WHERE id = ?1 AND owner = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(|e| StoreError::Storage(format!("delete item: {}", e)))?;
        if changed == 0 {
            return Err(StoreError::NotFoundOrUnauthorized(EntityKind::Item));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, location: Option<LocationId>) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            description: "test".into(),
            quantity: 3,
            price: 12.5,
            category: uuid::Uuid::new_v4(),
            location,
        }
    }

    fn user(store: &SqliteEntityStore, email: &str) -> User {
        store.create_user("tester", email, "hash").unwrap()
    }

    #[test]
    fn per_owner_category_uniqueness() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let alice = user(&store, "alice@example.com");
        let bob = user(&store, "bob@example.com");

        store.create_category(alice.id, "Tools").unwrap();
        store.create_category(bob.id, "Tools").unwrap();

        let err = store.create_category(alice.id, "Tools").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
    }

    #[test]
    fn default_categories_globally_unique() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        store.create_default_category("Food").unwrap();
        let err = store.create_default_category("Food").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
    }

    #[test]
    fn visible_categories_are_defaults_plus_own() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let alice = user(&store, "alice@example.com");
        let bob = user(&store, "bob@example.com");

        store.create_default_category("Food").unwrap();
        store.create_category(alice.id, "Tools").unwrap();
        store.create_category(bob.id, "Yarn").unwrap();

        let names: Vec<String> = store
            .categories_for(alice.id)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Food", "Tools"]);
    }

    #[test]
    fn foreign_item_access_looks_missing() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let alice = user(&store, "alice@example.com");
        let bob = user(&store, "bob@example.com");

        let item = store.create_item(alice.id, draft("Drill", None)).unwrap();

        let as_bob = store.item(bob.id, item.id).unwrap_err();
        let missing = store.item(bob.id, uuid::Uuid::new_v4()).unwrap_err();
        assert_eq!(as_bob.to_string(), missing.to_string());

        let mut stolen = item.clone();
        stolen.name = "Mine now".into();
        assert!(matches!(
            store.update_item(bob.id, stolen),
            Err(StoreError::NotFoundOrUnauthorized(EntityKind::Item))
        ));
    }

    #[test]
    fn update_round_trips_location_change() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let alice = user(&store, "alice@example.com");
        let garage = store.create_location("Garage").unwrap();

        let mut item = store.create_item(alice.id, draft("Drill", None)).unwrap();
        item.location = Some(garage.id);

        let updated = store.update_item(alice.id, item).unwrap();
        assert_eq!(updated.location, Some(garage.id));
        assert!(updated.modified >= updated.created);

        let fetched = store.item(alice.id, updated.id).unwrap();
        assert_eq!(fetched.location, Some(garage.id));
    }

    #[test]
    fn location_names_unique_and_default_protected() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let unassigned = store.create_default_location("Unassigned").unwrap();
        assert!(store.create_location("Unassigned").is_err());

        let err = store.delete_location(unassigned.id).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn second_default_location_rejected() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        store.create_default_location("Unassigned").unwrap();

        // A differently named second default hits the partial unique
        // index on is_default.
        let err = store.create_default_location("Inbox").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
        assert_eq!(store.locations().unwrap().len(), 1);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stow.db");

        let alice_id = {
            let store = SqliteEntityStore::open(&path).unwrap();
            let alice = user(&store, "alice@example.com");
            store.create_item(alice.id, draft("Drill", None)).unwrap();
            alice.id
        };

        let store = SqliteEntityStore::open(&path).unwrap();
        let items = store.items_for(alice_id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Drill");
    }

    #[test]
    fn items_keep_insertion_order() {
        let store = SqliteEntityStore::open_in_memory().unwrap();
        let alice = user(&store, "alice@example.com");
        for name in ["c", "a", "b"] {
            store.create_item(alice.id, draft(name, None)).unwrap();
        }
        let names: Vec<String> = store
            .items_for(alice.id)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
