use rusqlite::Connection;

use tracker_core::{ImportStrategy, TrackerObjects, TrackerType, TypedUids, Uid};

use crate::error::StorageError;
use crate::traits::MemoryPreheat;

/// Bound on host parameters per `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

/// Durable index of the tracker records that have been persisted.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn exists(&self, tracker_type: TrackerType, uid: &Uid) -> Result<bool, StorageError> {
        let found: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tracker_objects WHERE tracker_type = ?1 AND uid = ?2)",
            rusqlite::params![tracker_type.as_str(), uid.as_str()],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }

    pub fn count(&self, tracker_type: TrackerType) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tracker_objects WHERE tracker_type = ?1",
            rusqlite::params![tracker_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Record a single uid as stored.
    pub fn insert(&mut self, tracker_type: TrackerType, uid: &Uid) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO tracker_objects (tracker_type, uid) VALUES (?1, ?2)",
            rusqlite::params![tracker_type.as_str(), uid.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// Load the existence of every record the payload contains or references.
    pub fn preheat(&self, objects: &TrackerObjects) -> Result<MemoryPreheat, StorageError> {
        let referenced = objects.referenced_uids();
        let mut existing = TypedUids::new();

        for tracker_type in TrackerType::ORDER {
            let uids: Vec<&Uid> = referenced.get(tracker_type).iter().collect();
            for chunk in uids.chunks(LOOKUP_CHUNK) {
                let placeholders = (2..chunk.len() + 2)
                    .map(|i| format!("?{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "SELECT uid FROM tracker_objects WHERE tracker_type = ?1 AND uid IN ({placeholders})"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let params = std::iter::once(tracker_type.as_str())
                    .chain(chunk.iter().map(|uid| uid.as_str()));
                let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
                    row.get::<_, String>(0)
                })?;
                for row in rows {
                    existing.insert(tracker_type, Uid::from(row?));
                }
            }
        }

        tracing::debug!(
            referenced = referenced.len(),
            existing = existing.len(),
            "preheated existence index"
        );
        Ok(MemoryPreheat::from_uids(existing))
    }

    /// Apply the outcome of an import: delete removes the records' uids,
    /// every other strategy stores them. Returns the number of changed rows.
    pub fn commit(
        &mut self,
        objects: &TrackerObjects,
        strategy: ImportStrategy,
    ) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let sql = if strategy.is_delete() {
            "DELETE FROM tracker_objects WHERE tracker_type = ?1 AND uid = ?2"
        } else {
            "INSERT OR IGNORE INTO tracker_objects (tracker_type, uid) VALUES (?1, ?2)"
        };

        let mut changed = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for (tracker_type, uid) in objects.uids().iter() {
                changed += stmt.execute(rusqlite::params![tracker_type.as_str(), uid.as_str()])?;
            }
        }
        tx.commit()?;

        tracing::debug!(strategy = %strategy, changed, "committed tracker objects");
        Ok(changed)
    }

    pub fn uids(&self, tracker_type: TrackerType) -> Result<Vec<Uid>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT uid FROM tracker_objects WHERE tracker_type = ?1 ORDER BY uid")?;
        let rows = stmt.query_map(rusqlite::params![tracker_type.as_str()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(Uid::from(row?));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Preheat;
    use tracker_core::{Enrollment, Event, TrackedEntity};

    fn objects() -> TrackerObjects {
        TrackerObjects {
            tracked_entities: vec![TrackedEntity::new("xK7H53f4Hc2")],
            enrollments: vec![Enrollment::new("t1zaUjKgT3p").with_tracked_entity("QxGbKYwChDM")],
            events: vec![Event::new("Qck4PQ7TMun").with_enrollment("t1zaUjKgT3p")],
            relationships: Vec::new(),
        }
    }

    #[test]
    fn records_schema_version_once() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        crate::schema::init_schema(&store.conn)?;
        let versions: Vec<i32> = store
            .conn
            .prepare("SELECT version FROM schema_version")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        assert_eq!(versions, vec![crate::schema::SCHEMA_VERSION]);
        Ok(())
    }

    #[test]
    fn commit_then_preheat() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        store.insert(TrackerType::TrackedEntity, &Uid::from("QxGbKYwChDM"))?;

        let preheat = store.preheat(&objects())?;
        assert!(preheat.exists(TrackerType::TrackedEntity, &Uid::from("QxGbKYwChDM")));
        assert!(!preheat.exists(TrackerType::TrackedEntity, &Uid::from("xK7H53f4Hc2")));

        assert_eq!(store.commit(&objects(), ImportStrategy::Create)?, 3);
        let preheat = store.preheat(&objects())?;
        assert!(preheat.exists(TrackerType::TrackedEntity, &Uid::from("xK7H53f4Hc2")));
        assert!(preheat.exists(TrackerType::Enrollment, &Uid::from("t1zaUjKgT3p")));
        assert!(preheat.exists(TrackerType::Event, &Uid::from("Qck4PQ7TMun")));
        Ok(())
    }

    #[test]
    fn commit_is_idempotent_for_updates() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        assert_eq!(store.commit(&objects(), ImportStrategy::Create)?, 3);
        assert_eq!(store.commit(&objects(), ImportStrategy::Update)?, 0);
        assert_eq!(store.count(TrackerType::Event)?, 1);
        Ok(())
    }

    #[test]
    fn delete_removes_uids() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        store.commit(&objects(), ImportStrategy::Create)?;

        let events_only = TrackerObjects {
            events: objects().events,
            ..TrackerObjects::default()
        };
        assert_eq!(store.commit(&events_only, ImportStrategy::Delete)?, 1);
        assert!(!store.exists(TrackerType::Event, &Uid::from("Qck4PQ7TMun"))?);
        assert!(store.exists(TrackerType::Enrollment, &Uid::from("t1zaUjKgT3p"))?);
        Ok(())
    }

    #[test]
    fn preheat_handles_more_uids_than_one_lookup() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        let tracked_entities: Vec<TrackedEntity> =
            (0..LOOKUP_CHUNK * 2 + 7).map(|_| TrackedEntity::new(Uid::generate())).collect();
        let objects = TrackerObjects {
            tracked_entities,
            ..TrackerObjects::default()
        };
        store.commit(&objects, ImportStrategy::Create)?;

        let preheat = store.preheat(&objects)?;
        assert_eq!(preheat.len(), objects.tracked_entities.len());
        Ok(())
    }

    #[test]
    fn on_disk_store_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tracker.db");
        let path = path.to_string_lossy().to_string();

        {
            let mut store = SqliteStore::open(&path)?;
            store.commit(&objects(), ImportStrategy::Create)?;
        }

        let store = SqliteStore::open(&path)?;
        assert_eq!(store.uids(TrackerType::TrackedEntity)?, vec![Uid::from("xK7H53f4Hc2")]);
        Ok(())
    }
}
