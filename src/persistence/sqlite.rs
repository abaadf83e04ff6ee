use super::{PersistenceError, PersistenceResult, ScopeStore};
use crate::scope::{ExclusionScope, ExclusionScopes, ScopeLevel};
use rusqlite::{Connection, params};
use std::sync::Mutex;

pub struct SqliteScopeStore {
    connection: Mutex<Connection>,
}

impl SqliteScopeStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS exclusion_scopes (
                level TEXT PRIMARY KEY,
                scope_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }
}

impl ScopeStore for SqliteScopeStore {
    fn save_scopes(&self, scopes: &ExclusionScopes) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM exclusion_scopes", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO exclusion_scopes (level, scope_json) VALUES (?1, ?2)")?;
            for (level, scope) in scopes.iter() {
                let json = serde_json::to_string(scope)?;
                stmt.execute(params![level.as_str(), json])?;
            }
        }
        tx.commit()?;
        log::info!("stored {} exclusion scopes in sqlite", scopes.iter().count());
        Ok(())
    }

    fn load_scopes(&self) -> PersistenceResult<Option<ExclusionScopes>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT level, scope_json FROM exclusion_scopes")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut scopes = ExclusionScopes::default();
        let mut found = false;
        for row in rows {
            let (level, json) = row?;
            let level: ScopeLevel = level
                .parse()
                .map_err(|err: crate::scope::UnknownScopeLevel| {
                    PersistenceError::InvalidData(err.to_string())
                })?;
            let scope: ExclusionScope = serde_json::from_str(&json)?;
            scopes.set(level, scope);
            found = true;
        }

        Ok(found.then_some(scopes))
    }
}
