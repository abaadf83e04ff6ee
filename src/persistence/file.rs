use super::{PersistenceError, PersistenceResult};
use crate::scope::{ExclusionScope, ExclusionScopes, ScopeLevel};
use crate::timestamp::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScopesSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<Timestamp>,
    scopes: ExclusionScopes,
}

pub fn save_scopes_to_json<P: AsRef<Path>>(
    scopes: &ExclusionScopes,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = ScopesSnapshot {
        saved_at: Some(Timestamp::from(Utc::now())),
        scopes: scopes.clone(),
    };
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    log::info!("saved exclusion scopes to {}", path.as_ref().display());
    Ok(())
}

pub fn load_scopes_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ExclusionScopes> {
    let file = File::open(path.as_ref())?;
    let snapshot: ScopesSnapshot = serde_json::from_reader(file)?;
    if let Some(saved_at) = snapshot.saved_at.as_ref().and_then(Timestamp::to_datetime) {
        log::debug!("loaded exclusion scopes saved at {saved_at}");
    }
    Ok(snapshot.scopes)
}

/// One declared date. A row with an empty date records a scope that declares none.
#[derive(Default, Serialize, Deserialize)]
struct ScopeDateCsvRecord {
    scope: String,
    #[serde(default)]
    date: String,
}

/// Writes one `scope,date` row per declared date.
///
/// The CSV form only records dates. A scope without `serviceInfo` is written like a scope
/// declaring an empty list, so both load back as an empty `nonWorkingDates` list.
pub fn save_scopes_to_csv<P: AsRef<Path>>(
    scopes: &ExclusionScopes,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    let mut rows = 0usize;
    for (level, scope) in scopes.iter() {
        let dates = scope.declared_dates();
        if dates.is_empty() {
            writer.serialize(ScopeDateCsvRecord {
                scope: level.to_string(),
                date: String::new(),
            })?;
            rows += 1;
            continue;
        }
        for date in dates {
            writer.serialize(ScopeDateCsvRecord {
                scope: level.to_string(),
                date: date.clone(),
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    log::info!(
        "saved {rows} scope rows to {}",
        path.as_ref().display()
    );
    Ok(())
}

pub fn load_scopes_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ExclusionScopes> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut scopes = ExclusionScopes::default();
    for record in reader.deserialize::<ScopeDateCsvRecord>() {
        let record = record?;
        let level: ScopeLevel = record
            .scope
            .parse()
            .map_err(|err: crate::scope::UnknownScopeLevel| {
                PersistenceError::InvalidData(err.to_string())
            })?;
        let date = record.date.trim();
        if date.is_empty() {
            if scopes.get(level).is_none() {
                scopes.set(level, ExclusionScope::with_dates(Vec::<String>::new()));
            }
            continue;
        }
        scopes.add_date(level, date);
    }
    Ok(scopes)
}
