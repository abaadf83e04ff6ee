pub mod calendar;
pub mod config;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod scope;
pub mod timestamp;

pub use calendar::{
    ExclusionSet, collect_exclusion_dates, exclusions_for_month, filter_available, is_excluded,
};
pub use config::Config;
pub use export::{
    CSV_CONTENT_TYPE, DirectorySink, Download, DownloadSink, ExportData, ExportError,
    ExportOptions, Record, Sheet, format_currency, format_percentage, json_to_csv,
    prepare_download, prepare_json_csv_download, serialize, serialize_multiple, trigger_download,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScopeStore;
pub use persistence::{
    PersistenceError, ScopeStore, load_scopes_from_csv, load_scopes_from_json, save_scopes_to_csv,
    save_scopes_to_json,
};
pub use scope::{ExclusionScope, ExclusionScopes, ScopeLevel, ServiceInfo, is_date_key};
pub use timestamp::Timestamp;
