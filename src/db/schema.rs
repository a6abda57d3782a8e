/// Schema for the local key-value store and the asset cache regions.
pub const SCHEMA: &str = r#"
-- Local store: one JSON array per key
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Asset cache: responses grouped by named generation
CREATE TABLE IF NOT EXISTS asset_cache (
    region TEXT NOT NULL,
    url_hash TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    content_type TEXT,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (region, url_hash)
);

CREATE INDEX IF NOT EXISTS idx_asset_cache_region ON asset_cache(region);
"#;
