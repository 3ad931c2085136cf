/// SQL for the client's durable state store.
///
/// Local state is three independent logical stores, each one opaque JSON
/// blob under a fixed key: the lead cache, the offline action queue, and the
/// reminder overlay.
pub struct Queries;

impl Queries {
    pub const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS local_state (
            key TEXT PRIMARY KEY,
            value JSON NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#;

    pub const GET_BLOB: &'static str = "SELECT value FROM local_state WHERE key = ?1";

    pub const PUT_BLOB: &'static str = r#"
        INSERT INTO local_state (key, value, updated_at)
        VALUES (?1, ?2, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
    "#;
}
