// Database schema for the document store
diesel::table! {
    documents (collection, id) {
        collection -> Text,
        id -> Text,
        body -> Text,              // JSON encoded field map
    }
}

pub const CREATE_DOCUMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";
