//! Layout of the `news` table shared by the reader and the ingestion writer.

/// SQL to create the news table
pub const CREATE_NEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    source TEXT,
    link TEXT UNIQUE,
    publishedAt TEXT,
    tags TEXT,
    imageUrl TEXT,
    content TEXT
)
"#;

pub const SELECT_ALL_NEWS: &str = "SELECT * FROM news ORDER BY publishedAt DESC";

pub const SELECT_NEWS_BY_ID: &str = "SELECT * FROM news WHERE id = ?1";

pub const SELECT_NEWS_BY_LINK: &str = "SELECT id, tags FROM news WHERE link = ?1";

pub const INSERT_NEWS: &str = r#"
INSERT INTO news (title, source, link, publishedAt, tags, imageUrl, content)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const UPDATE_NEWS: &str = r#"
UPDATE news SET title = ?1, source = ?2, publishedAt = ?3, tags = ?4, imageUrl = ?5, content = ?6
WHERE id = ?7
"#;
