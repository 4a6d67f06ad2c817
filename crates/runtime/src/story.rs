use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Uuid};

use storytime_common::get_current_timestamp;
use storytime_database::{SqlxCrud, SqlxFilterQuery, SqlxQueryAs, SqlxSchema};

/// A story always has room for exactly this many chapters.
pub const CHAPTER_COUNT: usize = 10;

/// A generated story. Chapters are stored in ten fixed columns; in memory they
/// are a list with empty chapters left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub character_id: Option<Uuid>,
    pub user_id: Option<Uuid>,

    pub chapters: Vec<String>,
    pub character_image_url: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Story {
    pub fn new(
        title: String,
        character_id: Option<Uuid>,
        user_id: Option<Uuid>,
        chapters: Vec<String>,
        character_image_url: Option<String>,
    ) -> Self {
        let now = get_current_timestamp();
        Self {
            id: Uuid::new_v4(),
            title,
            character_id,
            user_id,
            chapters,
            character_image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Column values for `chapter_1` .. `chapter_10`. Missing chapters are
    /// written as empty strings, extra chapters are dropped.
    pub fn chapter_columns(&self) -> [String; CHAPTER_COUNT] {
        std::array::from_fn(|i| self.chapters.get(i).cloned().unwrap_or_default())
    }

    pub fn is_owned_by(&self, caller: Uuid) -> bool {
        self.user_id == Some(caller)
    }
}

fn collapse_chapters(columns: [Option<String>; CHAPTER_COUNT]) -> Vec<String> {
    columns.into_iter()
        .flatten()
        .filter(|chapter| !chapter.trim().is_empty())
        .collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct StoryRow {
    pub id: Uuid,
    pub title: String,
    pub character_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub chapter_1: Option<String>,
    pub chapter_2: Option<String>,
    pub chapter_3: Option<String>,
    pub chapter_4: Option<String>,
    pub chapter_5: Option<String>,
    pub chapter_6: Option<String>,
    pub chapter_7: Option<String>,
    pub chapter_8: Option<String>,
    pub chapter_9: Option<String>,
    pub chapter_10: Option<String>,
    pub character_image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SqlxSchema for Story {
    type Row = StoryRow;

    const TABLE_NAME: &'static str = "generated_stories";
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "character_id", "user_id",
        "chapter_1", "chapter_2", "chapter_3", "chapter_4", "chapter_5",
        "chapter_6", "chapter_7", "chapter_8", "chapter_9", "chapter_10",
        "character_image_url", "created_at", "updated_at",
    ];
    const INDEXES_SQL: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_generated_stories_user_id ON \"generated_stories\" (\"user_id\")",
        "CREATE INDEX IF NOT EXISTS idx_generated_stories_character_id ON \"generated_stories\" (\"character_id\")",
    ];

    fn get_id_value(&self) -> Uuid {
        self.id
    }

    fn from_row(row: Self::Row) -> Self {
        let chapters = collapse_chapters([
            row.chapter_1, row.chapter_2, row.chapter_3, row.chapter_4, row.chapter_5,
            row.chapter_6, row.chapter_7, row.chapter_8, row.chapter_9, row.chapter_10,
        ]);

        Self {
            id: row.id,
            title: row.title,
            character_id: row.character_id,
            user_id: row.user_id,
            chapters,
            character_image_url: row.character_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn bind_fields<'q>(&self, query: SqlxQueryAs<'q, Self::Row>) -> SqlxQueryAs<'q, Self::Row> {
        let mut query = query
            .bind(self.title.clone())
            .bind(self.character_id)
            .bind(self.user_id);
        for chapter in self.chapter_columns() {
            query = query.bind(chapter);
        }
        query
            .bind(self.character_image_url.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn create_table_sql() -> String {
        let chapter_columns = (1..=CHAPTER_COUNT)
            .map(|i| format!("\"chapter_{i}\" TEXT"))
            .collect::<Vec<_>>()
            .join(",\n            ");

        format!(r#"CREATE TABLE IF NOT EXISTS "generated_stories" (
            "id" UUID PRIMARY KEY,
            "title" TEXT NOT NULL,
            "character_id" UUID REFERENCES "characters" ("id") ON DELETE SET NULL,
            "user_id" UUID,
            {chapter_columns},
            "character_image_url" TEXT,
            "created_at" BIGINT NOT NULL,
            "updated_at" BIGINT NOT NULL
        )"#)
    }
}

impl SqlxCrud for Story {}
impl SqlxFilterQuery for Story {}

/// A generated image for one chapter of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChapterIllustration {
    pub id: Uuid,
    pub story_id: Uuid,
    /// Zero-based.
    pub chapter_index: i32,
    pub image_url: String,
    pub storage_path: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChapterIllustration {
    pub fn new(story_id: Uuid, chapter_index: i32, image_url: String, storage_path: String) -> Self {
        let now = get_current_timestamp();
        Self {
            id: Uuid::new_v4(),
            story_id,
            chapter_index,
            image_url,
            storage_path,
            created_at: now,
            updated_at: now,
        }
    }

    /// Object key of a chapter image inside the illustrations bucket.
    pub fn storage_path_for(story_id: Uuid, chapter_index: i32) -> String {
        format!("{}/chapter_{}.png", story_id, chapter_index)
    }
}

impl SqlxSchema for ChapterIllustration {
    type Row = Self;

    const TABLE_NAME: &'static str = "chapter_illustrations";
    const COLUMNS: &'static [&'static str] = &[
        "id", "story_id", "chapter_index", "image_url", "storage_path", "created_at", "updated_at",
    ];
    const INDEXES_SQL: &'static [&'static str] = &[
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_chapter_illustrations_story_chapter ON \"chapter_illustrations\" (\"story_id\", \"chapter_index\")",
    ];

    fn get_id_value(&self) -> Uuid {
        self.id
    }

    fn from_row(row: Self::Row) -> Self {
        row
    }

    fn bind_fields<'q>(&self, query: SqlxQueryAs<'q, Self::Row>) -> SqlxQueryAs<'q, Self::Row> {
        query
            .bind(self.story_id)
            .bind(self.chapter_index)
            .bind(self.image_url.clone())
            .bind(self.storage_path.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn create_table_sql() -> String {
        r#"CREATE TABLE IF NOT EXISTS "chapter_illustrations" (
            "id" UUID PRIMARY KEY,
            "story_id" UUID NOT NULL REFERENCES "generated_stories" ("id") ON DELETE CASCADE,
            "chapter_index" INTEGER NOT NULL CHECK ("chapter_index" >= 0),
            "image_url" TEXT NOT NULL,
            "storage_path" TEXT NOT NULL,
            "created_at" BIGINT NOT NULL,
            "updated_at" BIGINT NOT NULL
        )"#.to_string()
    }
}

impl SqlxCrud for ChapterIllustration {}
impl SqlxFilterQuery for ChapterIllustration {}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(chapters: [Option<&str>; CHAPTER_COUNT]) -> StoryRow {
        let [c1, c2, c3, c4, c5, c6, c7, c8, c9, c10] = chapters.map(|c| c.map(str::to_string));
        StoryRow {
            id: Uuid::new_v4(),
            title: "A Floresta Encantada".to_string(),
            character_id: None,
            user_id: Some(Uuid::new_v4()),
            chapter_1: c1, chapter_2: c2, chapter_3: c3, chapter_4: c4, chapter_5: c5,
            chapter_6: c6, chapter_7: c7, chapter_8: c8, chapter_9: c9, chapter_10: c10,
            character_image_url: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn reading_drops_empty_chapters() {
        let row = row_with([
            Some("Era uma vez"), Some(""), None, Some("   "), Some("Fim"),
            None, None, None, None, None,
        ]);
        let story = Story::from_row(row);
        assert_eq!(story.chapters, vec!["Era uma vez".to_string(), "Fim".to_string()]);
    }

    #[test]
    fn writing_pads_and_truncates_to_ten_columns() {
        let short = Story::new("t".into(), None, None, vec!["um".into(), "dois".into()], None);
        let columns = short.chapter_columns();
        assert_eq!(columns[0], "um");
        assert_eq!(columns[1], "dois");
        assert!(columns[2..].iter().all(String::is_empty));

        let long = Story::new("t".into(), None, None, (0..12).map(|i| i.to_string()).collect(), None);
        assert_eq!(long.chapter_columns()[9], "9");
    }

    #[test]
    fn illustration_storage_path() {
        let story_id = Uuid::nil();
        assert_eq!(
            ChapterIllustration::storage_path_for(story_id, 3),
            "00000000-0000-0000-0000-000000000000/chapter_3.png"
        );
    }

    #[test]
    fn story_table_lists_every_chapter_column() {
        let sql = Story::create_table_sql();
        assert!(sql.contains("\"chapter_1\" TEXT"));
        assert!(sql.contains("\"chapter_10\" TEXT"));
        assert!(Story::insert_sql().contains("$17"));
    }
}
