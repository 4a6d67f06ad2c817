use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Uuid};

use storytime_common::get_current_timestamp;
use storytime_database::{SqlxCrud, SqlxFilterQuery, SqlxQueryAs, SqlxSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    #[serde(rename = "Masculino", alias = "Male")]
    Male,
    #[serde(rename = "Feminino", alias = "Female")]
    Female,
    #[serde(rename = "Outro", alias = "Other")]
    Other,
}

impl Gender {
    /// The user-facing label, also used as the stored value.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Masculino",
            Gender::Female => "Feminino",
            Gender::Other => "Outro",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculino" | "male" => Ok(Gender::Male),
            "feminino" | "female" => Ok(Gender::Female),
            "outro" | "other" | "non-binary" => Ok(Gender::Other),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Every problem found in a character, reported together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid character data: {}", .0.join("; "))]
pub struct CharacterValidationError(pub Vec<String>);

impl CharacterValidationError {
    pub fn errors(&self) -> &[String] {
        &self.0
    }
}

/// Character attributes as submitted by a client. Every field may be absent;
/// `into_character` turns a complete input into a `Character`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterInput {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "idade")]
    pub age: Option<i64>,
    #[serde(alias = "sexo")]
    pub gender: Option<String>,
    #[serde(alias = "corPele", alias = "cor_pele")]
    pub skin_color: Option<String>,
    #[serde(alias = "corCabelo", alias = "cor_cabelo")]
    pub hair_color: Option<String>,
    #[serde(alias = "corOlhos", alias = "cor_olhos")]
    pub eye_color: Option<String>,
    #[serde(alias = "estiloCabelo", alias = "estilo_cabelo")]
    pub hair_style: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl CharacterInput {
    pub fn clean(self) -> Self {
        Self {
            name: trimmed(self.name),
            age: self.age,
            gender: trimmed(self.gender),
            skin_color: trimmed(self.skin_color),
            hair_color: trimmed(self.hair_color),
            eye_color: trimmed(self.eye_color),
            hair_style: trimmed(self.hair_style),
        }
    }

    pub fn validate(&self) -> Result<(), CharacterValidationError> {
        let mut errors = Vec::new();

        if is_blank(&self.name) {
            errors.push("Character name is required".to_string());
        }
        if !matches!(self.age, Some(age) if (1..=100).contains(&age)) {
            errors.push("Valid age is required (1-100)".to_string());
        }
        match self.gender.as_deref().map(str::trim) {
            None | Some("") => errors.push("Gender is required".to_string()),
            Some(gender) if gender.parse::<Gender>().is_err() => {
                errors.push("Gender must be one of Masculino, Feminino, Outro".to_string())
            }
            Some(_) => {}
        }
        if is_blank(&self.skin_color) {
            errors.push("Skin color is required".to_string());
        }
        if is_blank(&self.hair_color) {
            errors.push("Hair color is required".to_string());
        }
        if is_blank(&self.eye_color) {
            errors.push("Eye color is required".to_string());
        }
        if is_blank(&self.hair_style) {
            errors.push("Hair style is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CharacterValidationError(errors))
        }
    }

    /// Cleans and validates the input, producing a new unsaved character.
    pub fn into_character(self, user_id: Option<Uuid>) -> Result<Character, CharacterValidationError> {
        let input = self.clean();
        input.validate()?;

        let now = get_current_timestamp();
        Ok(Character {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.unwrap_or_default(),
            age: input.age.unwrap_or_default() as i32,
            gender: input.gender.as_deref().and_then(|g| g.parse().ok()).unwrap_or_default(),
            skin_color: input.skin_color.unwrap_or_default(),
            hair_color: input.hair_color.unwrap_or_default(),
            eye_color: input.eye_color.unwrap_or_default(),
            hair_style: input.hair_style.unwrap_or_default(),
            image_url: None,
            created_at: now,
            updated_at: now,
        })
    }
}

impl From<&Character> for CharacterInput {
    fn from(character: &Character) -> Self {
        Self {
            name: Some(character.name.clone()),
            age: Some(character.age as i64),
            gender: Some(character.gender.label().to_string()),
            skin_color: Some(character.skin_color.clone()),
            hair_color: Some(character.hair_color.clone()),
            eye_color: Some(character.eye_color.clone()),
            hair_style: Some(character.hair_style.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: Uuid,
    pub user_id: Option<Uuid>,

    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub skin_color: String,
    pub hair_color: String,
    pub eye_color: String,
    pub hair_style: String,

    pub image_url: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Character {
    pub fn validate(&self) -> Result<(), CharacterValidationError> {
        CharacterInput::from(self).validate()
    }

    /// Rows created without a user are open to anyone.
    pub fn is_accessible_by(&self, caller: Option<Uuid>) -> bool {
        match self.user_id {
            None => true,
            Some(owner) => caller == Some(owner),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub skin_color: String,
    pub hair_color: String,
    pub eye_color: String,
    pub hair_style: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SqlxSchema for Character {
    type Row = CharacterRow;

    const TABLE_NAME: &'static str = "characters";
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "name", "age", "gender",
        "skin_color", "hair_color", "eye_color", "hair_style",
        "image_url", "created_at", "updated_at",
    ];
    const INDEXES_SQL: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_characters_user_id ON \"characters\" (\"user_id\")",
    ];

    fn get_id_value(&self) -> Uuid {
        self.id
    }

    fn from_row(row: Self::Row) -> Self {
        let gender = row.gender.parse().unwrap_or_else(|e| {
            tracing::warn!("[Character::from_row] {} on character {}", e, row.id);
            Gender::default()
        });

        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            age: row.age,
            gender,
            skin_color: row.skin_color,
            hair_color: row.hair_color,
            eye_color: row.eye_color,
            hair_style: row.hair_style,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn bind_fields<'q>(&self, query: SqlxQueryAs<'q, Self::Row>) -> SqlxQueryAs<'q, Self::Row> {
        query
            .bind(self.user_id)
            .bind(self.name.clone())
            .bind(self.age)
            .bind(self.gender.label().to_string())
            .bind(self.skin_color.clone())
            .bind(self.hair_color.clone())
            .bind(self.eye_color.clone())
            .bind(self.hair_style.clone())
            .bind(self.image_url.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn create_table_sql() -> String {
        r#"CREATE TABLE IF NOT EXISTS "characters" (
            "id" UUID PRIMARY KEY,
            "user_id" UUID,
            "name" TEXT NOT NULL,
            "age" INTEGER NOT NULL CHECK ("age" BETWEEN 1 AND 100),
            "gender" TEXT NOT NULL,
            "skin_color" TEXT NOT NULL,
            "hair_color" TEXT NOT NULL,
            "eye_color" TEXT NOT NULL,
            "hair_style" TEXT NOT NULL,
            "image_url" TEXT,
            "created_at" BIGINT NOT NULL,
            "updated_at" BIGINT NOT NULL
        )"#.to_string()
    }
}

impl SqlxCrud for Character {}
impl SqlxFilterQuery for Character {}
