use serde::{Deserialize, Serialize};

use crate::CharacterInput;

/// The character form filled in by the quiz.
pub type CharacterDraft = CharacterInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizField {
    Name,
    Age,
    Gender,
    SkinColor,
    HairColor,
    EyeColor,
    HairStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStepKind {
    Text,
    Number,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizValue {
    Number(i64),
    Text(String),
}

impl From<&str> for QuizValue {
    fn from(value: &str) -> Self {
        QuizValue::Text(value.to_string())
    }
}

impl From<i64> for QuizValue {
    fn from(value: i64) -> Self {
        QuizValue::Number(value)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStep {
    pub id: u8,
    pub title: &'static str,
    pub field: QuizField,
    pub kind: QuizStepKind,
    #[serde(skip_serializing_if = "has_no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

fn has_no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

impl QuizStep {
    /// Whether `value` is enough to leave this step.
    pub fn accepts(&self, value: Option<&QuizValue>) -> bool {
        match (self.kind, value) {
            (_, None) => false,
            (QuizStepKind::Number, Some(QuizValue::Number(n))) => *n > 0,
            (QuizStepKind::Number, Some(QuizValue::Text(s))) => {
                s.trim().parse::<i64>().map(|n| n > 0).unwrap_or(false)
            }
            (QuizStepKind::Text, Some(QuizValue::Text(s))) => !s.trim().is_empty(),
            (QuizStepKind::Text, Some(QuizValue::Number(_))) => true,
            (QuizStepKind::Select, Some(QuizValue::Text(s))) => self.options.contains(&s.as_str()),
            (QuizStepKind::Select, Some(QuizValue::Number(_))) => false,
        }
    }
}

pub static QUIZ_STEPS: [QuizStep; 7] = [
    QuizStep {
        id: 1,
        title: "Qual é o nome do seu personagem?",
        field: QuizField::Name,
        kind: QuizStepKind::Text,
        options: &[],
        placeholder: Some("Digite um nome mágico..."),
    },
    QuizStep {
        id: 2,
        title: "Quantos anos tem o seu personagem?",
        field: QuizField::Age,
        kind: QuizStepKind::Number,
        options: &[],
        placeholder: Some("Digite a idade"),
    },
    QuizStep {
        id: 3,
        title: "Qual é o sexo do seu personagem?",
        field: QuizField::Gender,
        kind: QuizStepKind::Select,
        options: &["Masculino", "Feminino", "Outro"],
        placeholder: None,
    },
    QuizStep {
        id: 4,
        title: "Qual é a cor da pele?",
        field: QuizField::SkinColor,
        kind: QuizStepKind::Select,
        options: &[
            "Pele Clara",
            "Pele Morena",
            "Pele Escura",
            "Pele Dourada",
            "Pele Azulada (Fantasia)",
            "Pele Rosada (Fantasia)",
            "Pele Verde (Fantasia)",
        ],
        placeholder: None,
    },
    QuizStep {
        id: 5,
        title: "Qual é a cor do cabelo?",
        field: QuizField::HairColor,
        kind: QuizStepKind::Select,
        options: &[
            "Preto",
            "Castanho Escuro",
            "Castanho Claro",
            "Loiro",
            "Ruivo",
            "Branco/Grisalho",
            "Azul (Fantasia)",
            "Rosa (Fantasia)",
            "Roxo (Fantasia)",
            "Verde (Fantasia)",
        ],
        placeholder: None,
    },
    QuizStep {
        id: 6,
        title: "Qual é a cor dos olhos?",
        field: QuizField::EyeColor,
        kind: QuizStepKind::Select,
        options: &[
            "Castanhos",
            "Azuis",
            "Verdes",
            "Mel/Âmbar",
            "Cinza",
            "Violeta (Fantasia)",
            "Dourados (Fantasia)",
            "Vermelhos (Fantasia)",
        ],
        placeholder: None,
    },
    QuizStep {
        id: 7,
        title: "Qual é o estilo do cabelo?",
        field: QuizField::HairStyle,
        kind: QuizStepKind::Select,
        options: &[
            "Liso e Curto",
            "Liso e Longo",
            "Cacheado e Curto",
            "Cacheado e Longo",
            "Ondulado",
            "Careca",
            "Moicano",
            "Tranças",
            "Rabo de Cavalo",
            "Coque",
            "Franja",
            "Spikes (Fantasia)",
        ],
        placeholder: None,
    },
];

impl CharacterInput {
    pub fn set_field(&mut self, field: QuizField, value: QuizValue) {
        let text = match &value {
            QuizValue::Text(s) => s.clone(),
            QuizValue::Number(n) => n.to_string(),
        };

        match field {
            QuizField::Name => self.name = Some(text),
            QuizField::Age => {
                self.age = match value {
                    QuizValue::Number(n) => Some(n),
                    QuizValue::Text(s) => s.trim().parse().ok(),
                }
            }
            QuizField::Gender => self.gender = Some(text),
            QuizField::SkinColor => self.skin_color = Some(text),
            QuizField::HairColor => self.hair_color = Some(text),
            QuizField::EyeColor => self.eye_color = Some(text),
            QuizField::HairStyle => self.hair_style = Some(text),
        }
    }

    pub fn field_value(&self, field: QuizField) -> Option<QuizValue> {
        let text = |v: &Option<String>| v.clone().map(QuizValue::Text);
        match field {
            QuizField::Name => text(&self.name),
            QuizField::Age => self.age.map(QuizValue::Number),
            QuizField::Gender => text(&self.gender),
            QuizField::SkinColor => text(&self.skin_color),
            QuizField::HairColor => text(&self.hair_color),
            QuizField::EyeColor => text(&self.eye_color),
            QuizField::HairStyle => text(&self.hair_style),
        }
    }
}
