use crate::{translate, Character, CharacterInput, Gender};

/// Chapter text longer than this is cut before it goes into an illustration prompt.
pub const ILLUSTRATION_TEXT_LIMIT: usize = 400;

/// Cuts `text` to at most `max` characters, ending in `...` when it was cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Short Portuguese description of how a character looks, used to keep the
/// character consistent across chapter illustrations.
pub fn character_appearance(character: &CharacterInput) -> String {
    let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    let mut parts = Vec::new();
    if let Some(skin) = present(&character.skin_color) {
        if skin.to_lowercase().starts_with("pele") {
            parts.push(skin);
        } else {
            parts.push(format!("Pele {}", skin));
        }
    }
    if let Some(hair_color) = present(&character.hair_color) {
        parts.push(format!("cabelo {}", hair_color));
    }
    if let Some(hair_style) = present(&character.hair_style) {
        parts.push(hair_style);
    }
    if let Some(eye_color) = present(&character.eye_color) {
        parts.push(format!("olhos {}", eye_color));
    }
    if let Some(gender) = present(&character.gender) {
        parts.push(gender);
    }
    if let Some(age) = character.age.filter(|age| *age > 0) {
        parts.push(format!("{} anos", age));
    }

    if parts.is_empty() {
        "Aparência não especificada".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn portrait_prompt(character: &Character) -> String {
    format!(
        "Create a character in a Pixar/Disney 3D animation style that matches this description EXACTLY: \
        named {name}, {age} years old, {gender}, with {skin}, {hair_color} hair in a {hair_style} style, \
        and {eyes} eyes. Full body, friendly expression, soft studio lighting, plain background. \
        Do not add any text to the image.",
        name = character.name,
        age = character.age,
        gender = translate(character.gender.label()),
        skin = translate(&character.skin_color),
        hair_color = translate(&character.hair_color),
        hair_style = translate(&character.hair_style),
        eyes = translate(&character.eye_color),
    )
}

pub const STORY_TITLES_SYSTEM_PROMPT: &str =
    "Você é um especialista em literatura infantil que cria títulos envolventes e educativos para crianças. \
    Responda sempre chamando a ferramenta fornecida.";

fn story_themes(gender: Option<Gender>) -> &'static str {
    match gender {
        Some(Gender::Female) => "histórias infantis para meninas, com temas como amizade, aventuras mágicas, \
            princesas modernas, descobertas científicas, arte e criatividade",
        Some(Gender::Male) => "histórias infantis para meninos, com temas como aventuras, heróis, exploração, \
            esportes, ciência e descobertas",
        _ => "histórias infantis universais, com temas como amizade, aventuras, descobertas e diversão",
    }
}

pub fn story_titles_prompt(character_name: &str, gender: Option<Gender>) -> String {
    format!(
        "Crie exatamente 5 títulos de {themes} protagonizadas por um personagem chamado {name}.\n\n\
        Cada título deve:\n\
        - ser adequado para crianças de 3 a 8 anos\n\
        - ser educativo e divertido\n\
        - ser único e criativo\n\
        - ter no máximo 8 palavras\n\n\
        Para cada título, inclua um id (\"1\" a \"5\") e uma breve descrição da aventura.",
        themes = story_themes(gender),
        name = character_name,
    )
}

pub const STORY_CHAPTERS_SYSTEM_PROMPT: &str =
    "Você é um contador de histórias especializado em literatura infantil educativa e envolvente. \
    Responda sempre chamando a ferramenta fornecida.";

pub fn story_chapters_prompt(title: &str, character: &Character) -> String {
    format!(
        "Crie uma história infantil completa, dividida em exatamente 10 capítulos curtos, \
        baseada no título: \"{title}\"\n\n\
        Personagem principal:\n\
        - Nome: {name}\n\
        - Idade: {age} anos\n\
        - Sexo: {gender}\n\
        - Aparência: {appearance}\n\n\
        Cada capítulo deve:\n\
        - ter entre 100 e 150 palavras\n\
        - ser adequado para crianças de 3 a 8 anos\n\
        - trazer uma lição educativa sutil\n\
        - se conectar com o capítulo seguinte\n\
        - incluir elementos mágicos e divertidos",
        title = title,
        name = character.name,
        age = character.age,
        gender = character.gender,
        appearance = character_appearance(&character.into()),
    )
}

pub fn illustration_prompt(
    chapter_text: &str,
    character_name: &str,
    character_appearance: &str,
    reference_image_url: &str,
) -> String {
    format!(
        "Create a vibrant, child-friendly illustration in a Pixar/Disney 3D style for a children's story chapter. \
        The scene should show the events or mood of this text: \"{text}\". \
        The main character, {name}, who looks like this: \"{appearance}\", must be featured prominently \
        and react to the chapter's events while keeping the described appearance. \
        Use this image as the reference for the character's look and rendering style: {reference}. \
        The illustration is a storybook page: do not include any text or words in the image.",
        text = truncate_text(chapter_text, ILLUSTRATION_TEXT_LIMIT),
        name = character_name,
        appearance = character_appearance,
        reference = reference_image_url,
    )
}
