/// Portuguese attribute labels and their English rendering for image prompts.
///
/// Order matters: partial matching picks the first entry contained in the text.
/// The trailing block covers the exact quiz options; its entries come last so
/// they never shadow the shorter entries during partial matching.
const TRANSLATIONS: &[(&str, &str)] = &[
    // gender
    ("masculino", "Male"),
    ("feminino", "Female"),
    ("outro", "Non-binary"),

    // skin
    ("pele clara", "light skin"),
    ("pele escura", "dark skin"),
    ("pele morena", "brown skin"),
    ("pele negra", "black skin"),
    ("pele branca", "white skin"),
    ("pele amarela", "asian skin"),

    // hair color
    ("castanho", "brown"),
    ("castanho escuro", "dark brown"),
    ("castanho claro", "light brown"),
    ("preto", "black"),
    ("loiro", "blonde"),
    ("ruivo", "red"),
    ("grisalho", "gray"),
    ("branco", "white"),

    // hair style
    ("cacheado", "curly"),
    ("liso", "straight"),
    ("ondulado", "wavy"),
    ("curto", "short"),
    ("longo", "long"),
    ("médio", "medium length"),
    ("cacheado e curto", "short curly"),
    ("liso e longo", "long straight"),

    // eyes
    ("castanhos", "brown"),
    ("azuis", "blue"),
    ("verdes", "green"),
    ("pretos", "black"),
    ("cinzas", "gray"),
    ("amendoados", "hazel"),

    // quiz options
    ("pele dourada", "golden skin"),
    ("pele azulada (fantasia)", "fantasy bluish skin"),
    ("pele rosada (fantasia)", "fantasy pinkish skin"),
    ("pele verde (fantasia)", "fantasy green skin"),
    ("branco/grisalho", "white gray"),
    ("azul (fantasia)", "fantasy blue"),
    ("rosa (fantasia)", "fantasy pink"),
    ("roxo (fantasia)", "fantasy purple"),
    ("verde (fantasia)", "fantasy green"),
    ("mel/âmbar", "honey amber"),
    ("cinza", "gray"),
    ("violeta (fantasia)", "fantasy violet"),
    ("dourados (fantasia)", "fantasy golden"),
    ("vermelhos (fantasia)", "fantasy red"),
    ("liso e curto", "short straight"),
    ("cacheado e longo", "long curly"),
    ("careca", "bald"),
    ("moicano", "mohawk"),
    ("tranças", "braids"),
    ("rabo de cavalo", "ponytail"),
    ("coque", "bun"),
    ("franja", "bangs"),
    ("spikes (fantasia)", "fantasy spiky"),
];

/// Translates a Portuguese attribute label to English.
///
/// Looks for an exact (case-insensitive) entry first, then for the first entry
/// contained in the text. Unknown text is returned unchanged.
pub fn translate(text: &str) -> String {
    let lower = text.trim().to_lowercase();

    if let Some((_, english)) = TRANSLATIONS.iter().find(|(pt, _)| *pt == lower) {
        return english.to_string();
    }

    if let Some((_, english)) = TRANSLATIONS.iter().find(|(pt, _)| lower.contains(pt)) {
        return english.to_string();
    }

    text.to_string()
}
