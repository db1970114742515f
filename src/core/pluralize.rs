//! English pluralization and path-segment normalization
//!
//! Entity types are declared by singular name (`book`, `category`); URLs
//! address them by plural, snake- or kebab-cased segments (`books`,
//! `book-categories`). This module converts between the two.

/// Irregular singular/plural pairs checked before the suffix rules
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
];

/// Words whose singular and plural forms are identical
const UNCOUNTABLE: &[&str] = &[
    "series",
    "species",
    "sheep",
    "fish",
    "metadata",
    "information",
    "news",
    "equipment",
];

/// Utility for converting between singular and plural forms of English nouns
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// Only the last `_`-separated word is inflected, so `book_category`
    /// becomes `book_categories`.
    ///
    /// # Examples
    ///
    /// ```
    /// use halo::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("book"), "books");
    /// assert_eq!(Pluralizer::pluralize("category"), "categories");
    /// assert_eq!(Pluralizer::pluralize("address"), "addresses");
    /// assert_eq!(Pluralizer::pluralize("person"), "people");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        let (head, word) = split_last_word(singular);
        format!("{}{}", head, Self::pluralize_word(word))
    }

    /// Convert a plural noun to its singular form
    ///
    /// # Examples
    ///
    /// ```
    /// use halo::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::singularize("books"), "book");
    /// assert_eq!(Pluralizer::singularize("categories"), "category");
    /// assert_eq!(Pluralizer::singularize("book_categories"), "book_category");
    /// ```
    pub fn singularize(plural: &str) -> String {
        let (head, word) = split_last_word(plural);
        format!("{}{}", head, Self::singularize_word(word))
    }

    fn pluralize_word(word: &str) -> String {
        if word.is_empty() || UNCOUNTABLE.contains(&word) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
            return plural.to_string();
        }

        match word {
            // consonant + y -> ies
            s if s.len() > 1 && s.ends_with('y') && !ends_with_vowel_before(s, 1) => {
                format!("{}ies", &s[..s.len() - 1])
            }

            // sibilants -> es
            s if s.ends_with('s')
                || s.ends_with("sh")
                || s.ends_with("ch")
                || s.ends_with('x')
                || s.ends_with('z') =>
            {
                format!("{}es", s)
            }

            s if s.len() > 2 && s.ends_with("fe") => format!("{}ves", &s[..s.len() - 2]),
            s if s.len() > 1 && s.ends_with('f') && !s.ends_with("ff") => {
                format!("{}ves", &s[..s.len() - 1])
            }

            // consonant + o -> oes, with the usual exceptions
            s if s.len() > 1 && s.ends_with('o') && !ends_with_vowel_before(s, 1) => match s {
                "photo" | "piano" | "halo" | "memo" | "logo" | "video" => format!("{}s", s),
                _ => format!("{}es", s),
            },

            s => format!("{}s", s),
        }
    }

    fn singularize_word(word: &str) -> String {
        if word.is_empty() || UNCOUNTABLE.contains(&word) {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
            return singular.to_string();
        }

        match word {
            s if s.len() > 3 && s.ends_with("ies") => format!("{}y", &s[..s.len() - 3]),

            // knives -> knife, wolves -> wolf
            s if s.len() > 3 && s.ends_with("ives") => format!("{}ife", &s[..s.len() - 4]),
            s if s.len() > 3 && s.ends_with("ves") => format!("{}f", &s[..s.len() - 3]),

            s if s.len() > 3
                && (s.ends_with("sses")
                    || s.ends_with("shes")
                    || s.ends_with("ches")
                    || s.ends_with("xes")
                    || s.ends_with("zzes")) =>
            {
                s[..s.len() - 2].to_string()
            }

            s if s.len() > 3 && s.ends_with("oes") => s[..s.len() - 2].to_string(),

            s if s.len() > 1 && s.ends_with('s') && !s.ends_with("ss") => {
                s[..s.len() - 1].to_string()
            }

            s => s.to_string(),
        }
    }

    /// Case-normalize a path segment to the snake_case form used by
    /// declared entity and relationship names
    ///
    /// Kebab-case, camelCase and mixed-case input all normalize the same way:
    /// `Book-Categories`, `bookCategories` and `book_categories` all become
    /// `book_categories`.
    pub fn normalize_segment(segment: &str) -> String {
        let mut out = String::with_capacity(segment.len() + 4);
        let mut previous_lower = false;
        for c in segment.trim().chars() {
            if c == '-' || c == '_' || c.is_whitespace() {
                if !out.ends_with('_') && !out.is_empty() {
                    out.push('_');
                }
                previous_lower = false;
            } else if c.is_uppercase() {
                if previous_lower {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
                previous_lower = false;
            } else {
                out.push(c);
                previous_lower = c.is_lowercase() || c.is_ascii_digit();
            }
        }
        out.trim_end_matches('_').to_string()
    }
}

/// Split `book_categories` into (`book_`, `categories`)
fn split_last_word(name: &str) -> (&str, &str) {
    match name.rfind('_') {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    }
}

/// Whether the character `offset` places before the end is a vowel
fn ends_with_vowel_before(word: &str, offset: usize) -> bool {
    word.chars()
        .rev()
        .nth(offset)
        .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
}
