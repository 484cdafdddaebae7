//! Best effort gender classification from a Brazilian first name.
//! A lookup table first, suffix rules second, and an explicit Unknown
//! when no rule applies. Callers must not treat Unknown as a default.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Unknown => "",
        }
    }
}

// Common first names that the suffix rules get wrong or miss.
const MALE_NAMES: &[&str] = &[
    "jose", "joao", "luca", "lucas", "josue", "andre", "felipe", "filipe",
    "henrique", "vicente", "jorge", "alexandre", "guilherme", "caique",
    "isaque", "moises", "luiz", "luis", "davi", "levi", "noah", "ravi",
];

const FEMALE_NAMES: &[&str] = &[
    "ines", "raquel", "isabel", "beatriz", "ester", "ruth", "carmen",
    "miriam", "rosangela", "solange", "edith", "liz", "ingrid", "scarlett",
    "kelly", "sueli", "meire", "nair",
];

/// Classify the gender of a person from their first name.
pub fn classify(full_name: &str) -> Gender {
    let first = match full_name.split_whitespace().next() {
        Some(f) => normalize(f),
        None => return Gender::Unknown,
    };
    if first.is_empty() {
        return Gender::Unknown;
    }

    if MALE_NAMES.contains(&first.as_str()) {
        return Gender::Male;
    }
    if FEMALE_NAMES.contains(&first.as_str()) {
        return Gender::Female;
    }

    // Portuguese name endings. Deliberately coarse; ambiguous endings
    // fall through to Unknown instead of guessing.
    if first.ends_with('a') {
        return Gender::Female;
    }
    if first.ends_with("iane")
        || first.ends_with("lene")
        || first.ends_with("aine")
    {
        return Gender::Female;
    }
    if first.ends_with('o')
        || first.ends_with('r')
        || first.ends_with("son")
        || first.ends_with("ton")
        || first.ends_with("el")
        || first.ends_with("eu")
    {
        return Gender::Male;
    }

    Gender::Unknown
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' | 'â' | 'ã' | 'à' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_hits_win_over_suffix_rules() {
        // "luca" ends in 'a' but is a male name.
        assert_eq!(classify("Luca Pereira"), Gender::Male);
        assert_eq!(classify("Raquel Dias"), Gender::Female);
    }

    #[test]
    fn suffix_rules_cover_the_common_cases() {
        assert_eq!(classify("Maria Souza"), Gender::Female);
        assert_eq!(classify("Pedro Alves"), Gender::Male);
        assert_eq!(classify("Eliane Castro"), Gender::Female);
        assert_eq!(classify("Anderson Melo"), Gender::Male);
    }

    #[test]
    fn accents_do_not_change_the_result() {
        assert_eq!(classify("João Lima"), Gender::Male);
        assert_eq!(classify("José Nunes"), Gender::Male);
    }

    #[test]
    fn unknown_is_explicit_not_a_default() {
        assert_eq!(classify(""), Gender::Unknown);
        assert_eq!(classify("   "), Gender::Unknown);
        assert_eq!(classify("Kim"), Gender::Unknown);
    }
}
