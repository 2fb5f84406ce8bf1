use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/(\d{4})").expect("valid year pattern"));

// Titles are matched against the lower-cased coroner name
static MALE_TITLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:mr|sir)\b").expect("valid male title pattern"));
static FEMALE_TITLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:mrs|miss|ms|lady|dame)\b").expect("valid female title pattern")
});

/// The four-digit year of a `dd/mm/yyyy` date string.
pub fn extract_year(raw: &str) -> Option<String> {
    YEAR_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|year| year.as_str().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infers a coroner's gender from the title in their name.
pub fn gender_of(name: &str) -> Gender {
    let name = name.to_lowercase();
    if MALE_TITLES.is_match(&name) {
        Gender::Male
    } else if FEMALE_TITLES.is_match(&name) {
        Gender::Female
    } else {
        Gender::Unknown
    }
}
