use serde::{Deserialize, Serialize};

/// Category tag attached to every message and timeline event.
///
/// The feed transports these as snake_case strings. Tags the app doesn't know
/// land in `Other` with the raw string preserved, so storage and sync
/// comparison round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    LoveNote,
    Memory,
    Appreciation,
    Admiration,
    InsideJoke,
    FutureDream,
    Gratitude,
    Encouragement,
    Seasonal,
    Sweet,
    Milestone,
    Holiday,
    Adventure,
    Special,
    Funny,
    Other(String),
}

impl Category {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "love_note" => Self::LoveNote,
            "memory" => Self::Memory,
            "appreciation" => Self::Appreciation,
            "admiration" => Self::Admiration,
            "inside_joke" => Self::InsideJoke,
            "future_dream" => Self::FutureDream,
            "gratitude" => Self::Gratitude,
            "encouragement" => Self::Encouragement,
            "seasonal" => Self::Seasonal,
            "sweet" => Self::Sweet,
            "milestone" => Self::Milestone,
            "holiday" => Self::Holiday,
            "adventure" => Self::Adventure,
            "special" => Self::Special,
            "funny" => Self::Funny,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LoveNote => "love_note",
            Self::Memory => "memory",
            Self::Appreciation => "appreciation",
            Self::Admiration => "admiration",
            Self::InsideJoke => "inside_joke",
            Self::FutureDream => "future_dream",
            Self::Gratitude => "gratitude",
            Self::Encouragement => "encouragement",
            Self::Seasonal => "seasonal",
            Self::Sweet => "sweet",
            Self::Milestone => "milestone",
            Self::Holiday => "holiday",
            Self::Adventure => "adventure",
            Self::Special => "special",
            Self::Funny => "funny",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for tag in [
            "love_note",
            "memory",
            "gratitude",
            "milestone",
            "holiday",
            "adventure",
            "funny",
        ] {
            let category = Category::parse(tag);
            assert!(!matches!(category, Category::Other(_)), "tag {tag} should be known");
            assert_eq!(category.as_str(), tag);
        }
    }

    #[test]
    fn unknown_tag_preserved_in_other() {
        let category = Category::parse("anniversary_v2");
        assert_eq!(category, Category::Other("anniversary_v2".to_string()));
        assert_eq!(category.as_str(), "anniversary_v2");
    }

    #[test]
    fn distinct_unknown_tags_stay_distinct() {
        assert_ne!(Category::parse("a"), Category::parse("b"));
    }
}
