#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mood {
    #[default]
    Neutral,
    Sad,
    Anxious,
    Angry,
    Confused,
    SeekingPurpose,
    Grief,
}

impl Mood {
    /// Wire value, sent verbatim to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Angry => "Angry",
            Mood::Confused => "Confused",
            Mood::SeekingPurpose => "Seeking Purpose",
            Mood::Grief => "Grief",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "neutral" => Some(Mood::Neutral),
            "sad" => Some(Mood::Sad),
            "anxious" => Some(Mood::Anxious),
            "angry" => Some(Mood::Angry),
            "confused" => Some(Mood::Confused),
            "seeking purpose" => Some(Mood::SeekingPurpose),
            "grief" => Some(Mood::Grief),
            _ => None,
        }
    }

    pub fn all() -> Vec<Mood> {
        vec![
            Mood::Neutral,
            Mood::Sad,
            Mood::Anxious,
            Mood::Angry,
            Mood::Confused,
            Mood::SeekingPurpose,
            Mood::Grief,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Language code, as stored and sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "hi" | "hindi" => Some(Language::Hindi),
            _ => None,
        }
    }

    pub fn all() -> Vec<Language> {
        vec![Language::English, Language::Hindi]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }

    /// Next language in the picker order, wrapping around
    pub fn cycle(&self) -> Self {
        match self {
            Language::English => Language::Hindi,
            Language::Hindi => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn all() -> Vec<Theme> {
        vec![Theme::Light, Theme::Dark]
    }

    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
