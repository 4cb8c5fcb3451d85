use std::fmt;

/// Topics the chatbot refuses to discuss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitiveTopic {
    Politics,
    Religion,
    Race,
    Offensive,
}

impl SensitiveTopic {
    pub const ALL: [SensitiveTopic; 4] = [
        SensitiveTopic::Politics,
        SensitiveTopic::Religion,
        SensitiveTopic::Race,
        SensitiveTopic::Offensive,
    ];

    /// English and Malay keywords, all lowercase.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SensitiveTopic::Politics => &[
                "politics", "political", "election", "politician", "president", "minister",
                "parliament", "government policy", "vote", "party", "senator", "congress",
                "politic", "pemilihan", "pilihan raya", "politik", "kerajaan", "menteri",
                "perdana menteri",
            ],
            SensitiveTopic::Religion => &[
                "religion", "religious", "god", "allah", "jesus", "church", "mosque", "temple",
                "prayer", "faith", "belief", "hindu", "buddhist", "jewish", "christian", "islam",
                "agama", "sembahyang", "masjid", "gereja", "tuhan",
            ],
            SensitiveTopic::Race => &[
                "race", "racism", "racist", "racial", "ethnicity", "ethnic", "discrimination",
                "bumiputera", "indigenous", "bangsa", "suku", "perkauman", "kaum",
            ],
            SensitiveTopic::Offensive => &[
                "controversy", "controversies", "controversial", "hate", "violence", "kill",
                "attack", "harm", "abuse", "bully", "bullying", "harassment", "sexual",
                "inappropriate", "crude", "vulgar", "kekerasan", "bunuh", "serang",
            ],
        }
    }
}

impl fmt::Display for SensitiveTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensitiveTopic::Politics => "politics",
            SensitiveTopic::Religion => "religion",
            SensitiveTopic::Race => "race",
            SensitiveTopic::Offensive => "offensive",
        };
        f.write_str(name)
    }
}

/// First topic whose keyword occurs anywhere in the message.
///
/// Plain substring matching: "party" also matches "birthday party" and
/// "graceful" contains "race". Both are accepted.
pub fn matched_topic(message: &str) -> Option<SensitiveTopic> {
    let lowered = message.trim().to_lowercase();

    SensitiveTopic::ALL
        .into_iter()
        .find(|topic| topic.keywords().iter().any(|keyword| lowered.contains(keyword)))
}

pub fn is_sensitive_topic(message: &str) -> bool {
    matched_topic(message).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_regardless_of_case() {
        assert!(is_sensitive_topic("What do you think about POLITICS?"));
        assert_eq!(matched_topic("Politics"), Some(SensitiveTopic::Politics));
    }

    #[test]
    fn matches_malay_keywords() {
        assert_eq!(matched_topic("siapa perdana menteri"), Some(SensitiveTopic::Politics));
        assert_eq!(matched_topic("di mana masjid"), Some(SensitiveTopic::Religion));
        assert_eq!(matched_topic("isu perkauman"), Some(SensitiveTopic::Race));
    }

    #[test]
    fn substring_matches_are_accepted() {
        assert_eq!(matched_topic("a graceful exit"), Some(SensitiveTopic::Race));
    }

    #[test]
    fn ordinary_questions_pass() {
        assert!(!is_sensitive_topic("How do I reset my portal password?"));
        assert!(!is_sensitive_topic("   "));
    }
}
