use serde::Serialize;
use std::fmt;

/// Hazard category detected from report text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterType {
    Earthquake,
    Flood,
    Cyclone,
    Wildfire,
    Tsunami,
    Drought,
    Disaster,
}

/// Detection order; the first category with a matching keyword wins
const KEYWORDS: &[(DisasterType, &[&str])] = &[
    (DisasterType::Earthquake, &["earthquake", "seismic", "tremor", "richter"]),
    (DisasterType::Flood, &["flood", "flooding", "inundation", "water"]),
    (DisasterType::Cyclone, &["cyclone", "hurricane", "typhoon", "storm"]),
    (DisasterType::Wildfire, &["wildfire", "fire", "blaze", "burning"]),
    (DisasterType::Tsunami, &["tsunami", "tidal wave"]),
    (DisasterType::Drought, &["drought", "dry", "water shortage"]),
];

impl DisasterType {
    /// Classify `text` by keyword
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| lower.contains(word)))
            .map(|(kind, _)| *kind)
            .unwrap_or(Self::Disaster)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Cyclone => "cyclone",
            Self::Wildfire => "wildfire",
            Self::Tsunami => "tsunami",
            Self::Drought => "drought",
            Self::Disaster => "disaster",
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_category() {
        assert_eq!(DisasterType::detect("Seismic activity recorded"), DisasterType::Earthquake);
        assert_eq!(DisasterType::detect("River FLOODING downstream"), DisasterType::Flood);
        assert_eq!(DisasterType::detect("Typhoon makes landfall"), DisasterType::Cyclone);
        assert_eq!(DisasterType::detect("A blaze spread across the hills"), DisasterType::Wildfire);
        assert_eq!(DisasterType::detect("Tsunami warning issued"), DisasterType::Tsunami);
        assert_eq!(DisasterType::detect("Severe drought hits farms"), DisasterType::Drought);
        assert_eq!(DisasterType::detect("Building collapse downtown"), DisasterType::Disaster);
    }

    #[test]
    fn test_first_category_wins() {
        let text = "The earthquake triggered a flood in the lower district.";
        assert_eq!(DisasterType::detect(text), DisasterType::Earthquake);

        // "water" places tsunami reports under flood
        let text = "A tsunami pushed water inland.";
        assert_eq!(DisasterType::detect(text), DisasterType::Flood);
    }

    #[test]
    fn test_display() {
        assert_eq!(DisasterType::Cyclone.to_string(), "cyclone");
    }
}
