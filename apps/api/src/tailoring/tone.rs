//! Tone selection. Maps the caller's tone label to the phrase interpolated
//! into the prompt and a short style hint for the model.

use std::str::FromStr;

use serde::Serialize;

/// Writing tone requested by the caller. Always passed explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    ProfessionalAndConcise,
    Friendly,
    Formal,
    Creative,
}

impl Tone {
    #[cfg(test)]
    pub const ALL: [Tone; 4] = [
        Tone::ProfessionalAndConcise,
        Tone::Friendly,
        Tone::Formal,
        Tone::Creative,
    ];

    /// The human-readable label that appears in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::ProfessionalAndConcise => "professional and concise",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Creative => "creative",
        }
    }

    /// Phrasing hint appended after the tone label.
    pub fn style_guidance(&self) -> &'static str {
        match self {
            Tone::ProfessionalAndConcise => {
                "Lead bullets with strong action verbs (Delivered, Reduced, Built). \
                 Keep each bullet to one line where possible."
            }
            Tone::Friendly => {
                "Use warm, approachable wording (Partnered with, Helped teams, Collaborated on) \
                 while keeping every claim factual."
            }
            Tone::Formal => {
                "Use formal, precise phrasing (Administered, Coordinated, Oversaw). \
                 Avoid contractions and casual wording."
            }
            Tone::Creative => {
                "Use vivid but truthful verbs (Launched, Reimagined, Championed) \
                 and a summary that tells a short story."
            }
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tone '{0}' (expected one of: professional and concise, friendly, formal, creative)")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    /// Accepts the label ("professional and concise"), the snake_case name,
    /// or "professional" alone, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "professional and concise" | "professional" => Ok(Tone::ProfessionalAndConcise),
            "friendly" => Ok(Tone::Friendly),
            "formal" => Ok(Tone::Formal),
            "creative" => Ok(Tone::Creative),
            _ => Err(UnknownTone(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone_is_professional_and_concise() {
        assert_eq!(Tone::default(), Tone::ProfessionalAndConcise);
        assert_eq!(Tone::default().label(), "professional and concise");
    }

    #[test]
    fn test_parse_accepts_labels_and_names() {
        assert_eq!("Professional and Concise".parse::<Tone>().unwrap(), Tone::ProfessionalAndConcise);
        assert_eq!("professional_and_concise".parse::<Tone>().unwrap(), Tone::ProfessionalAndConcise);
        assert_eq!("professional".parse::<Tone>().unwrap(), Tone::ProfessionalAndConcise);
        assert_eq!(" FORMAL ".parse::<Tone>().unwrap(), Tone::Formal);
        assert_eq!("friendly".parse::<Tone>().unwrap(), Tone::Friendly);
        assert_eq!("creative".parse::<Tone>().unwrap(), Tone::Creative);
    }

    #[test]
    fn test_parse_rejects_unknown_tone() {
        let err = "sarcastic".parse::<Tone>().unwrap_err();
        assert!(err.to_string().contains("sarcastic"));
    }

    #[test]
    fn test_label_round_trips_through_parse() {
        for tone in Tone::ALL {
            assert_eq!(tone.label().parse::<Tone>().unwrap(), tone);
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Tone::ProfessionalAndConcise).unwrap();
        assert_eq!(json, r#""professional_and_concise""#);
        assert_eq!(serde_json::to_string(&Tone::Creative).unwrap(), r#""creative""#);
    }

    #[test]
    fn test_every_tone_has_guidance() {
        for tone in Tone::ALL {
            assert!(!tone.style_guidance().is_empty());
        }
    }
}
