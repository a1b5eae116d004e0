use serde::{Deserialize, Serialize};

/// How the assistant should pitch its answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Standard,
    Eli5,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Standard => "standard",
            ChatMode::Eli5 => "eli5",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(ChatMode::Standard),
            "eli5" => Some(ChatMode::Eli5),
            _ => None,
        }
    }

    pub fn all() -> Vec<ChatMode> {
        vec![ChatMode::Standard, ChatMode::Eli5]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatMode::Standard => "Standard",
            ChatMode::Eli5 => "Explain Like I'm 5",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChatMode::Standard => ChatMode::Eli5,
            ChatMode::Eli5 => ChatMode::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(ChatMode::from_str("ELI5"), Some(ChatMode::Eli5));
        assert_eq!(ChatMode::from_str("standard"), Some(ChatMode::Standard));
        assert_eq!(ChatMode::from_str("socratic"), None);
    }

    #[test]
    fn test_serializes_as_wire_value() {
        let json = serde_json::to_string(&ChatMode::Eli5).unwrap();
        assert_eq!(json, "\"eli5\"");
    }

    #[test]
    fn test_next_cycles_through_all() {
        for mode in ChatMode::all() {
            assert_eq!(mode.next().next(), mode);
        }
    }
}
