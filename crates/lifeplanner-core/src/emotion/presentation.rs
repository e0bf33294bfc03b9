//! Illustration and message shown for each emotion.

use serde::Serialize;

use super::Emotion;

/// What the companion shows for an emotion.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Companion {
    pub emotion: Emotion,
    /// Asset file name of the illustration.
    pub illustration: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    /// Accent color for the message bubble.
    pub color: &'static str,
}

impl Emotion {
    pub fn companion(self) -> Companion {
        let (illustration, title, message, color) = match self {
            Emotion::Happy => (
                "chibi_happy.png",
                "Excellent!",
                "You keep moving forward. Keep up the pace!",
                "#FFB6C1",
            ),
            Emotion::Sad => (
                "chibi_sad.png",
                "Don't lose heart!",
                "Setbacks are part of learning. You can do it!",
                "#B0C4DE",
            ),
            Emotion::Angry => (
                "chibi_angry.png",
                "Determination!",
                "Don't give up! Every challenge makes you stronger.",
                "#FF8C69",
            ),
            Emotion::Success => (
                "chibi_success.png",
                "Goal achieved!",
                "Congratulations! You completed your goal.",
                "#98D8AA",
            ),
            // No dedicated artwork; neutral reuses the happy pose.
            Emotion::Neutral => (
                "chibi_happy.png",
                "Hello!",
                "I'm here to keep you company along the way.",
                "#E6E6FA",
            ),
        };
        Companion {
            emotion: self,
            illustration,
            title,
            message,
            color,
        }
    }

    /// Whether tapping the companion pops up its message.
    pub fn has_popup(self) -> bool {
        self != Emotion::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_emotion_has_a_message() {
        for emotion in Emotion::ALL {
            let companion = emotion.companion();
            assert_eq!(companion.emotion, emotion);
            assert!(!companion.message.is_empty());
            assert!(companion.illustration.ends_with(".png"));
        }
    }

    #[test]
    fn neutral_reuses_happy_artwork() {
        assert_eq!(
            Emotion::Neutral.companion().illustration,
            Emotion::Happy.companion().illustration
        );
        assert!(!Emotion::Neutral.has_popup());
        assert!(Emotion::Sad.has_popup());
    }
}
