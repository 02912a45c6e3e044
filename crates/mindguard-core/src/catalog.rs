//! Fixed content the scheduler draws from: intervention messages, the break
//! catalog, and the healthy-feed content pool.

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// A short wellness activity offered by the break timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakType {
    pub name: String,
    /// Countdown length once the break is started.
    pub duration_secs: u32,
    pub instruction: String,
}

impl BreakType {
    pub fn new(name: &str, duration_secs: u32, instruction: &str) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            instruction: instruction.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Tip,
    Challenge,
    Mindful,
    Learning,
}

/// One card of the healthy feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub icon: String,
    pub title: String,
    pub body: String,
    pub category: String,
}

impl ContentItem {
    fn new(kind: ContentKind, icon: &str, title: &str, body: &str, category: &str) -> Self {
        Self {
            kind,
            icon: icon.into(),
            title: title.into(),
            body: body.into(),
            category: category.into(),
        }
    }
}

/// Everything the scheduler selects from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub messages: Vec<String>,
    pub breaks: Vec<BreakType>,
    pub content: Vec<ContentItem>,
}

impl Catalog {
    /// Every list must have at least one entry.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.messages.is_empty() {
            return Err(SchedulerError::EmptyCatalog("messages"));
        }
        if self.breaks.is_empty() {
            return Err(SchedulerError::EmptyCatalog("breaks"));
        }
        if self.content.is_empty() {
            return Err(SchedulerError::EmptyCatalog("content"));
        }
        Ok(())
    }

    pub fn default_messages() -> Vec<String> {
        [
            "Want a quick reset? You've been scrolling for 15 minutes!",
            "Time for a brain boost! Ready for a 2-minute challenge?",
            "Hey there! How about a mindful moment?",
            "Your focus streak is at risk. Want to protect it?",
            "Brain rot detected! Let's turn this into brain growth 🧠",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn default_breaks() -> Vec<BreakType> {
        vec![
            BreakType::new(
                "Eye Rest",
                30,
                "Look at something 20 feet away for 30 seconds",
            ),
            BreakType::new("Stretch Break", 60, "Stand up and stretch your arms and back"),
            BreakType::new("Hydration", 15, "Drink a glass of water"),
            BreakType::new("Deep Breathing", 45, "5 deep breaths to reset your mind"),
        ]
    }

    pub fn default_content() -> Vec<ContentItem> {
        vec![
            ContentItem::new(
                ContentKind::Tip,
                "💡",
                "Productivity Boost",
                "The Pomodoro Technique: Work for 25 minutes, then take a 5-minute break. This increases focus by 40%!",
                "Brain Boost",
            ),
            ContentItem::new(
                ContentKind::Challenge,
                "🎯",
                "Quick Exercise",
                "Do 10 jumping jacks right now! Physical activity increases cognitive function for up to 2 hours.",
                "Health Challenge",
            ),
            ContentItem::new(
                ContentKind::Mindful,
                "🧘",
                "Mindful Moment",
                "Notice 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, 1 you can taste.",
                "Mindfulness",
            ),
            ContentItem::new(
                ContentKind::Learning,
                "📚",
                "Quick Learn",
                "Fun fact: Your brain uses 20% of your body's energy despite being only 2% of your body weight!",
                "Knowledge",
            ),
        ]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            messages: Self::default_messages(),
            breaks: Self::default_breaks(),
            content: Self::default_content(),
        }
    }
}
