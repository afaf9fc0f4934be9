use serde::{Deserialize, Serialize};

/// A leaf checklist entry, the atomic unit of completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// A mid-level node grouping checklist items under a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Items in insertion order
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// UI-only, persisted so the view survives a restart
    #[serde(default)]
    pub expanded: bool,
}

/// A top-level node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Subtitles in insertion order
    #[serde(default)]
    pub subtitles: Vec<Subtitle>,
    /// UI-only, persisted so the view survives a restart
    #[serde(default)]
    pub expanded: bool,
}

impl ChecklistItem {
    pub fn new(id: String, text: String) -> Self {
        ChecklistItem {
            id,
            text,
            completed: false,
        }
    }
}

impl Subtitle {
    pub fn new(id: String, text: String) -> Self {
        Subtitle {
            id,
            text,
            completed: false,
            checklist: Vec::new(),
            expanded: false,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.checklist.iter().find(|c| c.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.checklist.iter_mut().find(|c| c.id == item_id)
    }
}

impl Title {
    pub fn new(id: String, text: String) -> Self {
        Title {
            id,
            text,
            completed: false,
            subtitles: Vec::new(),
            expanded: false,
        }
    }

    pub fn subtitle(&self, subtitle_id: &str) -> Option<&Subtitle> {
        self.subtitles.iter().find(|s| s.id == subtitle_id)
    }

    pub fn subtitle_mut(&mut self, subtitle_id: &str) -> Option<&mut Subtitle> {
        self.subtitles.iter_mut().find(|s| s.id == subtitle_id)
    }
}

/// The whole checklist: an ordered list of titles.
///
/// Serializes transparently as a JSON array so the stored file is the plain
/// structural form of the titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub titles: Vec<Title>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn title(&self, title_id: &str) -> Option<&Title> {
        self.titles.iter().find(|t| t.id == title_id)
    }

    pub fn title_mut(&mut self, title_id: &str) -> Option<&mut Title> {
        self.titles.iter_mut().find(|t| t.id == title_id)
    }

    pub fn subtitle(&self, title_id: &str, subtitle_id: &str) -> Option<&Subtitle> {
        self.title(title_id)?.subtitle(subtitle_id)
    }

    pub fn subtitle_mut(&mut self, title_id: &str, subtitle_id: &str) -> Option<&mut Subtitle> {
        self.title_mut(title_id)?.subtitle_mut(subtitle_id)
    }

    pub fn item(&self, title_id: &str, subtitle_id: &str, item_id: &str) -> Option<&ChecklistItem> {
        self.subtitle(title_id, subtitle_id)?.item(item_id)
    }

    /// Iterate every checklist item across the whole tree, in display order
    pub fn items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.titles
            .iter()
            .flat_map(|t| t.subtitles.iter())
            .flat_map(|s| s.checklist.iter())
    }
}
