//! The closed set of tools exposed to the model.
//!
//! ```rust
//! use ttooling::ToolKind;
//!
//! assert_eq!(ToolKind::from_name("analyzeStory"), Some(ToolKind::AnalyzeStory));
//! assert_eq!(ToolKind::CreatePlotTwist.name(), "createPlotTwist");
//! assert_eq!(ToolKind::from_name("deleteEverything"), None);
//! ```

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    CreateCharacter,
    CreateSetting,
    CreatePlotTwist,
    AnalyzeStory,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::CreateCharacter,
        ToolKind::CreateSetting,
        ToolKind::CreatePlotTwist,
        ToolKind::AnalyzeStory,
    ];

    /// Wire name used in function declarations and model calls.
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateCharacter => "createCharacter",
            Self::CreateSetting => "createSetting",
            Self::CreatePlotTwist => "createPlotTwist",
            Self::AnalyzeStory => "analyzeStory",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl Display for ToolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
