use std::fmt;

use crate::page::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Current,
    History,
    New,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Current, Tab::History, Tab::New];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Current => "current",
            Tab::History => "history",
            Tab::New => "new",
        }
    }

    /// Tabs whose content comes from the API and is refetched on switch.
    pub fn is_data_backed(&self) -> bool {
        matches!(self, Tab::Current | Tab::History)
    }

    pub fn button_id(&self) -> String {
        format!("tab-button-{}", self.name())
    }

    pub fn content_id(&self) -> String {
        format!("tab-{}", self.name())
    }

    /// Marks this tab's button and content active and every other tab
    /// inactive.
    pub fn activate(&self, doc: &mut Document) {
        for tab in Tab::ALL {
            let active = tab == *self;
            doc.set_active(&tab.button_id(), active);
            doc.set_active(&tab.content_id(), active);
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
