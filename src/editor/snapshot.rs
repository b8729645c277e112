use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The editor's full text at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnapshot {
    content: String,
    modified_at: DateTime<Utc>,
}

impl CodeSnapshot {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            modified_at: Utc::now(),
        }
    }

    /// Replace the content and bump the modification time
    pub fn update(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.modified_at = Utc::now();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_replaces_content_and_advances_time() {
        let mut snapshot = CodeSnapshot::new("int x;");
        let before = snapshot.modified_at();

        snapshot.update("int y;");

        assert_eq!(snapshot.content(), "int y;");
        assert!(snapshot.modified_at() >= before);
        assert_eq!(snapshot.len(), 6);
    }
}
