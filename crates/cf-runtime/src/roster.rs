use serde::{Deserialize, Serialize};

/// One character the caller makes available to the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            name: name.into(),
            images,
            image: None,
            display_name: None,
        }
    }

    /// First listed image, then the single `image`, then nothing.
    pub fn base_image(&self) -> String {
        self.images
            .first()
            .or(self.image.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod roster_tests {
    use super::*;

    #[test]
    fn base_image_prefers_images_list() {
        let mut entry = RosterEntry::new("A", vec!["a.png".to_string(), "b.png".to_string()]);
        entry.image = Some("single.png".to_string());
        assert_eq!(entry.base_image(), "a.png");

        entry.images.clear();
        assert_eq!(entry.base_image(), "single.png");

        entry.image = None;
        assert_eq!(entry.base_image(), "");
    }

    #[test]
    fn roster_parses_from_collaborator_json() {
        let roster: Vec<RosterEntry> = serde_json::from_str(
            r#"[{"name":"tara","images":["tara.png"],"displayName":"Tara"},{"name":"bob","image":"bob.png"}]"#,
        )
        .expect("roster should parse");
        assert_eq!(roster[0].display_name.as_deref(), Some("Tara"));
        assert_eq!(roster[1].base_image(), "bob.png");
    }
}
