//! Resource catalog
//!
//! Static list of reviewable media items, resolved once at startup from the
//! config file (or the built-in demo set). Rooms are keyed by resource id;
//! prev/next navigation wraps around at both ends.

use crate::error::{Error, Result};
use frameline_common::model::{Resource, ResourceKind};
use serde::Deserialize;

/// Navigation direction for moving between resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(Error::BadRequest(format!(
                "Unknown direction: {} (expected prev or next)",
                other
            ))),
        }
    }
}

/// Immutable resource catalog, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct Catalog {
    resources: Vec<Resource>,
}

impl Catalog {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// Build from config, falling back to the demo catalog when the config
    /// carries no resources.
    pub fn from_config(resources: Vec<Resource>) -> Self {
        if resources.is_empty() {
            Self::demo()
        } else {
            Self::new(resources)
        }
    }

    /// The built-in demo catalog: one resource of each kind.
    pub fn demo() -> Self {
        Self::new(vec![
            Resource {
                id: "1".to_string(),
                url: "https://media.example.com/review/clip-01.mp4".to_string(),
                kind: ResourceKind::Video,
                name: "Video 1".to_string(),
            },
            Resource {
                id: "2".to_string(),
                url: "https://media.example.com/review/track-01.mp3".to_string(),
                kind: ResourceKind::Audio,
                name: "Audio 1".to_string(),
            },
            Resource {
                id: "3".to_string(),
                url: "https://media.example.com/review/still-01.jpeg".to_string(),
                kind: ResourceKind::Image,
                name: "Image 1".to_string(),
            },
        ])
    }

    pub fn all(&self) -> &[Resource] {
        &self.resources
    }

    /// Look up a resource by id
    pub fn get(&self, id: &str) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Resource {}", id)))
    }

    /// Resolve the neighbor of `id` in the given direction, wrapping around
    /// at both ends of the catalog.
    pub fn navigate(&self, id: &str, direction: Direction) -> Result<&Resource> {
        let index = self
            .resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Resource {}", id)))?;

        let len = self.resources.len();
        let next_index = match direction {
            Direction::Prev => (index + len - 1) % len,
            Direction::Next => (index + 1) % len,
        };

        Ok(&self.resources[next_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.get("2").unwrap().kind, ResourceKind::Audio);
        assert!(catalog.get("9").is_err());
    }

    #[test]
    fn test_navigate_next() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.navigate("2", Direction::Next).unwrap().id, "3");
    }

    #[test]
    fn test_navigate_wraps_both_ends() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.navigate("1", Direction::Prev).unwrap().id, "3");
        assert_eq!(catalog.navigate("3", Direction::Next).unwrap().id, "1");
    }

    #[test]
    fn test_navigate_unknown_id() {
        let catalog = Catalog::demo();
        assert!(catalog.navigate("missing", Direction::Next).is_err());
    }

    #[test]
    fn test_empty_config_uses_demo_catalog() {
        let catalog = Catalog::from_config(vec![]);
        assert_eq!(catalog.all().len(), 3);
    }
}
