use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Identifier of a marker-bound page. Stable for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub u32);

impl PageId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// Static configuration for one storybook page. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub model_path: String,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub position: Vec3,
    pub narration_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_sound_path: Option<String>,
    /// Whether a tap on the model restarts its animations in addition to
    /// playing the interaction sound.
    #[serde(default)]
    pub retrigger_on_tap: bool,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Parses the page list XML authored per deployment.
pub fn parse_pages(xml: &str) -> Result<Vec<Page>> {
    let document = Document::parse(xml).context("invalid page list XML")?;
    let mut pages = Vec::new();

    for node in document.descendants().filter(|n| n.has_tag_name("page")) {
        let id = required_text(&node, "id")?
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse page id: {err}"))?;
        let page = Page {
            id: PageId(id),
            model_path: required_text(&node, "model")?,
            scale: parse_vec3(optional_text(&node, "scale"), default_scale())?,
            position: parse_vec3(optional_text(&node, "position"), Vec3::ZERO)?,
            narration_path: required_text(&node, "narration")?,
            interaction_sound_path: optional_text(&node, "interaction-sound"),
            retrigger_on_tap: parse_bool(optional_text(&node, "retrigger-on-tap"))?,
        };
        pages.push(page);
    }

    let mut seen = std::collections::HashSet::new();
    for page in &pages {
        if !seen.insert(page.id) {
            return Err(anyhow!("duplicate page id {}", page.id.get()));
        }
    }

    Ok(pages)
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_bool(value: Option<String>) -> Result<bool> {
    match value.as_deref() {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse boolean: {other}")),
    }
}
