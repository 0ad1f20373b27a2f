use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One pickable entry from the catalog file. Fields other than `id` and
/// `name` (element, image, rarity...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Read a JSON array of items, dropping blank and repeated ids
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    parse_catalog(&contents)
}

pub fn parse_catalog(contents: &str) -> Result<Vec<CatalogItem>, Box<dyn std::error::Error>> {
    let items: Vec<CatalogItem> = serde_json::from_str(contents)?;

    let mut seen = HashSet::new();
    Ok(items
        .into_iter()
        .filter(|item| !item.id.trim().is_empty())
        .filter(|item| seen.insert(item.id.clone()))
        .collect())
}
