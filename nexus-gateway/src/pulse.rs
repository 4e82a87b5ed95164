//! Trending feed payload shaping.

use crate::prompts::{STATIONERY_IMAGE, TEXTBOOKS_IMAGE, UNIFORMS_IMAGE};
use nexus_core::{Category, TrendingItem};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One deal as the structuring call returns it. Fields are lenient: models
/// sometimes emit prices as numbers or drop keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulseDeal {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(deserialize_with = "lenient_string")]
    pub retailer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub saving_reason: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub fn image_for(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Uniforms) => UNIFORMS_IMAGE,
        Some(Category::Textbooks) => TEXTBOOKS_IMAGE,
        _ => STATIONERY_IMAGE,
    }
}

impl PulseDeal {
    /// Shape into a feed item at position `index`.
    pub fn into_item(self, index: usize) -> TrendingItem {
        let parsed = self.category.parse::<Category>().ok();
        TrendingItem {
            id: format!("pulse-{}", index),
            title: self.title,
            price: self.price,
            retailer: self.retailer,
            saving_reason: self.saving_reason,
            image_url: image_for(parsed).to_string(),
            url: "#".to_string(),
            category: parsed.map(|c| c.to_string()).unwrap_or(self.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_fields() {
        let deals: Vec<PulseDeal> = serde_json::from_str(
            r#"[{"title":"Shoes","price":299,"retailer":"PEP","savingReason":"2 for 1","category":"uniforms"},
                {"title":"Pens","price":null,"category":"Art"}]"#,
        )
        .expect("parse");

        let first = deals[0].clone().into_item(0);
        assert_eq!(first.price, "299");
        assert_eq!(first.category, "Uniforms");
        assert_eq!(first.image_url, UNIFORMS_IMAGE);
        assert_eq!(first.id, "pulse-0");
        assert_eq!(first.url, "#");

        let second = deals[1].clone().into_item(1);
        assert_eq!(second.price, "");
        assert_eq!(second.retailer, "");
        assert_eq!(second.category, "Art");
        assert_eq!(second.image_url, STATIONERY_IMAGE);
    }

    #[test]
    fn test_textbook_image() {
        assert_eq!(image_for(Some(Category::Textbooks)), TEXTBOOKS_IMAGE);
        assert_eq!(image_for(None), STATIONERY_IMAGE);
    }
}
