//! Store catalog entity models
//!
//! These mirror the JSON documents returned by `GET /products`. Identifiers
//! are `NonZeroU64` so a zero or negative id is rejected while deserializing,
//! for both live pages and snapshot files.

use std::collections::{BTreeMap, HashSet};
use std::num::{NonZeroU32, NonZeroU64};

use serde::{Deserialize, Serialize};

/// Localized text keyed by language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageString {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pt: Option<String>,
}

impl LanguageString {
    /// First available translation, preferring Spanish
    pub fn display(&self) -> Option<&str> {
        self.es
            .as_deref()
            .or(self.pt.as_deref())
            .or(self.en.as_deref())
    }
}

/// Product attribute label (e.g. "Color"), localized
pub type Attribute = LanguageString;

/// A single option value on a variant (e.g. "Red")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantValue {
    pub es: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub id: NonZeroU64,
    pub variant_id: NonZeroU64,
    pub location_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: NonZeroU64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<NonZeroU64>,
    pub product_id: NonZeroU64,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_price: Option<String>,
    #[serde(default = "default_true")]
    pub stock_management: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
    #[serde(default = "default_dimension")]
    pub weight: Option<String>,
    #[serde(default = "default_dimension")]
    pub width: Option<String>,
    #[serde(default = "default_dimension")]
    pub height: Option<String>,
    #[serde(default = "default_dimension")]
    pub depth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<VariantValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_levels: Option<Vec<InventoryLevel>>,
}

/// Image alt text comes either as a list or as a language map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageAlt {
    List(Vec<Option<String>>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: NonZeroU64,
    pub product_id: NonZeroU64,
    pub src: String,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<ImageAlt>,
    pub height: NonZeroU32,
    pub width: NonZeroU32,
    pub thumbnails_generated: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: NonZeroU64,
    pub name: LanguageString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default)]
    pub subcategories: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_shopping_category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: NonZeroU64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    #[serde(default = "default_false")]
    pub published: Option<bool>,
    #[serde(default = "default_false")]
    pub free_shipping: Option<bool>,
    #[serde(default = "default_true")]
    pub requires_shipping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<LanguageString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub variants: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

impl Product {
    /// Variant ids in declaration order
    pub fn variant_ids(&self) -> Vec<NonZeroU64> {
        self.variants.iter().map(|v| v.id).collect()
    }

    /// Category ids, empty when the product carries no categories
    #[cfg(test)]
    pub fn category_ids(&self) -> Vec<NonZeroU64> {
        self.categories
            .iter()
            .flatten()
            .map(|c| c.id)
            .collect()
    }

    /// Copy of this product with the given variants removed
    pub fn without_variants(&self, excluded: &HashSet<NonZeroU64>) -> Product {
        let mut product = self.clone();
        product.variants.retain(|v| !excluded.contains(&v.id));
        product
    }

    /// Short label for logs and reports
    pub fn label(&self) -> String {
        match self.name.as_ref().and_then(LanguageString::display) {
            Some(name) => format!("{} ({})", name, self.id),
            None => self.id.to_string(),
        }
    }
}

fn default_true() -> Option<bool> {
    Some(true)
}

fn default_false() -> Option<bool> {
    Some(false)
}

fn default_dimension() -> Option<String> {
    Some("0".to_string())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_defaults_applied_when_absent() {
        let doc = json!({
            "id": 1,
            "created_at": "2024-01-01",
            "updated_at": "2024-01-01",
            "variants": []
        });
        let product: Product = serde_json::from_value(doc).unwrap();
        assert_eq!(product.published, Some(false));
        assert_eq!(product.free_shipping, Some(false));
        assert_eq!(product.requires_shipping, Some(true));
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_zero_id_is_rejected() {
        let doc = json!({
            "id": 0,
            "created_at": "2024-01-01",
            "updated_at": "2024-01-01",
            "variants": []
        });
        assert!(serde_json::from_value::<Product>(doc).is_err());
    }

    #[test]
    fn test_missing_variants_is_rejected() {
        let doc = json!({
            "id": 3,
            "created_at": "2024-01-01",
            "updated_at": "2024-01-01"
        });
        assert!(serde_json::from_value::<Product>(doc).is_err());
    }

    #[test]
    fn test_image_alt_accepts_list_and_map() {
        let list: ImageAlt = serde_json::from_value(json!(["front", null])).unwrap();
        assert_eq!(list, ImageAlt::List(vec![Some("front".to_string()), None]));

        let map: ImageAlt = serde_json::from_value(json!({"es": "frente"})).unwrap();
        assert!(matches!(map, ImageAlt::Map(_)));
    }

    #[test]
    fn test_without_variants_leaves_source_untouched() {
        let product = product(100, &[1, 2, 3]);
        let excluded: HashSet<_> = [nz(3)].into_iter().collect();

        let trimmed = product.without_variants(&excluded);

        assert_eq!(trimmed.variant_ids(), vec![nz(1), nz(2)]);
        assert_eq!(product.variant_ids(), vec![nz(1), nz(2), nz(3)]);
    }

    #[test]
    fn test_label_uses_name_when_present() {
        let mut p = product(42, &[]);
        assert_eq!(p.label(), "Producto 42 (42)");
        p.name = None;
        assert_eq!(p.label(), "42");
    }

    #[test]
    fn test_category_ids() {
        let mut p = product(1, &[]);
        p.categories = Some(vec![category(4), category(9)]);
        assert_eq!(p.category_ids(), vec![nz(4), nz(9)]);
        p.categories = None;
        assert!(p.category_ids().is_empty());
    }
}
