//! Per-operation field projections
//!
//! Every wire operation accepts a different subset of an entity's fields.
//! `project` builds a fresh JSON value from an explicit allow-list for the
//! entity kind and projection; the source entity is never modified.

use serde::Serialize;
use serde_json::{Map, Value};

use super::models::{Category, Image, Product, Variant};

/// Which wire shape an entity is being rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Everything the platform returns (snapshot documents)
    Full,
    /// Body of a POST (new entity, no server-managed fields, no id)
    Create,
    /// Body of a PUT (existing entity, no server-managed fields)
    Update,
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Projection::Full => write!(f, "FULL"),
            Projection::Create => write!(f, "CREATE"),
            Projection::Update => write!(f, "UPDATE"),
        }
    }
}

/// Closed set of entity kinds that carry projections
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Product(&'a Product),
    Variant(&'a Variant),
    Image(&'a Image),
    Category(&'a Category),
}

impl<'a> From<&'a Product> for EntityRef<'a> {
    fn from(product: &'a Product) -> Self {
        EntityRef::Product(product)
    }
}

impl<'a> From<&'a Variant> for EntityRef<'a> {
    fn from(variant: &'a Variant) -> Self {
        EntityRef::Variant(variant)
    }
}

impl<'a> From<&'a Image> for EntityRef<'a> {
    fn from(image: &'a Image) -> Self {
        EntityRef::Image(image)
    }
}

impl<'a> From<&'a Category> for EntityRef<'a> {
    fn from(category: &'a Category) -> Self {
        EntityRef::Category(category)
    }
}

mod fields {
    pub const PRODUCT_FULL: &[&str] = &[
        "id",
        "name",
        "description",
        "handle",
        "attributes",
        "published",
        "free_shipping",
        "requires_shipping",
        "canonical_url",
        "video_url",
        "seo_title",
        "seo_description",
        "brand",
        "created_at",
        "updated_at",
        "variants",
        "tags",
        "images",
        "categories",
    ];
    pub const PRODUCT_UPDATE: &[&str] = &[
        "id",
        "name",
        "description",
        "handle",
        "attributes",
        "published",
        "free_shipping",
        "requires_shipping",
        "video_url",
        "seo_title",
        "seo_description",
        "brand",
        "variants",
        "tags",
        "categories",
    ];
    pub const PRODUCT_CREATE: &[&str] = &[
        "name",
        "description",
        "handle",
        "attributes",
        "published",
        "free_shipping",
        "requires_shipping",
        "video_url",
        "seo_title",
        "seo_description",
        "brand",
        "variants",
        "tags",
        "categories",
    ];

    pub const VARIANT_FULL: &[&str] = &[
        "id",
        "image_id",
        "product_id",
        "position",
        "price",
        "compare_at_price",
        "promotional_price",
        "stock_management",
        "stock",
        "weight",
        "width",
        "height",
        "depth",
        "sku",
        "values",
        "barcode",
        "mpn",
        "age_group",
        "gender",
        "created_at",
        "updated_at",
        "cost",
        "inventory_levels",
    ];
    pub const VARIANT_UPDATE: &[&str] = &[
        "id",
        "image_id",
        "product_id",
        "position",
        "price",
        "compare_at_price",
        "promotional_price",
        "stock_management",
        "stock",
        "weight",
        "width",
        "height",
        "depth",
        "sku",
        "values",
        "barcode",
        "mpn",
        "age_group",
        "gender",
        "cost",
        "inventory_levels",
    ];
    pub const VARIANT_CREATE: &[&str] = &[
        "product_id",
        "price",
        "compare_at_price",
        "promotional_price",
        "stock_management",
        "stock",
        "weight",
        "width",
        "height",
        "depth",
        "sku",
        "values",
        "barcode",
        "mpn",
        "age_group",
        "gender",
        "cost",
    ];

    pub const IMAGE_FULL: &[&str] = &[
        "id",
        "product_id",
        "src",
        "position",
        "alt",
        "height",
        "width",
        "thumbnails_generated",
        "created_at",
        "updated_at",
    ];
    pub const IMAGE_UPDATE: &[&str] = &["id", "product_id", "src", "position"];
    pub const IMAGE_CREATE: &[&str] = &["src", "position"];

    pub const CATEGORY_FULL: &[&str] = &[
        "id",
        "name",
        "description",
        "handle",
        "parent",
        "subcategories",
        "seo_title",
        "seo_description",
        "google_shopping_category",
        "created_at",
        "updated_at",
    ];
    pub const CATEGORY_REFERENCE: &[&str] = &["id"];
}

/// Fields legal for `entity` under `projection`
pub fn allowed_fields(entity: EntityRef<'_>, projection: Projection) -> &'static [&'static str] {
    match (entity, projection) {
        (EntityRef::Product(_), Projection::Full) => fields::PRODUCT_FULL,
        (EntityRef::Product(_), Projection::Update) => fields::PRODUCT_UPDATE,
        (EntityRef::Product(_), Projection::Create) => fields::PRODUCT_CREATE,
        (EntityRef::Variant(_), Projection::Full) => fields::VARIANT_FULL,
        (EntityRef::Variant(_), Projection::Update) => fields::VARIANT_UPDATE,
        (EntityRef::Variant(_), Projection::Create) => fields::VARIANT_CREATE,
        (EntityRef::Image(_), Projection::Full) => fields::IMAGE_FULL,
        (EntityRef::Image(_), Projection::Update) => fields::IMAGE_UPDATE,
        (EntityRef::Image(_), Projection::Create) => fields::IMAGE_CREATE,
        (EntityRef::Category(_), Projection::Full) => fields::CATEGORY_FULL,
        (EntityRef::Category(_), _) => fields::CATEGORY_REFERENCE,
    }
}

/// Render `entity` as the JSON body legal for `projection`
pub fn project<'a>(entity: impl Into<EntityRef<'a>>, projection: Projection) -> Value {
    let entity = entity.into();
    let allowed = allowed_fields(entity, projection);

    // FULL keeps explicit nulls so a saved document reloads to the same entity
    let keep_nulls = projection == Projection::Full;
    let mut obj = match entity {
        EntityRef::Product(p) => retain(p, allowed, keep_nulls),
        EntityRef::Variant(v) => retain(v, allowed, keep_nulls),
        EntityRef::Image(i) => retain(i, allowed, keep_nulls),
        EntityRef::Category(c) => retain(c, allowed, keep_nulls),
    };

    // Nested collections go through their own projection
    if let EntityRef::Product(product) = entity {
        if obj.contains_key("variants") {
            let variants = product
                .variants
                .iter()
                .map(|v| {
                    let mut variant = project(v, projection);
                    // A product being recreated has no id for its variants to point at
                    if projection == Projection::Create {
                        strip_field(&mut variant, "product_id");
                    }
                    variant
                })
                .collect();
            obj.insert("variants".to_string(), Value::Array(variants));
        }

        if let (true, Some(images)) = (obj.contains_key("images"), &product.images) {
            let images = images.iter().map(|i| project(i, projection)).collect();
            obj.insert("images".to_string(), Value::Array(images));
        }

        if let (true, Some(categories)) = (obj.contains_key("categories"), &product.categories) {
            let categories = match projection {
                // Writes reference categories by id only
                Projection::Create | Projection::Update => categories
                    .iter()
                    .map(|c| Value::from(c.id.get()))
                    .collect(),
                Projection::Full => categories.iter().map(|c| project(c, projection)).collect(),
            };
            obj.insert("categories".to_string(), Value::Array(categories));
        }
    }

    Value::Object(obj)
}

/// Remove a top-level field from a projected object, returning its value
pub fn strip_field(value: &mut Value, field: &str) -> Option<Value> {
    value.as_object_mut().and_then(|obj| obj.remove(field))
}

fn retain<T: Serialize>(entity: &T, allowed: &[&str], keep_nulls: bool) -> Map<String, Value> {
    // Entity structs only hold strings, numbers, bools and nested structs,
    // so serialization to a Value cannot fail.
    let Ok(Value::Object(mut obj)) = serde_json::to_value(entity) else {
        return Map::new();
    };
    obj.retain(|key, value| allowed.contains(&key.as_str()) && (keep_nulls || !value.is_null()));
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::fixtures::*;
    use serde_json::json;

    #[test]
    fn test_product_full_keeps_server_fields() {
        let product = product(100, &[1]);
        let value = project(&product, Projection::Full);

        assert_eq!(value["id"], json!(100));
        assert!(value.get("created_at").is_some());
        assert!(value.get("canonical_url").is_some());
        assert_eq!(value["images"][0]["height"], json!(600));
        assert_eq!(value["categories"][0]["name"]["es"], json!("Categoria 7"));
        assert!(value["variants"][0].get("created_at").is_some());
    }

    #[test]
    fn test_product_update_strips_server_fields() {
        let product = product(100, &[1, 2]);
        let value = project(&product, Projection::Update);

        assert_eq!(value["id"], json!(100));
        for stripped in ["created_at", "updated_at", "canonical_url", "images"] {
            assert!(value.get(stripped).is_none(), "{} should be stripped", stripped);
        }
        assert_eq!(value["categories"], json!([7]));
        assert_eq!(value["variants"].as_array().unwrap().len(), 2);
        assert!(value["variants"][0].get("updated_at").is_none());
        assert_eq!(value["variants"][0]["id"], json!(1));
        assert_eq!(value["variants"][0]["product_id"], json!(100));
    }

    #[test]
    fn test_product_create_drops_identifier() {
        let product = product(200, &[10]);
        let value = project(&product, Projection::Create);

        assert!(value.get("id").is_none());
        assert!(value.get("images").is_none());
        assert_eq!(value["categories"], json!([7]));

        let variant = &value["variants"][0];
        for stripped in ["id", "product_id", "position", "image_id", "created_at"] {
            assert!(variant.get(stripped).is_none(), "{} should be stripped", stripped);
        }
        assert_eq!(variant["sku"], json!("SKU-10"));
    }

    #[test]
    fn test_variant_create_keeps_product_id_for_routing() {
        let mut variant = variant(3, 100);
        variant.image_id = Some(nz(55));
        let value = project(&variant, Projection::Create);

        assert_eq!(value["product_id"], json!(100));
        assert!(value.get("id").is_none());
        assert!(value.get("image_id").is_none());
        assert!(value.get("position").is_none());
        assert!(value.get("inventory_levels").is_none());
    }

    #[test]
    fn test_image_projections() {
        let image = image(5, 100);
        assert_eq!(
            project(&image, Projection::Update),
            json!({"id": 5, "product_id": 100, "src": "https://cdn.example.com/5.jpg", "position": 1})
        );
        assert_eq!(
            project(&image, Projection::Create),
            json!({"src": "https://cdn.example.com/5.jpg", "position": 1})
        );
    }

    #[test]
    fn test_category_write_projection_is_reference_only() {
        let category = category(9);
        assert_eq!(project(&category, Projection::Update), json!({"id": 9}));
        assert_eq!(project(&category, Projection::Create), json!({"id": 9}));
    }

    #[test]
    fn test_update_allow_list_is_within_full() {
        let p = product(1, &[]);
        let v = variant(1, 1);
        for entity in [EntityRef::from(&p), EntityRef::from(&v)] {
            let full = allowed_fields(entity, Projection::Full);
            for projection in [Projection::Update, Projection::Create] {
                for field in allowed_fields(entity, projection) {
                    assert!(full.contains(field), "{} not in FULL", field);
                }
            }
            assert!(!allowed_fields(entity, Projection::Create).contains(&"id"));
        }
    }

    #[test]
    fn test_projection_does_not_mutate_source() {
        let product = product(100, &[1]);
        let before = product.clone();
        let _ = project(&product, Projection::Create);
        assert_eq!(product, before);
    }

    #[test]
    fn test_full_keeps_explicit_nulls_writes_drop_them() {
        let mut product = product(100, &[1]);
        product.published = None;
        product.variants[0].weight = None;

        let full = project(&product, Projection::Full);
        assert_eq!(full["published"], Value::Null);
        assert_eq!(full["variants"][0]["weight"], Value::Null);

        let update = project(&product, Projection::Update);
        assert!(update.get("published").is_none());
        assert!(update["variants"][0].get("weight").is_none());
    }

    #[test]
    fn test_strip_field() {
        let mut value = json!({"product_id": 4, "sku": "A"});
        assert_eq!(strip_field(&mut value, "product_id"), Some(json!(4)));
        assert_eq!(value, json!({"sku": "A"}));
        assert_eq!(strip_field(&mut value, "missing"), None);
    }
}
