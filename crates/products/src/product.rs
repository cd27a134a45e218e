use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use mandi_core::{NormalizedName, ProductId};

/// Category assigned to products minted without a caller-supplied category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// The authoritative `{id, name, category}` triple for a product.
///
/// Keyed in the identity cache by [`CanonicalProduct::normalized_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
}

impl CanonicalProduct {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            product_name: product_name.into(),
            category: category.into(),
        }
    }

    pub fn normalized_name(&self) -> NormalizedName {
        NormalizedName::new(&self.product_name)
    }
}

/// A partial product reference as supplied by a caller.
///
/// Any subset of `{product_id, product_name, category}` may be populated. A
/// field that is absent, empty, or whitespace-only counts as not present.
/// Fields the cache does not interpret (prices, stock levels, ...) are kept in
/// `extra` and flow through resolution untouched, so they still reach the
/// computation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ProductDescriptor {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            product_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            product_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The caller-supplied identifier, if present.
    pub fn id(&self) -> Option<&str> {
        present(&self.product_id)
    }

    /// The caller-supplied name in its original form, if present.
    pub fn name(&self) -> Option<&str> {
        present(&self.product_name)
    }

    pub fn category(&self) -> Option<&str> {
        present(&self.category)
    }

    /// Fill in name and category from a canonical record (id-only lookups).
    pub fn merge_name_from(mut self, canonical: &CanonicalProduct) -> Self {
        self.product_name = Some(canonical.product_name.clone());
        self.category = Some(canonical.category.clone());
        self
    }

    /// Fill in id and category from a canonical record (name-only lookups).
    ///
    /// The caller's name text is kept as supplied.
    pub fn merge_id_from(mut self, canonical: &CanonicalProduct) -> Self {
        self.product_id = Some(canonical.product_id.to_string());
        self.category = Some(canonical.category.clone());
        self
    }

    /// Attach a freshly minted identifier; the category defaults to [`UNKNOWN_CATEGORY`].
    pub fn assign_new_id(mut self, id: &ProductId) -> Self {
        self.product_id = Some(id.to_string());
        if self.category().is_none() {
            self.category = Some(UNKNOWN_CATEGORY.to_string());
        }
        self
    }
}

impl From<&CanonicalProduct> for ProductDescriptor {
    fn from(p: &CanonicalProduct) -> Self {
        Self {
            product_id: Some(p.product_id.to_string()),
            product_name: Some(p.product_name.clone()),
            category: Some(p.category.clone()),
            extra: Map::new(),
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}
