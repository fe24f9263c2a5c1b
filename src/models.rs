// Provider data shapes. Field names are dictated by the remote site, so most
// records rename onto its PascalCase/camelCase keys and keep anything we do
// not model in an `extra` map rather than failing on schema drift.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Ingredient ids always added to a pizza: cheese and tomato sauce.
pub const BASE_INGREDIENTS: [u64; 2] = [42, 36];

/// Identifier assigned by the provider. Some endpoints send numbers, some
/// send strings; the received form is kept so it round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Number(n) => write!(f, "{n}"),
            RemoteId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RemoteId {
    fn from(value: u64) -> Self {
        RemoteId::Number(value)
    }
}

impl From<&str> for RemoteId {
    fn from(value: &str) -> Self {
        RemoteId::Text(value.to_string())
    }
}

/// A store returned by the store name search. Address, opening hours and
/// the rest of the provider metadata live in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Store {
    pub id: RemoteId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One size variant of a menu product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductSku {
    pub product_sku_id: RemoteId,
    #[serde(default)]
    pub name: Option<String>,
    /// Only populated for pizzas.
    #[serde(default)]
    pub ingredients: Vec<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How `add_item` has to talk to the basket for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCategory {
    Pizza,
    Side,
    Other(String),
}

/// A menu product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub product_id: RemoteId,
    #[serde(default)]
    pub name: String,
    /// Category tag such as "Pizza" or "Side".
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(default)]
    pub product_skus: Vec<ProductSku>,
    /// Position in the flattened menu, assigned while the menu is built.
    #[serde(skip)]
    pub idx: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn category(&self) -> ItemCategory {
        match self.kind.as_str() {
            "Pizza" => ItemCategory::Pizza,
            "Side" => ItemCategory::Side,
            other => ItemCategory::Other(other.to_string()),
        }
    }

    /// Size variant at `size_index`.
    pub fn sku(&self, size_index: usize) -> Result<&ProductSku> {
        self.product_skus
            .get(size_index)
            .ok_or(ClientError::SizeIndexOutOfRange {
                index: size_index,
                len: self.product_skus.len(),
            })
    }
}

/// Top level of the catalog response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryGroup {
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subcategory {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(default)]
    pub products: Vec<Item>,
}

/// Items of one menu category, in response order.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<Item>,
}

/// Menu for one store and menu version, grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    categories: Vec<MenuCategory>,
}

impl Menu {
    /// Flatten the three level catalog (group, subcategory, product) into
    /// categories keyed by subcategory type. Every item gets a zero based
    /// index following the flatten order across the whole catalog.
    pub fn from_catalog(groups: Vec<CategoryGroup>) -> Self {
        let mut menu = Menu::default();
        let mut idx = 0;
        for group in groups {
            for subcategory in group.subcategories {
                for mut item in subcategory.products {
                    item.idx = idx;
                    menu.add_item(&subcategory.kind, item);
                    idx += 1;
                }
            }
        }
        menu
    }

    /// Append an item to `category`, creating the category on first use.
    pub fn add_item(&mut self, category: &str, item: Item) {
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.items.push(item),
            None => self.categories.push(MenuCategory {
                name: category.to_string(),
                items: vec![item],
            }),
        }
    }

    pub fn categories(&self) -> &[MenuCategory] {
        &self.categories
    }

    /// Items in `category`, empty when the category is unknown.
    pub fn items(&self, category: &str) -> &[Item] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    /// Look an item up by its assigned index.
    pub fn item(&self, idx: usize) -> Option<&Item> {
        self.iter().find(|item| item.idx == idx)
    }

    /// All items, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A line in the basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketItem {
    #[serde(alias = "BasketItemId")]
    pub basket_item_id: RemoteId,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server side basket as last reported by the provider. Totals and
/// promotions stay in `extra`; nothing is computed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    #[serde(default, alias = "Items")]
    pub items: Vec<BasketItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreContext {
    pub session_context: SessionContext,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionContext {
    pub menu_version: RemoteId,
}

/// Body of `Basket/AddPizza`. The second-half fields belong to half and half
/// pizzas, which are not supported, so they are always zero or empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPizzaRequest {
    pub step_id: u32,
    pub quantity: u32,
    pub size_id: usize,
    pub product_id: RemoteId,
    pub ingredients: Vec<u64>,
    pub product_id_half_two: u64,
    pub ingredients_half_two: Vec<u64>,
    pub recipe_referrer: u64,
}

/// Body of `Basket/AddProduct`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddProductRequest {
    pub product_sku_id: RemoteId,
    pub quantity: u32,
    pub complimentary_items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AddItemRequest {
    Pizza(AddPizzaRequest),
    Product(AddProductRequest),
}

impl AddItemRequest {
    /// Build the request for one unit of `item` in the given size.
    pub fn for_item(item: &Item, size_index: usize) -> Result<Self> {
        match item.category() {
            ItemCategory::Pizza => {
                let mut ingredients = item.sku(size_index)?.ingredients.clone();
                ingredients.extend_from_slice(&BASE_INGREDIENTS);
                Ok(AddItemRequest::Pizza(AddPizzaRequest {
                    step_id: 0,
                    quantity: 1,
                    size_id: size_index,
                    product_id: item.product_id.clone(),
                    ingredients,
                    product_id_half_two: 0,
                    ingredients_half_two: Vec::new(),
                    recipe_referrer: 0,
                }))
            }
            ItemCategory::Side => Ok(AddItemRequest::Product(AddProductRequest {
                product_sku_id: item.sku(size_index)?.product_sku_id.clone(),
                quantity: 1,
                complimentary_items: Vec::new(),
            })),
            ItemCategory::Other(kind) => Err(ClientError::UnsupportedCategory(kind)),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            AddItemRequest::Pizza(_) => "Basket/AddPizza",
            AddItemRequest::Product(_) => "Basket/AddProduct",
        }
    }
}
