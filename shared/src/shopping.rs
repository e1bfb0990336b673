use serde::{Deserialize, Serialize};

use crate::model::{ShoppingItem, ShoppingItemId};
use crate::{ValidationError, MAX_ITEM_NAME_LEN};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    items: Vec<ShoppingItem>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub fn validate_item_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required { field: "item name" });
    }
    if name.len() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "item name",
            len: name.len(),
            max: MAX_ITEM_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

impl ShoppingList {
    #[must_use]
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: &ShoppingItemId) -> Option<&ShoppingItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| !i.is_checked).count()
    }

    pub fn replace(&mut self, items: Vec<ShoppingItem>) {
        self.items = items;
        self.is_loading = false;
        self.error = None;
    }

    pub fn push(&mut self, item: ShoppingItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    pub fn set_checked(&mut self, id: &ShoppingItemId, checked: bool) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == id) {
            item.is_checked = checked;
        }
    }

    pub fn remove(&mut self, id: &ShoppingItemId) {
        self.items.retain(|i| &i.id != id);
    }
}
