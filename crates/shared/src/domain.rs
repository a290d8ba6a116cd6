use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CategoryId);
id_newtype!(ProductId);
id_newtype!(ProductOrderId);
id_newtype!(OrderItemId);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductCategory {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(CategoryId(id)),
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    Available,
    OutOfStock,
    BackOrder,
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "AVAILABLE",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::BackOrder => "BACK_ORDER",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductOrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_date: Option<DateTime<Utc>>,
}

/// A line of a [`ProductOrder`]. Plain data: forms and serialization build it,
/// the backend owns every rule about it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<OrderItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<ProductOrder>,
}

impl OrderItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<OrderItemId> {
        self.id
    }

    /// Records the id handed out on first persistence. Once set it never changes.
    pub fn assign_id(&mut self, id: OrderItemId) -> Result<(), ModelError> {
        match self.id {
            None => {
                self.id = Some(id);
                Ok(())
            }
            Some(current) if current == id => Ok(()),
            Some(current) => Err(ModelError::IdentityImmutable {
                entity: "OrderItem",
                current: current.0,
                requested: id.0,
            }),
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn status(mut self, status: OrderItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }

    pub fn order(mut self, order: ProductOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Two items are the same entity only once both are persisted with equal ids.
    pub fn same_entity(&self, other: &OrderItem) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map_or_else(|| "null".to_string(), |id| id.to_string());
        let quantity = self
            .quantity
            .map_or_else(|| "null".to_string(), |q| q.to_string());
        let status = self
            .status
            .map_or_else(|| "null".to_string(), |s| s.to_string());
        write!(f, "OrderItem{{id={id}, quantity={quantity}, status='{status}'}}")
    }
}
