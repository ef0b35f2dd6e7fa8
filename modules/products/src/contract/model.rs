use chrono::{DateTime, Utc};

/// Stored product record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    /// Soft-delete marker. Stored and returned, never used to filter reads.
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

/// Full replacement of a product row; `date_modified` is stamped by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub date_created: DateTime<Utc>,
    pub deleted: bool,
}
