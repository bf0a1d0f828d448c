//! Durable learned memory: `(attribute-kind, language)` namespaces of
//! verbatim-key → canonical-value entries.

mod store;

pub use store::MemoryStore;

use std::fmt;

/// Attribute kinds resolved by the engine, one memory namespace each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    Brand,
    Type,
    Model,
    Category,
    StockStatus,
    VariantName,
}

impl AttributeKind {
    /// Every namespace, in resolution order
    pub const ALL: [AttributeKind; 6] = [
        AttributeKind::Brand,
        AttributeKind::Type,
        AttributeKind::Model,
        AttributeKind::Category,
        AttributeKind::StockStatus,
        AttributeKind::VariantName,
    ];

    /// Namespace file stem, e.g. `ProductBrandMemory` → `ProductBrandMemory_CS.csv`
    pub fn file_stem(&self) -> &'static str {
        match self {
            AttributeKind::Brand => "ProductBrandMemory",
            AttributeKind::Type => "ProductTypeMemory",
            AttributeKind::Model => "ProductModelMemory",
            AttributeKind::Category => "CategoryMemory",
            AttributeKind::StockStatus => "StockStatusMemory",
            AttributeKind::VariantName => "VariantNameMemory",
        }
    }

    /// Human-readable label used in prompts and reports
    pub fn label(&self) -> &'static str {
        match self {
            AttributeKind::Brand => "brand",
            AttributeKind::Type => "product type",
            AttributeKind::Model => "product model",
            AttributeKind::Category => "category",
            AttributeKind::StockStatus => "stock status",
            AttributeKind::VariantName => "variant name",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Uppercase language code, e.g. `CS`, `SK`, `DE`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One learned mapping: verbatim source key → canonical Czech value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Source string exactly as scraped. Never normalized, never case-folded;
    /// lookups are byte-for-byte.
    pub key: String,
    /// Canonical resolved attribute value
    pub value: String,
}
