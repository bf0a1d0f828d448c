//! Heuristic attribute extractors.
//!
//! Two families with deliberately different semantics:
//!
//! - **First-match ordered rules** (brand, category, stock status, variant
//!   name): rules are tried in order and the first hit wins. Used where
//!   rule precedence encodes real-world priority.
//! - **Scored rules** (product type): every matching rule votes with a
//!   weight and the best-scoring type wins if it clears the threshold.
//!   Used where keywords are ambiguous across languages.
//!
//! All extractors are pure functions of their inputs. They never touch
//! memory or the network; the resolver layers them between memory lookup
//! and the oracle.

mod brand;
mod category;
mod model;
mod product_type;
mod stock_status;
mod variant_name;

pub use brand::extract_brand;
pub use category::{extract_category, DISCARD_CATEGORY};
pub use model::extract_model;
pub use product_type::{extract_type, extract_type_lenient};
pub use stock_status::extract_stock_status;
pub use variant_name::extract_variant_name;
