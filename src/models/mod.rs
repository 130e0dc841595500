pub mod food;

pub use food::{remap_fields, FieldMapping, FOOD_DETAIL_FIELDS, FOOD_SALES_FIELDS};
