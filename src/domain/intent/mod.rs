//! Intent and field extraction from reasoning-backend output

pub mod extractor;
pub mod rules;

pub use extractor::{extract_fields, fields_from_value, LeadFields};
pub use rules::{classify, KeywordRule, RULES};
