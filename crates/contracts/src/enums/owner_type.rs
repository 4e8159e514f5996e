use serde::{Deserialize, Serialize};
use std::fmt;

/// Вид сущности, к которой привязываются метаполя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetafieldOwnerType {
    Customer,
    Product,
}

impl MetafieldOwnerType {
    /// Код для хранения и URL
    pub fn code(&self) -> &'static str {
        match self {
            MetafieldOwnerType::Customer => "customer",
            MetafieldOwnerType::Product => "product",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            MetafieldOwnerType::Customer => "Покупатель",
            MetafieldOwnerType::Product => "Товар",
        }
    }

    pub fn all() -> Vec<MetafieldOwnerType> {
        vec![MetafieldOwnerType::Customer, MetafieldOwnerType::Product]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "customer" => Some(MetafieldOwnerType::Customer),
            "product" => Some(MetafieldOwnerType::Product),
            _ => None,
        }
    }
}

impl fmt::Display for MetafieldOwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for owner in MetafieldOwnerType::all() {
            assert_eq!(MetafieldOwnerType::from_code(owner.code()), Some(owner));
        }
        assert_eq!(MetafieldOwnerType::from_code("order"), None);
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&MetafieldOwnerType::Product).unwrap();
        assert_eq!(json, "\"product\"");
    }
}
