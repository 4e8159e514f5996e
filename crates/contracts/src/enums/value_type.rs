use serde::{Deserialize, Serialize};
use std::fmt;

/// Тип значения метаполя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetafieldValueType {
    String,
    Text,
    Json,
    Number,
    Boolean,
    Enum,
    Date,
    DateTime,
    Color,
}

impl MetafieldValueType {
    /// Код типа (совпадает с сериализацией)
    pub fn code(&self) -> &'static str {
        match self {
            MetafieldValueType::String => "string",
            MetafieldValueType::Text => "text",
            MetafieldValueType::Json => "json",
            MetafieldValueType::Number => "number",
            MetafieldValueType::Boolean => "boolean",
            MetafieldValueType::Enum => "enum",
            MetafieldValueType::Date => "date",
            MetafieldValueType::DateTime => "dateTime",
            MetafieldValueType::Color => "color",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MetafieldValueType::String => "Строка",
            MetafieldValueType::Text => "Многострочный текст",
            MetafieldValueType::Json => "JSON",
            MetafieldValueType::Number => "Число",
            MetafieldValueType::Boolean => "Да/Нет",
            MetafieldValueType::Enum => "Перечисление",
            MetafieldValueType::Date => "Дата",
            MetafieldValueType::DateTime => "Дата и время",
            MetafieldValueType::Color => "Цвет",
        }
    }

    pub fn all() -> Vec<MetafieldValueType> {
        vec![
            MetafieldValueType::String,
            MetafieldValueType::Text,
            MetafieldValueType::Json,
            MetafieldValueType::Number,
            MetafieldValueType::Boolean,
            MetafieldValueType::Enum,
            MetafieldValueType::Date,
            MetafieldValueType::DateTime,
            MetafieldValueType::Color,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "string" => Some(MetafieldValueType::String),
            "text" => Some(MetafieldValueType::Text),
            "json" => Some(MetafieldValueType::Json),
            "number" => Some(MetafieldValueType::Number),
            "boolean" => Some(MetafieldValueType::Boolean),
            "enum" => Some(MetafieldValueType::Enum),
            "date" => Some(MetafieldValueType::Date),
            "dateTime" => Some(MetafieldValueType::DateTime),
            "color" => Some(MetafieldValueType::Color),
            _ => None,
        }
    }

    /// Булевы метаполя никогда не бывают списками
    pub fn supports_list(&self) -> bool {
        !matches!(self, MetafieldValueType::Boolean)
    }
}

impl fmt::Display for MetafieldValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
