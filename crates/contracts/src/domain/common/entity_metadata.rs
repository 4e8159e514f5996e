use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Метаданные экземпляра агрегата (lifecycle tracking)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Дата создания записи, задаёт порядок в списках
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления
    pub updated_at: DateTime<Utc>,
    /// Счётчик сохранений
    pub version: i32,
}

impl EntityMetadata {
    /// Метаданные для нового агрегата
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Метаданные загруженной записи; отсутствующие даты заменяются текущим временем
    pub fn restore(
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
        version: i32,
    ) -> Self {
        let now = Utc::now();
        let created_at = created_at.unwrap_or(now);
        Self {
            created_at,
            updated_at: updated_at.unwrap_or(created_at),
            version,
        }
    }

    /// Обновить timestamp и версию перед записью
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}
