use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

/// A persisted person row. The id is assigned by the table at insert time and is
/// immutable for the lifetime of the row
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl Person {
    pub fn new(id: PersonId, first_name: String, last_name: String, phone: String) -> Self {
        Person {
            id,
            first_name,
            last_name,
            phone,
        }
    }
}
