use serde::{Deserialize, Serialize};

use crate::{consts::consts::PersonId, model::person::Person};

/// Row contents before the table has assigned an id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewPersonData {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl NewPersonData {
    pub fn new(first_name: String, last_name: String, phone: String) -> Self {
        NewPersonData {
            first_name,
            last_name,
            phone,
        }
    }
}

/// An update overwrites every mutable column. The id is not part of the update
/// because it can never change
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdatePersonData {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl UpdatePersonData {
    pub fn new(first_name: String, last_name: String, phone: String) -> Self {
        UpdatePersonData {
            first_name,
            last_name,
            phone,
        }
    }
}

/// What the table has to do to reverse a single applied action, rollbacks are
/// performed in reverse apply order
#[derive(Debug)]
pub enum RollbackAction {
    /// A rolled back insert also releases the id it was assigned
    RemoveAdded(PersonId),
    RestoreUpdated(Person),
    RestoreRemoved(Person),
    /// Reads mutate nothing
    None,
}
