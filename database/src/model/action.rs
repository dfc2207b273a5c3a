use serde::{Deserialize, Serialize};

use crate::{
    consts::consts::PersonId,
    database::table::row::{NewPersonData, UpdatePersonData},
};

use super::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Action {
    /// Inserts a new row, the table assigns the id
    Add(NewPersonData),
    /// Overwrites first name, last name and phone of an existing row
    Update(PersonId, UpdatePersonData),
    Remove(PersonId),
    Get(PersonId),
    List,
    Count,
}

impl Action {
    pub fn is_mutation(&self) -> bool {
        match self {
            Action::Add(_) | Action::Remove(_) | Action::Update(_, _) => true,
            Action::List | Action::Count | Action::Get(_) => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ActionResult {
    /// Used for database status messages
    SuccessStatus(String),
    Single(Person),
    GetSingle(Option<Person>),
    List(Vec<Person>),
    Count(usize),
}

impl ActionResult {
    pub fn single(self) -> Person {
        if let ActionResult::Single(p) = self {
            p
        } else {
            panic!("Action result is not of type Single")
        }
    }

    pub fn get_single(self) -> Option<Person> {
        if let ActionResult::GetSingle(p) = self {
            p
        } else {
            panic!("Action result is not of type GetSingle")
        }
    }

    pub fn list(self) -> Vec<Person> {
        if let ActionResult::List(l) = self {
            l
        } else {
            panic!("Action result is not of type List")
        }
    }

    pub fn count(self) -> usize {
        if let ActionResult::Count(c) = self {
            c
        } else {
            panic!("Action result is not of type Count")
        }
    }

    pub fn success_status(self) -> String {
        if let ActionResult::SuccessStatus(s) = self {
            s
        } else {
            panic!("Action result is not of type SuccessStatus")
        }
    }
}
