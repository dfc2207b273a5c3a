use database::model::person::Person;
use serde::{Deserialize, Serialize};

/// Transport projection of a person. The id is absent on create requests and
/// always present on responses. Absent string fields deserialize to "" so that
/// a sparse body reaches input validation instead of failing to parse
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonDto {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "fName", default)]
    pub f_name: String,
    #[serde(rename = "lName", default)]
    pub l_name: String,
    #[serde(default)]
    pub phone: String,
}

impl PersonDto {
    pub fn from_person(person: Person) -> PersonDto {
        PersonDto {
            id: Some(person.id.to_number()),
            f_name: person.first_name,
            l_name: person.last_name,
            phone: person.phone,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonsDto {
    pub all: Vec<PersonDto>,
}

impl PersonsDto {
    pub fn from_persons(persons: Vec<Person>) -> PersonsDto {
        PersonsDto {
            all: persons.into_iter().map(PersonDto::from_person).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CountDto {
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GreetingDto {
    pub msg: String,
}

/// Structured error body, `{"message": "..."}` with the HTTP status carried by
/// the response itself
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorDto {
    pub message: String,
}
