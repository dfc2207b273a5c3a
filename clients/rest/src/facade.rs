use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use database::{
    consts::consts::PersonId,
    database::{
        request_manager::{RequestManager, RequestManagerError},
        table::{
            row::{NewPersonData, UpdatePersonData},
            table::ApplyErrors,
        },
    },
};

use crate::dto::{ErrorDto, PersonDto, PersonsDto};

const NO_PERSON_FOUND: &str = "No person with provided id found";
const CANNOT_DELETE: &str = "Could not delete, provided id does not exist";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FacadeError {
    #[error("First name and/or last name is missing")]
    MissingInput,
    #[error("{0}")]
    NotFound(String),
    #[error("storage request failed: {0}")]
    Storage(RequestManagerError),
}

impl ResponseError for FacadeError {
    fn status_code(&self) -> StatusCode {
        match self {
            FacadeError::MissingInput => StatusCode::BAD_REQUEST,
            FacadeError::NotFound(_) => StatusCode::NOT_FOUND,
            FacadeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDto {
            message: self.to_string(),
        })
    }
}

/// Mediates between the HTTP handlers and the storage engine. One instance is
/// constructed in main and shared with every handler, each operation is a single
/// all-or-nothing transaction against the database thread
///
/// Validation order is fixed: input shape (MissingInput, 400) is checked before
/// row existence (NotFound, 404)
pub struct PersonFacade {
    request_manager: RequestManager,
}

impl PersonFacade {
    pub fn new(request_manager: RequestManager) -> Self {
        Self { request_manager }
    }

    pub fn add_person(
        &self,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<PersonDto, FacadeError> {
        validate_names(first_name, last_name)?;

        let person = self
            .request_manager
            .send_add(NewPersonData::new(
                first_name.to_string(),
                last_name.to_string(),
                phone.to_string(),
            ))
            .map_err(FacadeError::Storage)?;

        Ok(PersonDto::from_person(person))
    }

    pub fn get_person(&self, id: u64) -> Result<PersonDto, FacadeError> {
        let person = self
            .request_manager
            .send_get(PersonId(id))
            .map_err(FacadeError::Storage)?;

        match person {
            Some(person) => Ok(PersonDto::from_person(person)),
            None => Err(FacadeError::NotFound(NO_PERSON_FOUND.to_string())),
        }
    }

    pub fn get_all_persons(&self) -> Result<PersonsDto, FacadeError> {
        let persons = self
            .request_manager
            .send_list()
            .map_err(FacadeError::Storage)?;

        Ok(PersonsDto::from_persons(persons))
    }

    pub fn edit_person(&self, person: PersonDto) -> Result<PersonDto, FacadeError> {
        validate_names(&person.f_name, &person.l_name)?;

        let id = person
            .id
            .ok_or_else(|| FacadeError::NotFound(NO_PERSON_FOUND.to_string()))?;

        let update = UpdatePersonData::new(person.f_name, person.l_name, person.phone);

        match self.request_manager.send_update(PersonId(id), update) {
            Ok(updated) => Ok(PersonDto::from_person(updated)),
            Err(RequestManagerError::TransactionRollback(
                ApplyErrors::CannotUpdateDoesNotExist(_),
            )) => Err(FacadeError::NotFound(NO_PERSON_FOUND.to_string())),
            Err(err) => Err(FacadeError::Storage(err)),
        }
    }

    pub fn delete_person(&self, id: u64) -> Result<PersonDto, FacadeError> {
        match self.request_manager.send_remove(PersonId(id)) {
            Ok(removed) => Ok(PersonDto::from_person(removed)),
            Err(RequestManagerError::TransactionRollback(
                ApplyErrors::CannotDeleteDoesNotExist(_),
            )) => Err(FacadeError::NotFound(CANNOT_DELETE.to_string())),
            Err(err) => Err(FacadeError::Storage(err)),
        }
    }

    pub fn get_person_count(&self) -> Result<usize, FacadeError> {
        self.request_manager
            .send_count()
            .map_err(FacadeError::Storage)
    }
}

fn validate_names(first_name: &str, last_name: &str) -> Result<(), FacadeError> {
    if first_name.is_empty() || last_name.is_empty() {
        return Err(FacadeError::MissingInput);
    }

    Ok(())
}
