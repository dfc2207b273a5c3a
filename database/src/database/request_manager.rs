use std::{sync::mpsc::Sender, time::Duration};
use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::{
        action::{Action, ActionResult},
        person::Person,
    },
};

use super::table::{
    row::{NewPersonData, UpdatePersonData},
    table::ApplyErrors,
};

#[derive(Debug)]
pub enum DatabaseRequestAction {
    Request(Vec<Action>),
    Shutdown,
}

impl DatabaseRequestAction {
    /// Prints multi-action transactions in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseRequestAction::Request(actions) if actions.len() > 1 => {
                format!("{:#?}", self)
            }
            _ => format!("{:?}", self),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DatabaseResponseAction {
    Response(Vec<ActionResult>),
    TransactionRollback(ApplyErrors),
}

impl DatabaseResponseAction {
    pub fn new_single_response(action_result: ActionResult) -> Self {
        DatabaseResponseAction::Response(vec![action_result])
    }

    pub fn new_multiple_response(action_results: Vec<ActionResult>) -> Self {
        DatabaseResponseAction::Response(action_results)
    }
}

pub struct DatabaseRequest {
    pub response_sender: oneshot::Sender<DatabaseResponseAction>,
    pub action: DatabaseRequestAction,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestManagerError {
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,
    #[error("Rolled back transaction: {0}")]
    TransactionRollback(ApplyErrors),
}

/// Goal of the request manager is to provide a simple interface for interacting with the database
///
/// The request manager provides the following APIs, sorted by the easiest to use to the most complex
/// 1. CRUD operations on a single person -- these are completely type safe
/// 2. Generic action based API -- not type safe because you need to know what Action maps to what
///    ActionResult (e.g. Action::Add maps -> ActionResult::Single)
/// 3. Transaction based API -- like the action API, but sends multiple actions to the database at once,
///    committed all-or-nothing
#[derive(Clone)]
pub struct RequestManager {
    database_sender: Sender<DatabaseRequest>,
}

impl RequestManager {
    pub fn new(database_sender: Sender<DatabaseRequest>) -> Self {
        Self { database_sender }
    }

    pub fn send_add(&self, new_person: NewPersonData) -> Result<Person, RequestManagerError> {
        let action_result = self.send_single_action(Action::Add(new_person))?;
        Ok(action_result.single())
    }

    pub fn send_update(
        &self,
        id: PersonId,
        person_update: UpdatePersonData,
    ) -> Result<Person, RequestManagerError> {
        let action_result = self.send_single_action(Action::Update(id, person_update))?;
        Ok(action_result.single())
    }

    pub fn send_get(&self, id: PersonId) -> Result<Option<Person>, RequestManagerError> {
        let action_result = self.send_single_action(Action::Get(id))?;
        Ok(action_result.get_single())
    }

    pub fn send_remove(&self, id: PersonId) -> Result<Person, RequestManagerError> {
        let action_result = self.send_single_action(Action::Remove(id))?;
        Ok(action_result.single())
    }

    pub fn send_list(&self) -> Result<Vec<Person>, RequestManagerError> {
        let action_result = self.send_single_action(Action::List)?;
        Ok(action_result.list())
    }

    pub fn send_count(&self) -> Result<usize, RequestManagerError> {
        let action_result = self.send_single_action(Action::Count)?;
        Ok(action_result.count())
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        let single_action_result = self
            .send_database_request(DatabaseRequestAction::Shutdown)?
            .pop()
            .expect("single action should generate single response");

        Ok(single_action_result.success_status())
    }

    /// Sends a single action to the database and returns a single action result
    pub fn send_single_action(&self, action: Action) -> Result<ActionResult, RequestManagerError> {
        let single_action_result = self
            .send_database_request(DatabaseRequestAction::Request(vec![action]))?
            .pop()
            .expect("single action should generate single response");

        Ok(single_action_result)
    }

    /// Used to create a transaction
    pub fn send_transaction(
        &self,
        actions: Vec<Action>,
    ) -> Result<Vec<ActionResult>, RequestManagerError> {
        self.send_database_request(DatabaseRequestAction::Request(actions))
    }

    pub fn send_database_request(
        &self,
        database_request: DatabaseRequestAction,
    ) -> Result<Vec<ActionResult>, RequestManagerError> {
        let (response_sender, response_receiver) = oneshot::channel::<DatabaseResponseAction>();

        let request = DatabaseRequest {
            response_sender,
            action: database_request,
        };

        // Sends the request to the database worker, database will respond
        //  on the response_receiver once it's finished processing its request
        self.database_sender.send(request).unwrap();

        match response_receiver.recv_timeout(Duration::from_secs(2)) {
            Ok(DatabaseResponseAction::Response(action_response)) => Ok(action_response),
            Ok(DatabaseResponseAction::TransactionRollback(err)) => {
                Err(RequestManagerError::TransactionRollback(err))
            }
            Err(oneshot::RecvTimeoutError::Timeout) => Err(RequestManagerError::DatabaseTimeout),
            Err(oneshot::RecvTimeoutError::Disconnected) => panic!("Processor exited"),
        }
    }
}
