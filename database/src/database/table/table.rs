use std::collections::HashMap;

use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::{
        action::{Action, ActionResult},
        person::Person,
    },
};

use super::row::RollbackAction;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyErrors {
    // CRUD - UPDATE
    #[error("Cannot update, record does not exist: {0}")]
    CannotUpdateDoesNotExist(PersonId),

    // CRUD - DELETE
    #[error("Cannot delete, record does not exist: {0}")]
    CannotDeleteDoesNotExist(PersonId),
}

/// The result of a successfully applied action, alongside the undo record the
/// database needs should the surrounding transaction roll back
#[derive(Debug)]
pub struct AppliedAction {
    pub result: ActionResult,
    pub undo: RollbackAction,
}

pub struct PersonTable {
    pub person_rows: HashMap<PersonId, Person>,
    next_person_id: u64,
}

impl PersonTable {
    pub fn new() -> Self {
        Self {
            person_rows: HashMap::<PersonId, Person>::new(),
            next_person_id: 1,
        }
    }

    // Each action is broken up into 2 steps
    //  - Verifying validity (row existence)
    //  - Applying the action, capturing the undo record
    pub fn apply(&mut self, action: Action) -> Result<AppliedAction, ApplyErrors> {
        let applied_action = match action {
            Action::Add(new_person) => {
                let id = PersonId(self.next_person_id);
                self.next_person_id += 1;

                let person = Person::new(
                    id,
                    new_person.first_name,
                    new_person.last_name,
                    new_person.phone,
                );

                self.person_rows.insert(id, person.clone());

                AppliedAction {
                    result: ActionResult::Single(person),
                    undo: RollbackAction::RemoveAdded(id),
                }
            }
            Action::Update(id, update_person) => {
                let person_row = self
                    .person_rows
                    .get_mut(&id)
                    .ok_or(ApplyErrors::CannotUpdateDoesNotExist(id))?;

                let previous = person_row.clone();

                person_row.first_name = update_person.first_name;
                person_row.last_name = update_person.last_name;
                person_row.phone = update_person.phone;

                AppliedAction {
                    result: ActionResult::Single(person_row.clone()),
                    undo: RollbackAction::RestoreUpdated(previous),
                }
            }
            Action::Remove(id) => {
                let previous = self
                    .person_rows
                    .remove(&id)
                    .ok_or(ApplyErrors::CannotDeleteDoesNotExist(id))?;

                AppliedAction {
                    result: ActionResult::Single(previous.clone()),
                    undo: RollbackAction::RestoreRemoved(previous),
                }
            }
            Action::Get(id) => {
                // Existence policy for reads belongs to the caller, a missing row
                // is not an error at this layer
                let person = self.person_rows.get(&id).cloned();

                AppliedAction {
                    result: ActionResult::GetSingle(person),
                    undo: RollbackAction::None,
                }
            }
            Action::List => {
                let people: Vec<Person> = self.person_rows.values().cloned().collect();

                AppliedAction {
                    result: ActionResult::List(people),
                    undo: RollbackAction::None,
                }
            }
            Action::Count => AppliedAction {
                result: ActionResult::Count(self.person_rows.len()),
                undo: RollbackAction::None,
            },
        };

        Ok(applied_action)
    }

    pub fn apply_rollback(&mut self, undo: RollbackAction) {
        match undo {
            RollbackAction::RemoveAdded(id) => {
                self.person_rows
                    .remove(&id)
                    .expect("row should exist because there is a rollback");

                // Rollbacks run in reverse apply order, so the released id is
                // always the most recently assigned one
                self.next_person_id = id.to_number();
            }
            RollbackAction::RestoreUpdated(previous) => {
                self.person_rows.insert(previous.id, previous);
            }
            RollbackAction::RestoreRemoved(previous) => {
                self.person_rows.insert(previous.id, previous);
            }
            RollbackAction::None => {}
        }
    }
}
