use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Instant,
};

use crate::model::action::{Action, ActionResult};

use super::{
    options::DatabaseOptions,
    request_manager::{
        DatabaseRequest, DatabaseRequestAction, DatabaseResponseAction, RequestManager,
    },
    table::{row::RollbackAction, table::PersonTable},
    transaction::TransactionWAL,
};

pub struct Database {
    person_table: PersonTable,
    transaction_wal: TransactionWAL,
    database_receiver: Receiver<DatabaseRequest>,
    database_options: DatabaseOptions,
}

impl Database {
    pub fn new(database_receiver: Receiver<DatabaseRequest>, options: DatabaseOptions) -> Self {
        Self {
            person_table: PersonTable::new(),
            transaction_wal: TransactionWAL::new(options.data_directory.clone()),
            database_receiver,
            database_options: options,
        }
    }

    /// Spawns the database on its own thread and returns a cloneable handle for
    /// sending it requests
    pub fn start(options: DatabaseOptions) -> RequestManager {
        let (database_sender, database_receiver): (
            Sender<DatabaseRequest>,
            Receiver<DatabaseRequest>,
        ) = mpsc::channel();

        thread::spawn(move || {
            Database::new(database_receiver, options).run();
        });

        RequestManager::new(database_sender)
    }

    pub fn run(&mut self) {
        log::info!(
            "📀 Transaction log location: [{}]",
            self.database_options.data_directory.display()
        );

        if self.database_options.restore {
            self.restore_from_wal();
        }

        // Process incoming requests from the channel, a disconnect means every
        // request manager has been dropped and nothing more will arrive
        loop {
            let Ok(DatabaseRequest {
                action,
                response_sender,
            }) = self.database_receiver.recv()
            else {
                return;
            };

            log::info!("Received request: {}", action.log_format());

            let process_action = match action {
                DatabaseRequestAction::Request(action) => action,
                DatabaseRequestAction::Shutdown => {
                    let _ = response_sender.send(DatabaseResponseAction::new_single_response(
                        ActionResult::SuccessStatus("Successfully shutdown database".to_string()),
                    ));

                    return;
                }
            };

            let action_response = self.process_actions(process_action, false);

            // Sends the response data back to the caller of the request (i.e.), the entity on the other end of the channel
            response_sender
                .send(action_response)
                .expect("Should always be able to send a response back to the caller")
        }
    }

    fn restore_from_wal(&mut self) {
        let now = Instant::now();

        let restored_transactions =
            TransactionWAL::restore(self.database_options.data_directory.clone());
        let restored_transaction_count = restored_transactions.len();

        for transaction in restored_transactions {
            if let DatabaseResponseAction::TransactionRollback(err) =
                self.process_actions(transaction.actions, true)
            {
                panic!("Should not be able to rollback a transaction on startup: {err}");
            }
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms, TransactionsApplied: {}, Rows: {}, CurrentTxId: {}]",
            now.elapsed().as_millis(),
            restored_transaction_count,
            self.person_table.person_rows.len(),
            self.transaction_wal.get_current_transaction_id(),
        );
    }

    pub fn process_action(&mut self, user_action: Action, restore: bool) -> DatabaseResponseAction {
        let results = self.process_actions(vec![user_action], restore);

        if let DatabaseResponseAction::Response(mut results) = results {
            return DatabaseResponseAction::new_single_response(
                results
                    .pop()
                    .expect("should exist due to process_actions returning the same length"),
            );
        }

        // Transaction rollback
        results
    }

    /// Applies a set of actions all-or-nothing, on the first failure every
    /// already-applied action is reversed in reverse order and nothing reaches
    /// the transaction log
    pub fn process_actions(
        &mut self,
        user_actions: Vec<Action>,
        restore: bool,
    ) -> DatabaseResponseAction {
        let applying_transaction_id = self
            .transaction_wal
            .get_current_transaction_id()
            .increment();

        let mut action_results: Vec<ActionResult> = Vec::new();
        let mut undo_stack: Vec<RollbackAction> = Vec::new();
        let mut rollback_error = None;

        for action in user_actions.clone() {
            match self.person_table.apply(action) {
                Ok(applied) => {
                    action_results.push(applied.result);
                    undo_stack.push(applied.undo);
                }
                Err(err) => {
                    rollback_error = Some(err);
                    break;
                }
            }
        }

        match rollback_error {
            None => {
                // Read-only transactions do not consume a transaction id and are
                // not written to the WAL
                if user_actions.iter().any(Action::is_mutation) {
                    if !restore {
                        log::info!("✅ Committed: [TX: {}]", &applying_transaction_id);
                    }

                    self.transaction_wal
                        .commit(applying_transaction_id, user_actions, restore);
                }

                DatabaseResponseAction::new_multiple_response(action_results)
            }
            Some(err) => {
                if !restore {
                    log::info!("⚠️  Rolled back: [TX: {}]", &applying_transaction_id);
                }

                for undo in undo_stack.into_iter().rev() {
                    self.person_table.apply_rollback(undo);
                }

                DatabaseResponseAction::TransactionRollback(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crate::{
        consts::consts::{PersonId, TransactionId},
        database::{
            options::DatabaseOptions,
            request_manager::DatabaseResponseAction,
            table::{
                row::{NewPersonData, UpdatePersonData},
                table::ApplyErrors,
            },
        },
        model::action::{Action, ActionResult},
    };

    use super::Database;

    fn new_test_database() -> Database {
        let (_, database_receiver) = mpsc::channel();

        Database::new(database_receiver, DatabaseOptions::new_test())
    }

    fn new_person_data(first_name: &str, last_name: &str, phone: &str) -> NewPersonData {
        NewPersonData::new(
            first_name.to_string(),
            last_name.to_string(),
            phone.to_string(),
        )
    }

    mod add {
        use super::*;

        #[test]
        fn add_happy_path() {
            let mut database = new_test_database();

            let action_result =
                database.process_action(Action::Add(new_person_data("Bob", "Hansen", "13374200")), false);

            let DatabaseResponseAction::Response(results) = action_result else {
                panic!("should commit");
            };

            let person = results.into_iter().next().unwrap().single();

            assert_eq!(person.id, PersonId(1));
            assert_eq!(person.first_name, "Bob");
        }

        #[test]
        fn add_multiple_transaction() {
            let mut database = new_test_database();

            let action_results = database.process_actions(
                vec![
                    Action::Add(new_person_data("Bob", "Hansen", "13374200")),
                    Action::Add(new_person_data("Jafar", "Habibti", "69696969")),
                ],
                false,
            );

            let DatabaseResponseAction::Response(results) = action_results else {
                panic!("should commit");
            };

            let ids: Vec<PersonId> = results.into_iter().map(|r| r.single().id).collect();

            assert_eq!(ids, vec![PersonId(1), PersonId(2)]);
        }
    }

    mod transaction_rollback {
        use super::*;

        fn rollback_actions() -> Vec<Action> {
            vec![
                Action::Add(new_person_data("Bob", "Hansen", "13374200")),
                Action::Update(
                    PersonId(999),
                    UpdatePersonData::new("a".to_string(), "b".to_string(), "c".to_string()),
                ),
            ]
        }

        #[test]
        fn rollback_response() {
            // Given an empty database
            let mut database = new_test_database();

            // When a transaction fails half way through
            let response = database.process_actions(rollback_actions(), false);

            // Then the caller is told why the transaction was rolled back
            assert_eq!(
                response,
                DatabaseResponseAction::TransactionRollback(
                    ApplyErrors::CannotUpdateDoesNotExist(PersonId(999))
                )
            );
        }

        #[test]
        fn row_table_is_empty() {
            let mut database = new_test_database();

            let _ = database.process_actions(rollback_actions(), false);

            // The add at the start of the transaction was reversed
            assert_eq!(database.person_table.person_rows.len(), 0);
        }

        #[test]
        fn transaction_log_is_empty() {
            let mut database = new_test_database();

            let _ = database.process_actions(rollback_actions(), false);

            assert_eq!(
                database.transaction_wal.get_current_transaction_id(),
                &TransactionId::new_first_transaction(),
                "Transaction log should be empty"
            );
        }

        #[test]
        fn rolled_back_ids_are_reused() {
            let mut database = new_test_database();

            let _ = database.process_actions(rollback_actions(), false);

            let response = database
                .process_action(Action::Add(new_person_data("Jafar", "Habibti", "69696969")), false);

            let DatabaseResponseAction::Response(results) = response else {
                panic!("should commit");
            };

            assert_eq!(results.into_iter().next().unwrap().single().id, PersonId(1));
        }
    }

    mod reads {
        use super::*;

        #[test]
        fn reads_do_not_consume_transaction_ids() {
            let mut database = new_test_database();

            let _ = database.process_action(Action::List, false);
            let _ = database.process_action(Action::Count, false);

            assert_eq!(
                database.transaction_wal.get_current_transaction_id(),
                &TransactionId::new_first_transaction()
            );
        }

        #[test]
        fn count_and_list_observe_commits() {
            let mut database = new_test_database();

            let _ = database
                .process_action(Action::Add(new_person_data("Bob", "Hansen", "13374200")), false);

            let count = database.process_action(Action::Count, false);

            assert_eq!(
                count,
                DatabaseResponseAction::new_single_response(ActionResult::Count(1))
            );
        }
    }

    mod restore {
        use super::*;

        #[test]
        fn database_state_is_rebuilt_from_the_wal() {
            let options = DatabaseOptions::new_test().set_restore(true);

            // Given a database that committed two adds and one delete
            {
                let (_, database_receiver) = mpsc::channel();
                let mut database = Database::new(database_receiver, options.clone());

                let _ = database
                    .process_action(Action::Add(new_person_data("Bob", "Hansen", "13374200")), false);
                let _ = database
                    .process_action(Action::Add(new_person_data("Jafar", "Habibti", "69696969")), false);
                let _ = database.process_action(Action::Remove(PersonId(1)), false);
            }

            // When a fresh database restores from the same directory
            let (_, database_receiver) = mpsc::channel();
            let mut database = Database::new(database_receiver, options);

            database.restore_from_wal();

            // Then the surviving row is back, with the id it was originally assigned
            assert_eq!(database.person_table.person_rows.len(), 1);

            let person = database
                .person_table
                .person_rows
                .get(&PersonId(2))
                .expect("row two should have been restored");

            assert_eq!(person.first_name, "Jafar");
            assert_eq!(
                database.transaction_wal.get_current_transaction_id(),
                &TransactionId(3)
            );
        }
    }
}

pub mod test_utils {
    use crate::{
        database::{
            database::Database,
            options::DatabaseOptions,
            request_manager::RequestManager,
        },
        model::action::Action,
    };
    use std::thread::{self, JoinHandle};

    /// Spawns a database thread plus `worker_threads` request threads, each sending
    /// `actions` generated actions, and returns the request manager once every
    /// worker has finished
    pub fn database_test(
        worker_threads: usize,
        actions: u32,
        action_generator: fn(usize, u32) -> Action,
    ) -> RequestManager {
        let request_manager = Database::start(DatabaseOptions::new_test());

        let mut sender_threads: Vec<JoinHandle<()>> = vec![];

        for thread_id in 0..worker_threads {
            let rm = request_manager.clone();

            let sender_thread = thread::spawn(move || {
                for index in 0..actions {
                    let action = action_generator(thread_id, index);

                    rm.send_single_action(action).expect("Should not timeout");
                }
            });

            sender_threads.push(sender_thread);
        }

        for thread in sender_threads {
            thread.join().unwrap();
        }

        request_manager
    }
}

#[cfg(test)]
mod bulk_tests {
    use crate::database::table::row::NewPersonData;
    use crate::model::action::Action;

    use super::test_utils::database_test;

    #[test]
    fn concurrent_adds_are_all_committed() {
        let request_manager = database_test(3, 25, |thread_id, index| {
            Action::Add(NewPersonData::new(
                format!("First {}-{}", thread_id, index),
                format!("Last {}-{}", thread_id, index),
                format!("{}{}", thread_id, index),
            ))
        });

        assert_eq!(request_manager.send_count().expect("Should not timeout"), 75);

        let shutdown_response = request_manager
            .send_shutdown_request()
            .expect("Should not timeout");

        assert_eq!(shutdown_response, "Successfully shutdown database".to_string());
    }
}
