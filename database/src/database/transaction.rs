use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::prelude::*;
use std::path::PathBuf;

use crate::consts::consts::TransactionId;
use crate::model::action::Action;

#[derive(Serialize, Deserialize, Debug)]
pub enum TransactionStatus {
    Committed,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Transaction {
    pub id: TransactionId,
    pub actions: Vec<Action>,
    pub status: TransactionStatus,
}

/// Append-only log of committed transactions, one JSON line each. Replaying the
/// log in order reproduces the table, including id assignment
#[derive(Debug)]
pub struct TransactionWAL {
    log_file: File,
    current_transaction_id: TransactionId,
}

fn get_transaction_log_location(data_directory: PathBuf) -> PathBuf {
    // Defaults to $CWD/data/transaction_log.json, but $CWD/data can be overridden via the CLI
    data_directory.join("transaction_log.json")
}

impl TransactionWAL {
    pub fn new(data_directory: PathBuf) -> Self {
        fs::create_dir_all(&data_directory)
            .expect("Should always be able to create a path at data/");

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(get_transaction_log_location(data_directory))
            .expect("Cannot open transaction log file");

        Self {
            log_file,
            current_transaction_id: TransactionId::new_first_transaction(),
        }
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn commit(
        &mut self,
        applied_transaction_id: TransactionId,
        actions: Vec<Action>,
        restore: bool,
    ) {
        // We do not need to write back to the WAL if we are restoring the database
        if !restore {
            let transaction_json_line = format!(
                "{}\n",
                serde_json::to_string(&Transaction {
                    id: applied_transaction_id.clone(),
                    actions,
                    status: TransactionStatus::Committed,
                })
                .expect("should serialize the transaction")
            );

            self.log_file
                .write_all(transaction_json_line.as_bytes())
                .expect("should write the committed transaction to the log");
        }

        self.current_transaction_id = applied_transaction_id;
    }

    pub fn restore(data_directory: PathBuf) -> Vec<Transaction> {
        let mut file = match File::open(get_transaction_log_location(data_directory)) {
            Ok(file) => file,
            Err(_) => return vec![],
        };

        let mut contents = String::new();

        file.read_to_string(&mut contents)
            .expect("should read the transaction log");

        let mut transactions: Vec<Transaction> = vec![];

        for transaction_string in contents.split('\n') {
            if transaction_string.is_empty() {
                continue;
            }

            let transaction: Transaction = serde_json::from_str(transaction_string)
                .expect("log lines are written whole, they should parse back");

            transactions.push(transaction);
        }

        transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{consts::consts::PersonId, database::table::row::NewPersonData};

    fn test_data_directory() -> PathBuf {
        ["/", "tmp", "persondb", &uuid::Uuid::new_v4().to_string()]
            .iter()
            .collect()
    }

    #[test]
    fn committed_transactions_survive_a_restore() {
        let data_directory = test_data_directory();

        let mut wal = TransactionWAL::new(data_directory.clone());

        wal.commit(
            TransactionId(1),
            vec![Action::Add(NewPersonData::new(
                "Bob".to_string(),
                "Hansen".to_string(),
                "13374200".to_string(),
            ))],
            false,
        );

        wal.commit(TransactionId(2), vec![Action::Remove(PersonId(1))], false);

        let restored = TransactionWAL::restore(data_directory);

        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].id, TransactionId(1));
        assert_eq!(restored[1].id, TransactionId(2));
        assert_eq!(restored[0].actions.len(), 1);
    }

    #[test]
    fn restore_commits_are_not_written_back_to_the_log() {
        let data_directory = test_data_directory();

        let mut wal = TransactionWAL::new(data_directory.clone());

        wal.commit(
            TransactionId(1),
            vec![Action::Add(NewPersonData::new(
                "Bob".to_string(),
                "Hansen".to_string(),
                "13374200".to_string(),
            ))],
            true,
        );

        assert_eq!(wal.get_current_transaction_id(), &TransactionId(1));
        assert!(TransactionWAL::restore(data_directory).is_empty());
    }

    #[test]
    fn restore_of_a_missing_log_is_empty() {
        assert!(TransactionWAL::restore(test_data_directory()).is_empty());
    }
}
