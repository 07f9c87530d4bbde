// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{days_ago, new_employee};
use crate::{Persistence, PersistenceError};
use cadence_domain::EmployeeRole;
use std::path::PathBuf;

#[test]
fn test_in_memory_database_enforces_foreign_keys() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.verify_foreign_key_enforcement().unwrap();

    let orphan = new_employee(4242, "Avery Adams", EmployeeRole::TeamMember, 120, None);
    let result = persistence.create_employee(&orphan);
    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = Persistence::new_in_memory().unwrap();
    let mut second = Persistence::new_in_memory().unwrap();

    let store_id = first.create_store("Downtown").unwrap();

    assert!(first.store_exists(store_id).unwrap());
    assert!(!second.store_exists(store_id).unwrap());
}

#[test]
fn test_template_requires_existing_store() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let result = persistence.create_template(99, "Quarterly Review", true, days_ago(1));
    assert!(result.is_err());
}

#[test]
fn test_file_database_survives_reopen() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "cadence_persistence_test_{}.db",
        std::process::id()
    ));
    let cleanup = |path: &PathBuf| {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    };
    cleanup(&path);

    let store_id = {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence.create_store("Uptown").unwrap()
    };

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert!(reopened.store_exists(store_id).unwrap());

    drop(reopened);
    cleanup(&path);
}
