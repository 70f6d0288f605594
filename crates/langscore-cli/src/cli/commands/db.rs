use langscore_core::storage::store::UserRow;

use super::{exit_codes, open_store};
use crate::cli::args::{DbArgs, DbSub};

pub fn run(args: DbArgs) -> anyhow::Result<i32> {
    match args.cmd {
        DbSub::Init { db } => {
            open_store(&db)?;
            eprintln!("initialised {}", db.display());
        }
        DbSub::Clear { db } => {
            let store = open_store(&db)?;
            store.clear_schema()?;
            tracing::info!(event = "langscore.db.cleared", db = %db.display());
            eprintln!("cleared {}", db.display());
        }
        DbSub::AddUser {
            db,
            id,
            email,
            staff,
        } => {
            let store = open_store(&db)?;
            if store.user_exists(id)? {
                eprintln!("user {} already exists", id);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            store.insert_user(&UserRow {
                id,
                email,
                is_active: true,
                is_staff: staff,
                is_superuser: false,
                last_login: None,
            })?;
            eprintln!("added user {}", id);
        }
    }
    Ok(exit_codes::OK)
}
