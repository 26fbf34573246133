use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use budgetwise::{
    PasswordHash, Role, ValidatedPassword, create_user, get_user_by_email, initialize_db,
};

/// A utility for creating a user account from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address for the new account.
    #[arg(long)]
    email: String,

    /// Create the account with the administrator role.
    #[arg(long, default_value_t = false)]
    admin: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    if get_user_by_email(&args.email, &connection).is_ok() {
        print_error(format!("A user with the email {} already exists.", args.email));
        exit(1);
    }

    let password_hash = match read_password_hash() {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    let role = if args.admin { Role::Admin } else { Role::User };
    let user = create_user(&args.email, password_hash, role, &connection)?;

    println!("Created {} account for {}.", user.role, user.email);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }
}

/// Prompt for a password twice and hash it.
///
/// Returns `None` if the user aborts the prompt with end-of-file.
fn read_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                continue;
            }
        };

        let validated_password = match ValidatedPassword::new(&first_password) {
            Ok(password) => password,
            Err(error) => {
                print_error(format!("{error}"));
                continue;
            }
        };

        let second_password = match rpassword::prompt_password("Confirm the password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                continue;
            }
        };

        if first_password != second_password {
            print_error("Passwords do not match.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}"));
                continue;
            }
        }
    }
}

fn print_error(message: impl AsRef<str>) {
    eprintln!("Error: {}", message.as_ref());
}
