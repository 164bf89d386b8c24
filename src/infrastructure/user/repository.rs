//! User repository: atomic credential and session storage over redb.
//!
//! Every operation is one transaction. Mutations run inside a single write
//! transaction (redb allows at most one at a time process-wide), so the
//! repository itself holds no locks and caches nothing; each call re-reads
//! the record it mutates. Token validation also uses a write transaction
//! because it records liveness, which serializes validations with logins —
//! a throughput ceiling this design accepts.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, Table, TableDefinition};
use tracing::warn;

use crate::domain::user::{validate_credentials, AccessToken, User, UserView};
use crate::domain::DomainError;
use crate::infrastructure::auth::{AccessTokenGenerator, PasswordHasher};

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Open (creating if necessary) the database file backing the repository.
pub fn open_database(path: impl AsRef<Path>) -> Result<Database, DomainError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!("could not create the database directory: {}", e))
            })?;
        }
    }

    Database::create(path)
        .map_err(|e| DomainError::storage(format!("could not open the database: {}", e)))
}

/// Repository of user records and their login sessions.
pub struct UserRepository {
    db: Arc<Database>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_generator: Arc<dyn AccessTokenGenerator>,
}

impl Debug for UserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepository")
            .field("password_hasher", &self.password_hasher)
            .field("token_generator", &self.token_generator)
            .finish_non_exhaustive()
    }
}

impl UserRepository {
    /// Create a repository, ensuring the users table exists. Safe to call
    /// against a database that already has the table.
    pub fn new(
        db: Arc<Database>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_generator: Arc<dyn AccessTokenGenerator>,
    ) -> Result<Self, DomainError> {
        let txn = db
            .begin_write()
            .map_err(|e| DomainError::storage(format!("could not begin a transaction: {}", e)))?;

        txn.open_table(USERS)
            .map_err(|e| DomainError::storage(format!("could not create the users table: {}", e)))?;

        txn.commit()
            .map_err(|e| DomainError::storage(format!("could not commit the transaction: {}", e)))?;

        Ok(Self {
            db,
            password_hasher,
            token_generator,
        })
    }

    /// Register the sole initial user.
    ///
    /// Succeeds only while the store holds no users at all; any later call
    /// fails with a conflict regardless of the requested username. The
    /// emptiness check and the insert share one write transaction, so two
    /// concurrent calls cannot both observe an empty store.
    pub fn register_initial(&self, username: &str, password: &str) -> Result<(), DomainError> {
        validate_credentials(username, password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.password_hasher.hash(password)?;
        let payload = encode_user(&User::new(username, password_hash))?;

        let txn = self.begin_write()?;
        {
            let mut table = open_users(&txn)?;

            let empty = table
                .is_empty()
                .map_err(|e| DomainError::storage(format!("could not inspect the users table: {}", e)))?;
            if !empty {
                return Err(DomainError::conflict("there are existing users"));
            }

            table
                .insert(username, payload.as_slice())
                .map_err(|e| DomainError::storage(format!("could not write the user record: {}", e)))?;
        }
        commit(txn)
    }

    /// Authenticate a user and open a new session.
    ///
    /// Returns the freshly minted token only when the whole
    /// read-verify-append-write sequence commits; any failure leaves the
    /// stored record untouched.
    pub fn login(&self, username: &str, password: &str) -> Result<AccessToken, DomainError> {
        validate_credentials(username, password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let txn = self.begin_write()?;
        let token = {
            let mut table = open_users(&txn)?;

            let mut user = match read_user(&table, username)? {
                Some(user) => user,
                None => {
                    warn!(username = %username, "login attempt for an unknown user");
                    return Err(DomainError::Unauthorized);
                }
            };

            if !self.password_hasher.verify(password, user.password_hash()) {
                warn!(username = %username, "login attempt with invalid credentials");
                return Err(DomainError::Unauthorized);
            }

            let token = self.token_generator.generate(username)?;
            user.append_session(token.clone());
            write_user(&mut table, &user)?;
            token
        };
        commit(txn)?;

        Ok(token)
    }

    /// Validate a token and record that its session is alive.
    ///
    /// Returns a view holding the username only. Unresolvable tokens,
    /// unknown users and tokens matching no stored session all surface as
    /// the same unauthorized error; the distinction is only logged.
    pub fn check_access_token(&self, token: &AccessToken) -> Result<UserView, DomainError> {
        let username = match self.token_generator.resolve_username(token) {
            Ok(username) => username,
            Err(e) => {
                warn!(error = %e, "could not resolve the token");
                return Err(DomainError::Unauthorized);
            }
        };

        let txn = self.begin_write()?;
        let view = {
            let mut table = open_users(&txn)?;

            let mut user = match read_user(&table, &username)? {
                Some(user) => user,
                None => {
                    warn!(username = %username, "token resolved to an unknown user");
                    return Err(DomainError::Unauthorized);
                }
            };

            if !user.touch_session(token) {
                warn!(username = %username, "token does not match any session");
                return Err(DomainError::Unauthorized);
            }

            write_user(&mut table, &user)?;
            user.to_view()
        };
        commit(txn)?;

        Ok(view)
    }

    /// Close the session opened for `token`.
    ///
    /// Logout is idempotent: a token that resolves to a known user but
    /// matches no stored session succeeds without writing. Unresolvable
    /// tokens and unknown users are unauthorized, same as validation.
    pub fn logout(&self, token: &AccessToken) -> Result<(), DomainError> {
        let username = match self.token_generator.resolve_username(token) {
            Ok(username) => username,
            Err(e) => {
                warn!(error = %e, "could not resolve the token");
                return Err(DomainError::Unauthorized);
            }
        };

        let txn = self.begin_write()?;
        {
            let mut table = open_users(&txn)?;

            let mut user = match read_user(&table, &username)? {
                Some(user) => user,
                None => {
                    warn!(username = %username, "token resolved to an unknown user");
                    return Err(DomainError::Unauthorized);
                }
            };

            if user.remove_session(token) {
                write_user(&mut table, &user)?;
            }
        }
        commit(txn)
    }

    /// Number of registered users, read from a snapshot.
    pub fn count(&self) -> Result<u64, DomainError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| DomainError::storage(format!("could not begin a read transaction: {}", e)))?;

        let table = txn
            .open_table(USERS)
            .map_err(|e| DomainError::storage(format!("could not open the users table: {}", e)))?;

        table
            .len()
            .map_err(|e| DomainError::storage(format!("could not count the user records: {}", e)))
    }

    fn begin_write(&self) -> Result<redb::WriteTransaction, DomainError> {
        self.db
            .begin_write()
            .map_err(|e| DomainError::storage(format!("could not begin a transaction: {}", e)))
    }
}

fn open_users<'txn>(
    txn: &'txn redb::WriteTransaction,
) -> Result<Table<'txn, &'static str, &'static [u8]>, DomainError> {
    txn.open_table(USERS)
        .map_err(|e| DomainError::storage(format!("could not open the users table: {}", e)))
}

fn commit(txn: redb::WriteTransaction) -> Result<(), DomainError> {
    txn.commit()
        .map_err(|e| DomainError::storage(format!("could not commit the transaction: {}", e)))
}

fn read_user<T>(table: &T, username: &str) -> Result<Option<User>, DomainError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let Some(guard) = table
        .get(username)
        .map_err(|e| DomainError::storage(format!("could not read the user record: {}", e)))?
    else {
        return Ok(None);
    };

    let user = serde_json::from_slice(guard.value())
        .map_err(|e| DomainError::serialization(format!("could not decode the user record: {}", e)))?;

    Ok(Some(user))
}

fn write_user(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    user: &User,
) -> Result<(), DomainError> {
    let payload = encode_user(user)?;

    table
        .insert(user.username(), payload.as_slice())
        .map_err(|e| DomainError::storage(format!("could not write the user record: {}", e)))?;

    Ok(())
}

fn encode_user(user: &User) -> Result<Vec<u8>, DomainError> {
    serde_json::to_vec(user)
        .map_err(|e| DomainError::serialization(format!("could not encode the user record: {}", e)))
}
