pub mod handle;
pub mod token;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

pub use campus_events_shared::account::*;

/// The static instance of accounts.
pub static INSTANCE: Lazy<AccountManager> = Lazy::new(AccountManager::new);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("field {0} could not be empty")]
    FieldEmpty(&'static str),
    #[error(
        "password too weak, expected at least 8 characters \
         with upper, lower, digit and special ones"
    )]
    PasswordTooWeak,
    #[error("username or password incorrect")]
    UsernameOrPasswordIncorrect,
    #[error("password incorrect")]
    PasswordIncorrect,
    #[error("token incorrect")]
    TokenIncorrect,
    #[error("staff verification code incorrect")]
    StaffCodeIncorrect,
    #[error("account with target username already exists")]
    UsernameConflict,
    #[error("account with target email already exists")]
    EmailConflict,
    #[error("target username is reserved by an existing account")]
    UsernameReserved,
    #[error("administrator accounts could not be deleted")]
    ProtectedAccount,
    #[error("cannot operate accounts outside your department")]
    DepartmentMismatch,
    #[error("target account is not a student")]
    NotAStudent,
    #[error("permission denied")]
    PermissionDenied,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::FieldEmpty(_) | Error::PasswordTooWeak | Error::NotAStudent => {
                StatusCode::BAD_REQUEST
            }
            Error::UsernameConflict | Error::EmailConflict | Error::UsernameReserved => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::FORBIDDEN,
        }
    }
}

/// Hash a username into an account id.
pub fn id_of(username: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    username.hash(&mut hasher);
    hasher.finish()
}

/// Represents a registered account of the campus portal.
#[derive(Serialize, Deserialize, Debug)]
pub struct Account {
    /// Identifier of this account, hashed from the username
    /// it was registered with.
    pub id: u64,
    /// Attributes of this account.
    pub attributes: UserAttributes,
    /// This account's token manager.
    pub tokens: token::Tokens,
}

impl Account {
    pub fn new(attributes: UserAttributes) -> Self {
        Self {
            id: id_of(&attributes.username),
            attributes,
            tokens: token::Tokens::new(),
        }
    }

    /// Get metadata of this account.
    pub fn metadata(&self) -> UserMetadata {
        UserMetadata {
            username: self.attributes.username.clone(),
            email: self.attributes.email.clone(),
            first_name: self.attributes.first_name.clone(),
            last_name: self.attributes.last_name.clone(),
            phone: self.attributes.phone,
            department: self.attributes.department.clone(),
            role: self.attributes.role,
        }
    }

    /// Login into the account and return back a token in a `Result`.
    pub fn login(&mut self, password: &str) -> Result<String, Error> {
        if sha256::digest(password) == self.attributes.password_sha {
            Ok(self
                .tokens
                .new_token(self.id, self.attributes.token_expiration_time))
        } else {
            Err(Error::UsernameOrPasswordIncorrect)
        }
    }

    /// Logout this account with the target token.
    pub fn logout(&mut self, token: &str) -> Result<(), Error> {
        if self.tokens.remove(token) {
            Ok(())
        } else {
            Err(Error::TokenIncorrect)
        }
    }

    /// Save this account asynchronously.
    pub fn save(&self) {
        #[cfg(not(test))]
        {
            let id = self.id;
            let data = toml::to_string(&self).unwrap_or_default();

            tokio::spawn(async move {
                use tokio::io::AsyncWriteExt;

                let mut file = tokio::fs::File::create(format!("./data/accounts/{}.toml", id))
                    .await
                    .unwrap();
                file.write_all(data.as_bytes()).await.unwrap();
            });
        }
    }

    /// Remove this account from the filesystem.
    pub fn remove(&self) {
        #[cfg(not(test))]
        {
            let id = self.id;

            tokio::spawn(async move {
                tokio::fs::remove_file(format!("./data/accounts/{}.toml", id))
                    .await
                    .unwrap()
            });
        }
    }
}

/// Attributes of a registered account.
#[derive(Serialize, Deserialize, Debug)]
pub struct UserAttributes {
    /// Unique username of this account.
    pub username: String,
    /// Unique email address of this account.
    pub email: lettre::Address,
    pub first_name: String,
    pub last_name: String,
    /// Phone number of this account.
    pub phone: u64,
    /// Department this account belongs to.
    pub department: String,
    /// The only role of this account.
    pub role: Role,
    /// The registration time of this account.
    pub registration_time: DateTime<Utc>,
    /// Hash of this account's password.
    pub password_sha: String,
    /// The expiration time of a token in days.
    /// `0` means never expire.
    pub token_expiration_time: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ManagerError {
    #[error("account {0} errored: {1}")]
    Account(u64, Error),
    #[error("account {0} not found")]
    NotFound(u64),
}

/// A simple account manager.
pub struct AccountManager {
    accounts: RwLock<Vec<RwLock<Account>>>,
    /// An index cache for getting index from an id.
    index: DashMap<u64, usize>,
}

impl AccountManager {
    /// Read and create an account manager from `./data/accounts`.
    pub fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::fs::{self, File};
            use std::io::Read;

            let mut vec = Vec::new();
            let index = DashMap::new();
            let mut i = 0;
            for dir in fs::read_dir("./data/accounts").unwrap() {
                if let Ok(e) = dir.map(|e| {
                    toml::from_str::<Account>(&{
                        let mut string = String::new();
                        File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    index.insert(e.id, i);
                    vec.push(RwLock::new(e));
                    i += 1;
                } else {
                    continue;
                }
            }
            Self {
                accounts: RwLock::new(vec),
                index,
            }
        }

        #[cfg(test)]
        Self {
            accounts: RwLock::new(Vec::new()),
            index: DashMap::new(),
        }
    }

    /// Get inner accounts.
    pub fn inner(&self) -> &RwLock<Vec<RwLock<Account>>> {
        &self.accounts
    }

    /// Get inner index cache.
    pub fn index(&self) -> &DashMap<u64, usize> {
        &self.index
    }

    /// Update index cache of this instance.
    pub fn update_index(&self) {
        self.index.clear();
        for account in self.accounts.read().iter().enumerate() {
            self.index.insert(account.1.read().id, account.0);
        }
    }

    /// Remove expired tokens of all accounts.
    pub fn refresh_all(&self) {
        for account in self.accounts.read().iter() {
            account.write().tokens.refresh();
        }
    }

    /// Remove expired tokens of the target account.
    pub fn refresh(&self, id: u64) {
        if let Some(index) = self.index.get(&id) {
            if let Some(account) = self.accounts.read().get(*index) {
                account.write().tokens.refresh();
            }
        }
    }

    /// Remove target account.
    pub fn remove(&self, id: u64) {
        if let Some(index) = self.index.get(&id) {
            {
                let b = self.accounts.read();
                b.get(*index).unwrap().read().remove();
            }
            self.accounts.write().remove(*index);
        }
        self.update_index();
    }

    /// Push an account to this instance, only for testing.
    #[cfg(test)]
    pub fn push(&self, account: Account) {
        assert!(self
            .index
            .insert(account.id, self.accounts.read().len())
            .is_none());
        self.accounts.write().push(RwLock::new(account));
    }

    #[cfg(test)]
    pub fn reset(&self) {
        *self.accounts.write() = Vec::new();
        self.index.clear()
    }
}
