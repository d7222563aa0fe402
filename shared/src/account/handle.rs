use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct RegisterDescriptor {
    pub username: String,
    pub email: lettre::Address,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub phone: u64,
    pub department: String,
    pub role: super::Role,
    /// Verification code, required when registering a staff account.
    pub staff_code: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AccountLoginDescriptor {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChangePasswordDescriptor {
    /// For re-authenticating.
    pub old: String,
    pub new: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ViewAccountResult {
    pub id: u64,
    pub metadata: super::UserMetadata,
    pub registration_time: chrono::DateTime<chrono::Utc>,
}

pub mod manage {
    use crate::account;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    pub struct MakeAccountDescriptor {
        pub username: String,
        pub email: lettre::Address,
        pub first_name: String,
        pub last_name: String,
        pub phone: u64,
        pub department: String,
        pub role: account::Role,
        /// When absent, the configured temporary password is assigned.
        pub password: Option<String>,
    }

    #[derive(Serialize, Deserialize)]
    pub struct AccountModifyDescriptor {
        pub account_id: u64,
        pub variants: Vec<AccountModifyVariant>,
    }

    #[derive(Serialize, Deserialize, Clone)]
    pub enum AccountModifyVariant {
        Password(String),
        Role(account::Role),
        Username(String),
    }

    #[derive(Serialize, Deserialize)]
    pub struct DeleteAccountDescriptor {
        pub account_id: u64,
    }

    #[derive(Serialize, Deserialize)]
    pub struct DeleteStudentDescriptor {
        pub student_id: u64,
    }
}
