mod account;

use campus_events_shared::account::Role;
use sha256::digest;

/// Reset all static instances.
fn reset_all() {
    crate::account::INSTANCE.reset();
    crate::event::INSTANCE.reset();
    crate::event::cache::INSTANCE.reset();
    crate::feedback::INSTANCE.reset();
}

/// Push an account and return its id together with a usable token.
fn push_account(username: &str, role: Role, department: &str, password: &str) -> (u64, String) {
    let mut account = crate::account::Account::new(crate::account::UserAttributes {
        username: username.to_string(),
        email: lettre::Address::new(username, "campus.edu").unwrap(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone: 1919810,
        department: department.to_string(),
        role,
        registration_time: chrono::Utc::now(),
        password_sha: digest(password.to_string()),
        token_expiration_time: 0,
    });

    let token = account.tokens.new_token(account.id, 0);
    let id = account.id;
    crate::account::INSTANCE.push(account);

    (id, token)
}

/// Push an event and return its id.
fn push_event(publisher: u64, department: &str, status: crate::event::ApprovalStatus) -> u64 {
    use std::hash::{Hash, Hasher};

    let id = {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        publisher.hash(&mut hasher);
        department.hash(&mut hasher);
        crate::event::INSTANCE.events.read().len().hash(&mut hasher);
        hasher.finish()
    };

    crate::event::INSTANCE.push(crate::event::Event {
        id,
        metadata: crate::event::EventMetadata {
            title: "Robotics workshop".to_string(),
            category: crate::event::Category::Workshop,
            start_date: chrono::Utc::now().date_naive(),
            end_date: chrono::Utc::now().date_naive(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            venue: "Main hall".to_string(),
            description: "Hands-on robotics session".to_string(),
        },
        poster: None,
        publisher,
        department: department.to_string(),
        status,
        remark: None,
        approver: None,
        created_at: chrono::Utc::now(),
    });

    id
}
