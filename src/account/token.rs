/// A simple token manager.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct Tokens {
    inner: Vec<(Option<chrono::NaiveDateTime>, String)>,
}

impl Tokens {
    pub fn new() -> Self {
        Self {
            inner: Vec::with_capacity(16),
        }
    }

    /// Create a new token.
    #[must_use]
    pub fn new_token(
        &mut self,
        // The account id.
        id: u64,
        expire_time: u16,
    ) -> String {
        let expiry = if expire_time == 0 {
            None
        } else {
            Some(chrono::Utc::now().naive_utc() + chrono::Days::new(expire_time as u64))
        };
        let token = sha256::digest(format!("{}-{:?}-{}", id, expiry, rand::random::<u64>()));
        if self.inner.capacity() == self.inner.len() + 1 {
            self.inner.pop();
        }
        self.inner.push((expiry, token.clone()));
        token
    }

    /// Remove a target token and return whether the token was be removed successfully.
    pub(super) fn remove(&mut self, token: &str) -> bool {
        let l = self.inner.len();
        self.inner.retain(|e| e.1 != token);
        l > self.inner.len()
    }

    /// Check if a token is usable.
    pub fn token_usable(&self, token: &str) -> bool {
        self.inner.iter().any(|e| e.1 == token)
    }

    /// Remove expired tokens.
    pub fn refresh(&mut self) {
        self.inner
            .retain(|e| e.0.map_or(true, |a| a > chrono::Utc::now().naive_utc()));
        self.inner.sort_by(|a, b| b.0.cmp(&a.0));
    }
}
