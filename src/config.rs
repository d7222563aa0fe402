use once_cell::sync::Lazy;
use serde::Deserialize;

/// The static config instance.
pub static INSTANCE: Lazy<Config> = Lazy::new(|| {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Read};

        return toml::from_str(&{
            let mut string = String::new();
            File::open("./data/config.toml")
                .unwrap()
                .read_to_string(&mut string)
                .unwrap();
            string
        })
        .unwrap();
    }

    #[cfg(test)]
    Config::default()
});

/// Describing the server configuration.
#[derive(Deserialize)]
pub struct Config {
    pub port: u16,
    /// Verification code staff members must present when registering.
    pub staff_code: String,
    /// Password assigned to admin-created accounts when none is given.
    pub default_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            staff_code: "STAFF@2026".to_string(),
            default_password: "TempPassword@2026".to_string(),
        }
    }
}
