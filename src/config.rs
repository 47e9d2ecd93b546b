use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub app_origin: String,
    pub default_redirect_path: String,
    pub auth_path: String,
    pub cookie_secure: bool,
    pub backend_timeout: Duration,
}

impl Config {
    pub fn read_env() -> Self {
        Config {
            port: env::var("SERVER_PORT")
                .expect("SERVER_PORT must be set")
                .parse()
                .expect("SERVER_PORT must be a number"),
            backend_url: env::var("BACKEND_URL").expect("BACKEND_URL must be set"),
            app_origin: env::var("APP_ORIGIN")
                .unwrap_or(String::from("http://localhost:3000")),
            default_redirect_path: env::var("DEFAULT_REDIRECT_PATH").unwrap_or(String::from("/")),
            auth_path: env::var("AUTH_PATH").unwrap_or(String::from("/auth")),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            backend_timeout: Duration::from_secs(
                env::var("BACKEND_TIMEOUT_SECS")
                    .map(|value| value.parse().expect("BACKEND_TIMEOUT_SECS must be a number"))
                    .unwrap_or(10),
            ),
        }
    }
}
