use clap::{Arg, Command};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_EMAIL_RELAY_URL: &str = "email-relay-url";
pub const ARG_EMAIL_FROM: &str = "email-from";
pub const ARG_MEDIA_DIR: &str = "media-dir";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL used for CORS and sign-in links")
                .env("DUNGI_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_EMAIL_RELAY_URL)
                .long(ARG_EMAIL_RELAY_URL)
                .help("HTTP relay endpoint for outbound email, logs email when unset")
                .env("DUNGI_EMAIL_RELAY_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("From address for outbound email")
                .env("DUNGI_EMAIL_FROM")
                .default_value("no-reply@dungi.dev"),
        )
        .arg(
            Arg::new(ARG_MEDIA_DIR)
                .long(ARG_MEDIA_DIR)
                .help("Directory for uploaded media such as avatars")
                .env("DUNGI_MEDIA_DIR")
                .default_value("media"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub relay_url: Option<String>,
    pub from: String,
    pub media_dir: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            relay_url: matches.get_one::<String>(ARG_EMAIL_RELAY_URL).cloned(),
            from: matches
                .get_one::<String>(ARG_EMAIL_FROM)
                .cloned()
                .unwrap_or_else(|| "no-reply@dungi.dev".to_string()),
            media_dir: matches
                .get_one::<String>(ARG_MEDIA_DIR)
                .cloned()
                .unwrap_or_else(|| "media".to_string()),
        }
    }
}
