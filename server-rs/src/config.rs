use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub app_env: String,
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub scheduling: SchedulingConfig,
    pub mail: MailConfig,
    pub stripe: StripeConfig,
    pub cron_secret: String,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub pool_min: u32,
    pub pool_max: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    pub booking_max: u32,
}

#[derive(Clone, Debug)]
pub struct SchedulingConfig {
    /// Changeover gap appended to every booking, in minutes.
    pub buffer_minutes: i64,
    pub reminder_lead_secs: i64,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub webhook_secret: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or_parse("PORT", 3000),
            app_env: env_or("APP_ENV", "development"),
            db: DbConfig {
                host: env_or("DB_HOST", "localhost"),
                port: env_or_parse("DB_PORT", 5432),
                database: env_or("DB_NAME", "slot_booking"),
                user: env_or("DB_USER", "slot_booking"),
                password: env_or("DB_PASSWORD", ""),
                pool_min: env_or_parse("DB_POOL_MIN", 2),
                pool_max: env_or_parse("DB_POOL_MAX", 20),
                acquire_timeout_secs: env_or_parse("DB_ACQUIRE_TIMEOUT", 10),
            },
            jwt: JwtConfig {
                secret: env_or("JWT_SECRET", "change-me-to-a-secure-random-string"),
            },
            rate_limit: RateLimitConfig {
                window_secs: 60,
                max_requests: env_or_parse("RATE_LIMIT_MAX", 120),
                booking_max: env_or_parse("RATE_LIMIT_BOOKING", 10),
            },
            scheduling: SchedulingConfig {
                buffer_minutes: env_or_parse("BUFFER_MINUTES", 15),
                reminder_lead_secs: parse_duration_to_secs(&env_or("REMINDER_LEAD", "24h")),
            },
            mail: MailConfig {
                api_url: env_or("MAIL_API_URL", "https://api.resend.com/emails"),
                api_key: env_or("MAIL_API_KEY", ""),
                from_address: env_or("MAIL_FROM", "bookings@localhost"),
            },
            stripe: StripeConfig {
                webhook_secret: env_or("STRIPE_WEBHOOK_SECRET", ""),
            },
            cron_secret: env_or("CRON_SECRET", ""),
        }
    }

    pub fn database_url(&self) -> String {
        if let Ok(url) = env::var("DATABASE_URL") {
            return url;
        }
        if let Ok(url) = env::var("POSTGRES_URL") {
            return url;
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db.user, self.db.password, self.db.host, self.db.port, self.db.database
        )
    }
}

fn parse_duration_to_secs(s: &str) -> i64 {
    let s = s.trim();
    let Some((unit_at, unit)) = s.char_indices().last() else {
        return 86400;
    };
    let num: i64 = s[..unit_at].parse().unwrap_or(1);
    match unit {
        's' => num,
        'm' => num * 60,
        'h' => num * 3600,
        'd' => num * 86400,
        _ => s.parse().unwrap_or(86400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration_to_secs("90s"), 90);
        assert_eq!(parse_duration_to_secs("15m"), 900);
        assert_eq!(parse_duration_to_secs("24h"), 86_400);
        assert_eq!(parse_duration_to_secs("2d"), 172_800);
    }

    #[test]
    fn bare_number_is_seconds_and_garbage_falls_back() {
        assert_eq!(parse_duration_to_secs("3600"), 3600);
        assert_eq!(parse_duration_to_secs(""), 86_400);
        assert_eq!(parse_duration_to_secs("soon"), 86_400);
    }

    #[test]
    fn multibyte_suffix_falls_back_instead_of_panicking() {
        assert_eq!(parse_duration_to_secs("5µ"), 86_400);
        assert_eq!(parse_duration_to_secs("µ"), 86_400);
        assert_eq!(parse_duration_to_secs("2ч"), 86_400);
    }
}
