//! Farmer accounts: registration, password login and refresh-token rotation
//!
//! Refresh tokens are random UUIDs handed to the client once; only their
//! SHA-256 digest is stored.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::validation::{validate_email, validate_kenyan_phone, validate_password, validate_required};

/// Account and session operations over the `users` and `refresh_tokens` tables
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a farmer account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
}

impl RegisterInput {
    /// Check required fields and formats before touching the database
    pub fn validate(&self) -> AppResult<()> {
        if validate_required(&self.full_name).is_err()
            || validate_required(&self.email).is_err()
            || self.password.is_empty()
        {
            return Err(AppError::validation(
                "full_name",
                "Name, email and password are required",
                "Jina, barua pepe na nenosiri vinahitajika",
            ));
        }
        if validate_email(&self.email).is_err() {
            return Err(AppError::validation(
                "email",
                "Invalid email format",
                "Muundo wa barua pepe si sahihi",
            ));
        }
        if validate_password(&self.password).is_err() {
            return Err(AppError::validation(
                "password",
                "Password must be at least 6 characters",
                "Nenosiri lazima liwe na angalau herufi 6",
            ));
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if validate_kenyan_phone(phone).is_err() {
                return Err(AppError::validation(
                    "phone",
                    "Invalid phone number",
                    "Nambari ya simu si sahihi",
                ));
            }
        }
        Ok(())
    }
}

/// Account created by registration
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login lookup row
#[derive(Debug, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new farmer account. Does not log the user in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisteredUser> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(email_taken());
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("bcrypt hash: {}", e)))?;

        let phone = input
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let user = sqlx::query_as::<_, RegisteredUser>(
            r#"
            INSERT INTO users (full_name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, created_at
            "#,
        )
        .bind(input.full_name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(phone)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            // Concurrent registration raced past the count check
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                email_taken()
            } else {
                AppError::from(e)
            }
        })?;

        tracing::info!(user_id = %user.id, "Registered farmer account");

        Ok(user)
    }

    /// Check a password against the stored bcrypt hash and issue tokens
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        let account = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, full_name, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let matches = verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("bcrypt verify: {}", e)))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(account.id)
            .execute(&self.db)
            .await?;

        let tokens = self.issue_tokens(account.id, &account.email, &account.full_name)?;
        self.insert_refresh_token(&self.db, account.id, &tokens.refresh_token)
            .await?;

        tracing::info!(user_id = %account.id, "Farmer logged in");

        Ok(tokens)
    }

    /// Rotate a refresh token into a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        // Revoke and look up in one statement so a token can only be used once
        let user = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
            RETURNING u.id, u.email, u.full_name
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid or expired refresh token".to_string(),
            message_sw: "Tokeni ya kuonyesha upya si sahihi au imeisha muda".to_string(),
        })?;

        let (user_id, email, full_name) = user;
        let tokens = self.issue_tokens(user_id, &email, &full_name)?;
        self.insert_refresh_token(&mut *tx, user_id, &tokens.refresh_token)
            .await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(refresh_token))
        .execute(&self.db)
        .await?;

        tracing::debug!(revoked = result.rows_affected(), "Logout");
        Ok(())
    }

    fn issue_tokens(&self, user_id: Uuid, email: &str, name: &str) -> AppResult<AuthTokens> {
        Ok(AuthTokens {
            access_token: encode_access_token(
                user_id,
                email,
                name,
                &self.jwt_secret,
                self.access_token_expiry,
            )?,
            refresh_token: Uuid::new_v4().to_string(),
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    async fn insert_refresh_token<'e, E>(&self, executor: E, user_id: Uuid, token: &str) -> AppResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(Utc::now() + Duration::seconds(self.refresh_token_expiry))
        .execute(executor)
        .await?;

        Ok(())
    }
}

fn email_taken() -> AppError {
    AppError::Conflict {
        resource: "email".to_string(),
        message: "Email already registered".to_string(),
        message_sw: "Barua pepe hii tayari imesajiliwa".to_string(),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hex SHA-256 digest of a refresh token
fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Sign an access token for a user
pub fn encode_access_token(
    user_id: Uuid,
    email: &str,
    name: &str,
    secret: &str,
    expiry_seconds: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its claims
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            full_name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_register_input_validation() {
        assert!(input("Amina Otieno", "amina@example.com", "secret1").validate().is_ok());
        assert!(input("", "amina@example.com", "secret1").validate().is_err());
        assert!(input("Amina Otieno", "amina.example.com", "secret1").validate().is_err());
        assert!(input("Amina Otieno", "amina@example.com", "12345").validate().is_err());
    }

    #[test]
    fn test_register_input_phone_is_optional_but_checked() {
        let mut with_phone = input("Amina Otieno", "amina@example.com", "secret1");
        with_phone.phone = Some("0712345678".to_string());
        assert!(with_phone.validate().is_ok());

        with_phone.phone = Some("12".to_string());
        assert!(with_phone.validate().is_err());

        with_phone.phone = Some("  ".to_string());
        assert!(with_phone.validate().is_ok());
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let first = hash_token("refresh-token");
        assert_eq!(first, hash_token("refresh-token"));
        assert_ne!(first, hash_token("other-token"));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_access_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = encode_access_token(user_id, "amina@example.com", "Amina", "secret", 3600).unwrap();
        let claims = decode_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.name, "Amina");
    }

    #[test]
    fn test_access_token_rejects_wrong_secret_and_expiry() {
        let user_id = Uuid::new_v4();
        let token = encode_access_token(user_id, "a@b.co", "A", "secret", 3600).unwrap();
        assert!(matches!(
            decode_access_token(&token, "other"),
            Err(AppError::InvalidToken)
        ));

        // Past the default 60s leeway
        let expired = encode_access_token(user_id, "a@b.co", "A", "secret", -600).unwrap();
        assert!(matches!(
            decode_access_token(&expired, "secret"),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Farmer@Example.COM "), "farmer@example.com");
    }
}
