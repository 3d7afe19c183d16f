use crate::{
    auth::{hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest, TokenService},
    error::AppError,
    models::User,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
/// A duplicate username answers with a generic 409, leaking nothing about
/// the existing account.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if username already exists
    if User::find_by_username(&pool, &register_data.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    // Hash password and insert new user. The unique index turns a racing
    // duplicate insert into the same Conflict.
    let password_hash = hash_password(&register_data.password)?;
    let user = User::insert(&pool, &register_data.username, &password_hash).await?;

    log::info!("registered user {}", user.username);

    // Generate token
    let token = tokens.issue(&user.username, None)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token. An unknown
/// username and a wrong password produce the same 401 response.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    // Get user from database
    let user = User::find_by_username(&pool, &login_data.username).await?;

    match user {
        Some(user) => {
            // Verify password
            if verify_password(&login_data.password, &user.password_hash) {
                // Generate token
                let token = tokens.issue(&user.username, None)?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    token,
                    user_id: user.id,
                }))
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        None => Err(AppError::InvalidCredentials),
    }
}
