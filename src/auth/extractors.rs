use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;

/// Resolves the authenticated caller to their stored user record.
///
/// This extractor is intended to be used on routes protected by `AuthMiddleware`,
/// which validates the JWT and inserts the decoded claims into request
/// extensions. The extractor then loads the user row named by the token's
/// subject. A token whose subject no longer exists (the account was deleted
/// after issuance) fails with the same `Unauthenticated` error as a missing
/// or invalid token, so a stale token never resolves to a user.
///
/// Handlers that take `AuthenticatedUser` therefore never run with a partial
/// or null identity.
#[derive(Debug)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            // Claims absent means AuthMiddleware did not run on this route.
            // Responding with Unauthorized is the safe default.
            let claims = claims.ok_or(AppError::Unauthenticated)?;
            let pool = pool.ok_or_else(|| {
                AppError::Internal("PgPool is not registered as app data".into())
            })?;

            let user = User::find_by_username(&pool, &claims.sub)
                .await?
                .ok_or(AppError::Unauthenticated)?;

            Ok(AuthenticatedUser(user))
        })
    }
}
