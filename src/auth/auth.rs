use crate::auth::jwt::verify_access_token;
use crate::auth::policy::Actor;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        Some(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role: Role::from_id(claims.role)?,
            employee_id: claims.employee_id,
        })
    }

    /// The caller as the access policy sees it.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.employee_id,
            role: self.role,
        }
    }

    /// For actions that only make sense for someone with an employee record
    /// (checking in, filing leave).
    pub fn require_employee_id(&self) -> ApiResult<u64> {
        self.employee_id
            .ok_or_else(|| ApiError::Forbidden("No employee profile".to_string()))
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already verified by auth_middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_access_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        match AuthUser::from_claims(claims) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(ErrorUnauthorized("Invalid role"))),
        }
    }
}
