use crate::config::ServerConfig;
use crate::db::user_repository::UserRepository;
use crate::errors::ApiError;
use crate::models::user::{Claims, User};
use crate::utils::auth::{create_jwt, hash_password, verify_password};
use crate::utils::validation::validate_signup;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Public projection of a user record; the password hash never leaves
/// the server.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation errors or existing user")
    ),
    tag = "Authentication"
)]
pub async fn signup(
    config: web::Data<ServerConfig>,
    user_repo: web::Data<UserRepository>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %payload.email, "Signup attempt");

    // Field-level validation runs before any database access
    let errors = validate_signup(&payload.name, &payload.email, &payload.password);
    if !errors.is_empty() {
        warn!(email = %payload.email, count = errors.len(), "Signup failed: validation errors");
        return Err(ApiError::Validation(errors));
    }

    if user_repo.get_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "Signup failed: email already registered");
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::Internal("password hashing failed".to_string())
    })?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email: payload.email.clone(),
        password_hash,
        created_at: chrono::Utc::now(),
    };

    // The repository re-checks the email index at insert; a concurrent
    // signup with the same email still maps to the same generic error.
    let user = user_repo.create(user).await?;

    let token = create_jwt(&user.id, &user.email, &config.jwt_secret).map_err(|e| {
        error!(error = ?e, user_id = %user.id, "Failed to issue token");
        ApiError::Internal("token issuance failed".to_string())
    })?;

    info!(user_id = %user.id, email = %user.email, "User registered successfully");

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Login an existing user
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn login(
    config: web::Data<ServerConfig>,
    user_repo: web::Data<UserRepository>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %payload.email, "Login attempt");

    // Unknown email and wrong password share one message so the two
    // cannot be told apart from the outside.
    let user = match user_repo.get_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "Login failed: unknown email");
            return Err(ApiError::BadRequest("Invalid credentials".to_string()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, "Login failed: password mismatch");
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let token = create_jwt(&user.id, &user.email, &config.jwt_secret).map_err(|e| {
        error!(error = ?e, email = %payload.email, "Failed to issue token");
        ApiError::Internal("token issuance failed".to_string())
    })?;

    info!(user_id = %user.id, email = %user.email, "User logged in successfully");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Current user from the verified bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
pub async fn me(
    user_repo: web::Data<UserRepository>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    let user = user_repo
        .get_by_id(&claims.sub)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::middleware::auth::AuthMiddleware;
    use crate::utils::auth::decode_jwt;
    use actix_web::{http::StatusCode, test, App};

    const SECRET: &str = "handler-test-secret";

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: "0".to_string(),
            db_path: "unused".to_string(),
            jwt_secret: SECRET.to_string(),
            jwt_configured: true,
        }
    }

    macro_rules! auth_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_config()))
                    .app_data(web::Data::new(UserRepository::new($db.clone())))
                    .service(
                        web::scope("/api/auth")
                            .route("/signup", web::post().to(signup))
                            .route("/login", web::post().to(login))
                            .service(
                                web::resource("/me")
                                    .wrap(AuthMiddleware::new(SECRET))
                                    .route(web::get().to(me)),
                            ),
                    ),
            )
            .await
        };
    }

    fn signup_body(name: &str, email: &str, password: &str) -> serde_json::Value {
        serde_json::json!({ "name": name, "email": email, "password": password })
    }

    #[actix_web::test]
    async fn test_signup_returns_token_and_projection() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Ann", "ann@x.com", "secret1"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;

        assert_eq!(body["user"]["name"], "Ann");
        assert_eq!(body["user"]["email"], "ann@x.com");
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["user"].get("password").is_none());

        // Token claim resolves to the stored user id
        let claims = decode_jwt(body["token"].as_str().unwrap(), SECRET).unwrap();
        assert_eq!(claims.sub, body["user"]["id"].as_str().unwrap());
        assert_eq!(claims.email, "ann@x.com");
    }

    #[actix_web::test]
    async fn test_signup_validation_errors_in_order() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("", "not-an-email", "123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["field"], "email");
        assert_eq!(errors[2]["field"], "password");
    }

    #[actix_web::test]
    async fn test_duplicate_signup_is_rejected() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Ann", "ann@x.com", "secret1"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // Same email, different name and password
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Other Ann", "ann@x.com", "different"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "User already exists");
    }

    #[actix_web::test]
    async fn test_signup_then_login_round_trip() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Ann", "ann@x.com", "secret1"))
            .to_request();
        let signup_resp: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        let signup_id = signup_resp["user"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": "ann@x.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["id"], signup_id.as_str());

        let claims = decode_jwt(body["token"].as_str().unwrap(), SECRET).unwrap();
        assert_eq!(claims.sub, signup_id);
    }

    #[actix_web::test]
    async fn test_login_failures_are_indistinguishable() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Ann", "ann@x.com", "secret1"))
            .to_request();
        test::call_service(&app, req).await;

        // Wrong password
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": "ann@x.com", "password": "wrong" }))
            .to_request();
        let wrong_pw = test::call_service(&app, req).await;
        assert_eq!(wrong_pw.status(), StatusCode::BAD_REQUEST);
        let wrong_pw_body: serde_json::Value = test::read_body_json(wrong_pw).await;

        // Unknown email
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": "ghost@x.com", "password": "secret1" }))
            .to_request();
        let unknown = test::call_service(&app, req).await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        let unknown_body: serde_json::Value = test::read_body_json(unknown).await;

        assert_eq!(wrong_pw_body, unknown_body);
        assert_eq!(wrong_pw_body["error"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn test_me_returns_projection() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Ann", "ann@x.com", "secret1"))
            .to_request();
        let signup_resp: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        let token = signup_resp["token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["email"], "ann@x.com");
        assert!(body.get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn test_me_without_token_is_unauthorized() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_me_for_vanished_user_is_not_found() {
        let db = Database::temporary().unwrap();
        let app = auth_app!(db);

        // Valid token for an identity that was never stored
        let token = create_jwt("ghost-id", "ghost@x.com", SECRET).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
