//! Shop employees and login

use shared::models::{Employee, LoginRequest, LoginResponse, MIN_PASSWORD_LEN};
use shared::{AppError, ErrorCode};
use validator::Validate;

use crate::auth::create_token;
use crate::error::ServiceResult;
use crate::services::{MasterModule, MasterService};
use crate::util::{hash_password, verify_password};

pub struct EmployeeModule;

impl MasterModule for EmployeeModule {
    type Model = Employee;

    const MODULE_NAME: &'static str = "employee";
    const COLLECTION: &'static str = "employee";
    const ROUTE: &'static str = "/shop/employee";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];

    fn identity(model: &Employee) -> String {
        model.code.clone()
    }

    /// Hash a supplied password; without one, keep the stored hash
    fn prepare(model: &mut Employee, existing: Option<&Employee>) -> Result<(), AppError> {
        match model.password.take().filter(|p| !p.is_empty()) {
            Some(plain) => {
                if (plain.chars().count() as u64) < MIN_PASSWORD_LEN {
                    return Err(AppError::new(ErrorCode::PasswordTooShort));
                }
                let hash = hash_password(&plain).map_err(|e| {
                    tracing::error!(error = %e, "Password hashing failed");
                    AppError::internal("Password hashing failed")
                })?;
                model.password = Some(hash);
            }
            None => {
                model.password = existing.and_then(|e| e.password.clone());
            }
        }
        Ok(())
    }

    fn sanitize(model: &mut Employee) {
        model.password = None;
    }
}

/// Check `{shopid, username, password}` against the shop's employees and
/// issue a token
pub async fn login(
    employees: &MasterService<EmployeeModule>,
    jwt_secret: &str,
    req: &LoginRequest,
) -> ServiceResult<LoginResponse> {
    req.validate()?;
    let employee = employees
        .crud()
        .find_by_doc_identity_guid(&req.shopid, "code", req.username.as_str())
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let verified = employee
        .data
        .password
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !verified {
        tracing::warn!(shop_id = %req.shopid, username = %req.username, "Login failed");
        return Err(AppError::invalid_credentials().into());
    }
    if employee.data.isdisabled {
        return Err(AppError::new(ErrorCode::EmployeeDisabled).into());
    }

    let token = create_token(&req.shopid, &employee.data.code, jwt_secret)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))?;
    tracing::info!(shop_id = %req.shopid, username = %employee.data.code, "Employee logged in");
    Ok(LoginResponse {
        token,
        shopid: req.shopid.clone(),
        username: employee.data.code,
        name: employee.data.name,
    })
}
