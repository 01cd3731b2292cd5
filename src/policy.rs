use crate::{
    error::{AppError, Result},
    models::Role,
};

/// Guarded operations of the pickup-point API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreatePickupPoint,
    ListPickupPoints,
    OpenReception,
    AddProduct,
    DeleteLastProduct,
    CloseReception,
}

impl Operation {
    /// `None` means any authenticated role.
    pub fn required_role(self) -> Option<Role> {
        match self {
            Operation::CreatePickupPoint => Some(Role::Moderator),
            Operation::ListPickupPoints => None,
            Operation::OpenReception
            | Operation::AddProduct
            | Operation::DeleteLastProduct
            | Operation::CloseReception => Some(Role::Employee),
        }
    }
}

pub fn is_allowed(role: Role, op: Operation) -> bool {
    op.required_role().map_or(true, |required| required == role)
}

pub fn authorize(role: Role, op: Operation) -> Result<()> {
    if is_allowed(role, op) {
        return Ok(());
    }
    let required = op.required_role().map_or("authenticated", Role::as_str);
    Err(AppError::forbidden(format!(
        "access forbidden: {required} role required"
    )))
}
