//! Unified error codes for the pastelaria system
//!
//! Codes travel over the wire as SCREAMING_SNAKE_CASE strings
//! (`"VALIDATION_ERROR"`, `"ORDER_ITEMS_ERROR"`, ...) so that clients can
//! branch on them programmatically. They are never shown raw to end users;
//! the accompanying message is the human-readable part.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== Validation ====================
    /// Caller supplied data that fails a precondition
    ValidationError,
    /// Vendor missing or inactive
    InvalidVendor,
    /// At least one requested flavor is missing or inactive
    InvalidFlavors,
    /// Quantity not a positive integer within bounds
    InvalidQuantity,

    // ==================== Conflict ====================
    /// An active entity with the same name already exists
    DuplicateName,
    /// Status change rejected by the strict transition table
    InvalidTransition,

    // ==================== Not found ====================
    /// Referenced entity does not exist
    NotFound,

    // ==================== Auth ====================
    /// Missing or invalid credentials
    Unauthorized,
    /// Vendor session expired
    SessionExpired,

    // ==================== Dependency ====================
    /// Storage read failed
    FetchError,
    /// Storage count failed
    CountError,
    /// Uniqueness / usage check failed
    CheckError,
    /// Settings row unreadable, order cannot be priced
    SettingsError,
    /// Customer resolution failed
    CustomerError,
    /// Order row creation failed
    OrderError,
    /// Order line insertion failed (order rolled back)
    OrderItemsError,
    /// Generic insert failed
    InsertError,
    /// Blob store upload failed
    UploadError,
    /// Update failed
    UpdateError,
    /// Delete failed
    DeleteError,
    /// Soft-delete failed
    DeactivateError,
    /// External call exceeded its deadline
    TimeoutError,

    // ==================== System ====================
    /// Unclassified failure
    InternalError,
}

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: [ErrorCode; 23] = [
        ErrorCode::ValidationError,
        ErrorCode::InvalidVendor,
        ErrorCode::InvalidFlavors,
        ErrorCode::InvalidQuantity,
        ErrorCode::DuplicateName,
        ErrorCode::InvalidTransition,
        ErrorCode::NotFound,
        ErrorCode::Unauthorized,
        ErrorCode::SessionExpired,
        ErrorCode::FetchError,
        ErrorCode::CountError,
        ErrorCode::CheckError,
        ErrorCode::SettingsError,
        ErrorCode::CustomerError,
        ErrorCode::OrderError,
        ErrorCode::OrderItemsError,
        ErrorCode::InsertError,
        ErrorCode::UploadError,
        ErrorCode::UpdateError,
        ErrorCode::DeleteError,
        ErrorCode::DeactivateError,
        ErrorCode::TimeoutError,
        ErrorCode::InternalError,
    ];

    /// Wire representation of the code
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidVendor => "INVALID_VENDOR",
            ErrorCode::InvalidFlavors => "INVALID_FLAVORS",
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::FetchError => "FETCH_ERROR",
            ErrorCode::CountError => "COUNT_ERROR",
            ErrorCode::CheckError => "CHECK_ERROR",
            ErrorCode::SettingsError => "SETTINGS_ERROR",
            ErrorCode::CustomerError => "CUSTOMER_ERROR",
            ErrorCode::OrderError => "ORDER_ERROR",
            ErrorCode::OrderItemsError => "ORDER_ITEMS_ERROR",
            ErrorCode::InsertError => "INSERT_ERROR",
            ErrorCode::UploadError => "UPLOAD_ERROR",
            ErrorCode::UpdateError => "UPDATE_ERROR",
            ErrorCode::DeleteError => "DELETE_ERROR",
            ErrorCode::DeactivateError => "DEACTIVATE_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Default user-facing message (pt-BR)
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Dados inválidos",
            ErrorCode::InvalidVendor => "Vendedor inválido ou inativo",
            ErrorCode::InvalidFlavors => "Sabores inválidos ou inativos",
            ErrorCode::InvalidQuantity => "Quantidades inválidas",
            ErrorCode::DuplicateName => "Já existe um registro ativo com este nome",
            ErrorCode::InvalidTransition => "Transição de status não permitida",
            ErrorCode::NotFound => "Recurso não encontrado",
            ErrorCode::Unauthorized => "Você não tem permissão para realizar esta ação",
            ErrorCode::SessionExpired => "Sessão expirada. Entre novamente.",
            ErrorCode::FetchError => "Falha ao carregar dados",
            ErrorCode::CountError => "Falha ao contar registros",
            ErrorCode::CheckError => "Falha ao verificar registros existentes",
            ErrorCode::SettingsError => "Não foi possível obter o preço atual",
            ErrorCode::CustomerError => "Falha ao registrar cliente",
            ErrorCode::OrderError => "Falha ao criar pedido",
            ErrorCode::OrderItemsError => "Falha ao registrar itens do pedido",
            ErrorCode::InsertError => "Falha ao salvar registro",
            ErrorCode::UploadError => "Falha ao enviar arquivo",
            ErrorCode::UpdateError => "Falha ao atualizar registro",
            ErrorCode::DeleteError => "Falha ao excluir registro",
            ErrorCode::DeactivateError => "Falha ao desativar registro",
            ErrorCode::TimeoutError => "A requisição demorou muito. Tente novamente.",
            ErrorCode::InternalError => "Erro no servidor. Tente novamente mais tarde.",
        }
    }
}

/// Error returned when parsing an unknown code string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub String);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| InvalidErrorCode(s.to_string()))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
