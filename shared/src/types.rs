//! Common enums used across the platform

use serde::{Deserialize, Serialize};

/// Receipt document types issued for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Boleta,
    Factura,
    Ticket,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Boleta => "boleta",
            DocumentType::Factura => "factura",
            DocumentType::Ticket => "ticket",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "boleta" => Some(DocumentType::Boleta),
            "factura" => Some(DocumentType::Factura),
            "ticket" => Some(DocumentType::Ticket),
            _ => None,
        }
    }

    /// Prefix used in the generated sale number (e.g. `BOL-2024-0001`)
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentType::Boleta => "BOL",
            DocumentType::Factura => "FAC",
            DocumentType::Ticket => "TIC",
        }
    }
}

/// Payment methods accepted at the register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Tarjeta,
    Transferencia,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Tarjeta => "tarjeta",
            PaymentMethod::Transferencia => "transferencia",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "efectivo" => Some(PaymentMethod::Efectivo),
            "tarjeta" => Some(PaymentMethod::Tarjeta),
            "transferencia" => Some(PaymentMethod::Transferencia),
            _ => None,
        }
    }
}

/// Lifecycle states of a sale
///
/// `completada -> anulada` is the only transition; annulment is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completada,
    Anulada,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completada => "completada",
            SaleStatus::Anulada => "anulada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completada" => Some(SaleStatus::Completada),
            "anulada" => Some(SaleStatus::Anulada),
            _ => None,
        }
    }
}

/// Lifecycle states of a purchase
///
/// `pendiente -> recibida | cancelada`; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pendiente,
    Recibida,
    Cancelada,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pendiente => "pendiente",
            PurchaseStatus::Recibida => "recibida",
            PurchaseStatus::Cancelada => "cancelada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(PurchaseStatus::Pendiente),
            "recibida" => Some(PurchaseStatus::Recibida),
            "cancelada" => Some(PurchaseStatus::Cancelada),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PurchaseStatus::Pendiente)
    }
}

/// Direction of an inventory movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
    Adjustment,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
            MovementDirection::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementDirection::In),
            "out" => Some(MovementDirection::Out),
            "adjustment" => Some(MovementDirection::Adjustment),
            _ => None,
        }
    }
}

/// Business cause behind an inventory movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementCause {
    Sale,
    Purchase,
    Annulment,
    Manual,
}

impl MovementCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementCause::Sale => "sale",
            MovementCause::Purchase => "purchase",
            MovementCause::Annulment => "annulment",
            MovementCause::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(MovementCause::Sale),
            "purchase" => Some(MovementCause::Purchase),
            "annulment" => Some(MovementCause::Annulment),
            "manual" => Some(MovementCause::Manual),
            _ => None,
        }
    }
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Vendedor,
    Almacenero,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Vendedor => "vendedor",
            UserRole::Almacenero => "almacenero",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "vendedor" => Some(UserRole::Vendedor),
            "almacenero" => Some(UserRole::Almacenero),
            _ => None,
        }
    }
}
