//! Order status dimensions
//!
//! A repair order carries two independent status dimensions: the public
//! status shown to the customer and the technical status used on the bench.
//! Both serialize in SCREAMING_SNAKE_CASE and that wire form is also the
//! canonical display form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Customer-facing order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order opened at intake
    Aberta,
    /// Under diagnosis
    EmAnalise,
    /// Quote sent to the customer
    OrcamentoEnviado,
    /// Quote approved by the customer
    OrcamentoAprovado,
    /// Waiting for a replacement part
    AguardandoPeca,
    /// Repair in progress
    EmReparo,
    /// Ready for pickup
    Pronta,
    /// Delivered to the customer
    Entregue,
    /// Cancelled
    Cancelada,
}

/// Internal technician-facing status, independent of the public dimension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechnicalStatus {
    /// Not picked up by a technician yet
    NaoIniciada,
    /// On the bench
    EmBancada,
    /// Blocked on parts
    AguardandoPeca,
    /// Blocked on a customer decision
    AguardandoCliente,
    /// Final quality test
    TesteFinal,
    /// Bench work finished
    Finalizada,
}

/// Error for status strings that match no known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown status: {0}")]
pub struct StatusParseError(pub String);

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Aberta => write!(f, "ABERTA"),
            OrderStatus::EmAnalise => write!(f, "EM_ANALISE"),
            OrderStatus::OrcamentoEnviado => write!(f, "ORCAMENTO_ENVIADO"),
            OrderStatus::OrcamentoAprovado => write!(f, "ORCAMENTO_APROVADO"),
            OrderStatus::AguardandoPeca => write!(f, "AGUARDANDO_PECA"),
            OrderStatus::EmReparo => write!(f, "EM_REPARO"),
            OrderStatus::Pronta => write!(f, "PRONTA"),
            OrderStatus::Entregue => write!(f, "ENTREGUE"),
            OrderStatus::Cancelada => write!(f, "CANCELADA"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ABERTA" => Ok(OrderStatus::Aberta),
            "EM_ANALISE" => Ok(OrderStatus::EmAnalise),
            "ORCAMENTO_ENVIADO" => Ok(OrderStatus::OrcamentoEnviado),
            "ORCAMENTO_APROVADO" => Ok(OrderStatus::OrcamentoAprovado),
            "AGUARDANDO_PECA" => Ok(OrderStatus::AguardandoPeca),
            "EM_REPARO" => Ok(OrderStatus::EmReparo),
            "PRONTA" => Ok(OrderStatus::Pronta),
            "ENTREGUE" => Ok(OrderStatus::Entregue),
            "CANCELADA" => Ok(OrderStatus::Cancelada),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for TechnicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TechnicalStatus::NaoIniciada => write!(f, "NAO_INICIADA"),
            TechnicalStatus::EmBancada => write!(f, "EM_BANCADA"),
            TechnicalStatus::AguardandoPeca => write!(f, "AGUARDANDO_PECA"),
            TechnicalStatus::AguardandoCliente => write!(f, "AGUARDANDO_CLIENTE"),
            TechnicalStatus::TesteFinal => write!(f, "TESTE_FINAL"),
            TechnicalStatus::Finalizada => write!(f, "FINALIZADA"),
        }
    }
}

impl std::str::FromStr for TechnicalStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NAO_INICIADA" => Ok(TechnicalStatus::NaoIniciada),
            "EM_BANCADA" => Ok(TechnicalStatus::EmBancada),
            "AGUARDANDO_PECA" => Ok(TechnicalStatus::AguardandoPeca),
            "AGUARDANDO_CLIENTE" => Ok(TechnicalStatus::AguardandoCliente),
            "TESTE_FINAL" => Ok(TechnicalStatus::TesteFinal),
            "FINALIZADA" => Ok(TechnicalStatus::Finalizada),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
