//! # AirQ Core
//!
//! Crate compartilhada que define o snapshot de leituras, o parser do
//! frame binário do PMS5003, a codificação do payload JSON e a
//! configuração TOML da estação de qualidade do ar.
//!
//! ## Módulos
//! - [`types`] – Snapshot de leituras e valores derivados
//! - [`frame`] – Parse do frame de 32 bytes do PMS5003
//! - [`payload`] – Codificação do registro JSON publicado via MQTT
//! - [`config`] – Configuração unificada via TOML

pub mod config;
pub mod frame;
pub mod payload;
pub mod types;

// Re-exports convenientes
pub use config::AgentConfig;
pub use frame::{FrameError, parse_frame, FRAME_LEN};
pub use payload::encode_payload;
pub use types::{AirQuality, ParticulateReading, SensorSnapshot};
