//! Orquestração de um ciclo de telemetria.
//!
//! Um ciclo: garantir conectividade → ler sensores → codificar → publicar.
//! O agendamento periódico fica no chamador (`main`); este módulo não tem
//! nenhuma lógica de tempo própria.

use crate::connectivity::{ConnectivityError, ConnectivityManager};
use crate::sensors::SensorReader;
use airq_core::payload::encode_payload;
use tracing::info;

/// Publicador de telemetria da estação.
pub struct TelemetryPublisher {
    reader: SensorReader,
    connectivity: ConnectivityManager,
    topic: String,
}

impl TelemetryPublisher {
    pub fn new(
        reader: SensorReader,
        connectivity: ConnectivityManager,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            connectivity,
            topic: topic.into(),
        }
    }

    /// Executa um ciclo completo de leitura e publicação.
    pub fn run_cycle(&mut self) -> Result<(), ConnectivityError> {
        self.connectivity.ensure_session()?;

        let snapshot = self.reader.read_all();
        let record = encode_payload(&snapshot);

        self.connectivity.publish(&self.topic, &record)?;

        info!(
            "→ {} bytes em {} | temp {} | umid {} | mq135 {} | eCO2 {} | PM2.5 {}",
            record.len(),
            self.topic,
            fmt_opt(snapshot.temperature),
            fmt_opt(snapshot.humidity),
            snapshot.gas_raw,
            snapshot.eco2.map_or("–".into(), |v| v.to_string()),
            fmt_opt(snapshot.pm25),
        );
        Ok(())
    }
}

fn fmt_opt(value: Option<f32>) -> String {
    value.map_or("–".into(), |v| format!("{v:.1}"))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
